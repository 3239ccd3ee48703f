use super::ambient::{self, Ambient};
use super::basis::BasisFamily;
use super::point::Point;
use crate::config::*;
use glam::Vec2;
use rand::Rng;

/// An ordered run of control points with its motion and look
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<Point>,
    velocity: Vec2,
    point_speed: f32,
    hue: f32,
    brightness: f32,
    base_size: f32,
    size_amplitude: f32,
    size_frequency: f32,
    size_time: f32,
    point_size: f32,
}

impl Curve {
    /// Creates an empty curve with randomized hue, brightness and size oscillator
    pub fn new(velocity: Vec2, point_speed: f32, rng: &mut impl Rng) -> Self {
        let hue = ambient::in_range(rng, 0.0, HUE_WRAP);
        let brightness = ambient::in_range(rng, 0.0, 1.0);
        let base_size = ambient::in_range(rng, BASE_SIZE_MIN, BASE_SIZE_SPAN);

        Self {
            points: Vec::new(),
            velocity,
            point_speed,
            hue,
            brightness,
            base_size,
            size_amplitude: ambient::in_range(rng, SIZE_AMPLITUDE_MIN, SIZE_AMPLITUDE_SPAN),
            size_frequency: ambient::in_range(rng, SIZE_FREQUENCY_MIN, SIZE_FREQUENCY_SPAN),
            size_time: 0.0,
            point_size: base_size,
        }
    }

    /// Creates an empty curve drifting with the given [`Ambient`]
    pub fn with_ambient(ambient: &Ambient, rng: &mut impl Rng) -> Self {
        Self::new(ambient.velocity, ambient.point_speed, rng)
    }

    /// Appends a point, the caller checks [`Curve::is_full`] first
    pub fn append(&mut self, point: Point) {
        debug_assert!(!self.is_full());
        self.points.push(point);
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= MAX_CONTROL_POINTS
    }

    /// True when the curve has enough points to be drawn and committed
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= MIN_CURVE_POINTS
    }

    /// Moves every point and steps the color and size oscillators
    ///
    /// `elapsed` is in milliseconds. The point speed is added differently on
    /// the two axes: X moves with `velocity + point_speed`, Y with
    /// `velocity * speed + point_speed`.
    pub fn advance(&mut self, elapsed: f32, speed: f32, size_oscillation: bool) {
        self.hue += elapsed * HUE_RATE;
        if self.hue >= HUE_WRAP {
            self.hue = 0.0;
        }

        for point in self.points.iter_mut() {
            let direction = point.direction();
            let dx = (self.velocity.x + self.point_speed) * direction.x * elapsed * speed;
            let dy = (self.velocity.y * speed + self.point_speed) * direction.y * elapsed * speed;
            point.translate(dx, dy);

            let position = point.position();
            if position.x.abs() > VIEWPORT_EXTENT {
                point.invert_direction_x();
            }
            if position.y.abs() > VIEWPORT_EXTENT {
                point.invert_direction_y();
            }
        }

        if size_oscillation {
            self.size_time += elapsed * SIZE_TIME_RATE;
            self.point_size =
                self.base_size + self.size_amplitude * (self.size_frequency * self.size_time).sin();
        } else {
            self.point_size = self.base_size;
        }
    }

    /// Number of samples to draw with `basis`, `None` below four points
    pub fn sample_count_for(&self, basis: BasisFamily, segments_per_piece: u32) -> Option<u32> {
        basis.sample_count(self.points.len(), segments_per_piece)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Control point positions in insertion order
    pub fn positions(&self) -> Vec<Vec2> {
        self.points.iter().map(Point::position).collect()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn point_speed(&self) -> f32 {
        self.point_speed
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    pub fn size_amplitude(&self) -> f32 {
        self.size_amplitude
    }

    pub fn size_frequency(&self) -> f32 {
        self.size_frequency
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn curve_with(points: &[(Vec2, Vec2)], velocity: Vec2, point_speed: f32) -> Curve {
        let mut curve = Curve::new(velocity, point_speed, &mut rng());
        for (position, direction) in points {
            curve.append(Point::new(*position, *direction));
        }
        curve
    }

    #[test]
    fn random_parameters_in_range() {
        let mut rng = rng();
        for _ in 0..1000 {
            let curve = Curve::new(Vec2::ZERO, 0.0, &mut rng);
            assert!((0.0..360.0).contains(&curve.hue()));
            assert!((0.0..1.0).contains(&curve.brightness()));
            assert!((2.0..22.0).contains(&curve.base_size()));
            assert!((3.0..=15.0).contains(&curve.size_amplitude()));
            assert!((0.5..=2.5).contains(&curve.size_frequency()));
            assert_eq!(curve.point_size(), curve.base_size());
        }
    }

    #[test]
    fn axes_use_asymmetric_speed() {
        let velocity = vec2(0.002, 0.003);
        let point_speed = 0.001;
        let mut curve = curve_with(&[(Vec2::ZERO, vec2(1.0, 1.0))], velocity, point_speed);

        let (elapsed, speed) = (10.0, 2.0);
        curve.advance(elapsed, speed, false);

        let position = curve.points()[0].position();
        assert_relative_eq!(position.x, (0.002 + 0.001) * elapsed * speed, epsilon = 1e-7);
        assert_relative_eq!(position.y, (0.003 * speed + 0.001) * elapsed * speed, epsilon = 1e-7);
    }

    #[test]
    fn direction_scales_displacement() {
        let mut curve = curve_with(&[(Vec2::ZERO, vec2(-0.5, 0.25))], vec2(0.01, 0.01), 0.0);
        curve.advance(1.0, 1.0, false);
        let position = curve.points()[0].position();
        assert_relative_eq!(position.x, -0.005, epsilon = 1e-7);
        assert_relative_eq!(position.y, 0.0025, epsilon = 1e-7);
    }

    #[test]
    fn bounce_flips_only_crossed_axis() {
        let mut curve = curve_with(&[(vec2(0.999, 0.0), vec2(1.0, 1.0))], vec2(0.01, 0.0), 0.0);
        curve.advance(1.0, 1.0, false);
        let point = curve.points()[0];
        assert!(point.position().x > 1.0);
        assert_eq!(point.direction(), vec2(-1.0, 1.0));

        // Moves back inside on the next tick
        curve.advance(1.0, 1.0, false);
        assert!(curve.points()[0].position().x <= 1.0);
    }

    #[test]
    fn corner_bounce_flips_both_axes() {
        let mut curve = curve_with(&[(vec2(-0.999, 0.999), vec2(-1.0, 1.0))], vec2(0.01, 0.01), 0.0);
        curve.advance(1.0, 1.0, false);
        assert_eq!(curve.points()[0].direction(), vec2(1.0, -1.0));
    }

    #[test]
    fn points_never_escape_by_more_than_one_step() {
        let velocity = vec2(0.001, 0.0011);
        let point_speed = 0.0011;
        let start: Vec<_> = (0..16)
            .map(|i| {
                let f = i as f32 / 16.0;
                (vec2(f * 2.0 - 1.0, 1.0 - f * 2.0), vec2(0.12 - f * 0.3, f * 0.3 - 0.18))
            })
            .collect();
        let mut curve = curve_with(&start, velocity, point_speed);

        let (elapsed, speed) = (16.0, 3.0);
        let max_step_x = (velocity.x + point_speed) * 0.18 * elapsed * speed;
        let max_step_y = (velocity.y * speed + point_speed) * 0.18 * elapsed * speed;

        for _ in 0..5000 {
            curve.advance(elapsed, speed, false);
            for point in curve.points() {
                assert!(point.position().x.abs() <= 1.0 + max_step_x + 1e-6);
                assert!(point.position().y.abs() <= 1.0 + max_step_y + 1e-6);
            }
        }
    }

    #[test]
    fn hue_wraps_into_range() {
        let mut curve = Curve::new(Vec2::ZERO, 0.0, &mut rng());
        curve.hue = 200.0;
        let mut wrapped = false;
        let mut last = curve.hue();
        for _ in 0..3600 {
            curve.advance(1.0, 1.0, false);
            if curve.hue() < last {
                wrapped = true;
            }
            last = curve.hue();
            assert!((0.0..360.0).contains(&curve.hue()));
        }
        assert!(wrapped);
    }

    #[test]
    fn hue_wraps_in_a_single_long_step() {
        let mut curve = Curve::new(Vec2::ZERO, 0.0, &mut rng());
        curve.hue = 0.0;
        curve.advance(3600.0, 1.0, false);
        assert_eq!(curve.hue(), 0.0);
        assert!((0.0..360.0).contains(&curve.hue()));
    }

    #[test]
    fn size_oscillates_only_when_enabled() {
        let mut curve = Curve::new(Vec2::ZERO, 0.0, &mut rng());
        let base = curve.base_size();

        curve.advance(500.0, 1.0, false);
        assert_eq!(curve.point_size(), base);

        curve.advance(500.0, 1.0, true);
        let expected = base + curve.size_amplitude() * (curve.size_frequency() * 0.5).sin();
        assert_relative_eq!(curve.point_size(), expected, epsilon = 1e-5);

        curve.advance(500.0, 1.0, false);
        assert_eq!(curve.point_size(), base);
    }

    #[test]
    fn drawable_from_four_points() {
        let mut curve = Curve::new(Vec2::ZERO, 0.0, &mut rng());
        for i in 0..4 {
            assert!(!curve.is_drawable());
            assert_eq!(curve.sample_count_for(BasisFamily::Spline, 10), None);
            curve.append(Point::new(vec2(i as f32 * 0.1, 0.0), Vec2::ZERO));
        }
        assert!(curve.is_drawable());
        assert_eq!(curve.sample_count_for(BasisFamily::Spline, 10), Some(11));
        assert_eq!(curve.sample_count_for(BasisFamily::Bezier, 10), Some(11));
    }
}
