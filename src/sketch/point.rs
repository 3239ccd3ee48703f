use glam::Vec2;

/// A control point drifting through the viewport
///
/// Holds its own copy of the direction it was created with, bounces are
/// applied by flipping the sign of one direction component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    position: Vec2,
    direction: Vec2,
}

impl Point {
    pub const fn new(position: Vec2, direction: Vec2) -> Self {
        Self {
            position,
            direction,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn invert_direction_x(&mut self) {
        self.direction.x = -self.direction.x;
    }

    pub fn invert_direction_y(&mut self) {
        self.direction.y = -self.direction.y;
    }

    /// Adds `(dx, dy)` to the position, no bounds are enforced here
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn inversion_only_flips_sign() {
        let mut point = Point::new(Vec2::ZERO, vec2(0.25, -0.5));
        point.invert_direction_x();
        assert_eq!(point.direction(), vec2(-0.25, -0.5));
        point.invert_direction_y();
        assert_eq!(point.direction(), vec2(-0.25, 0.5));
        point.invert_direction_x();
        point.invert_direction_y();
        assert_eq!(point.direction(), vec2(0.25, -0.5));
    }

    #[test]
    fn translate_is_additive_and_unbounded() {
        let mut point = Point::new(vec2(0.9, -0.9), Vec2::ONE);
        point.translate(0.2, -0.3);
        point.translate(0.1, 0.0);
        assert!((point.position().x - 1.2).abs() < 1e-6);
        assert!((point.position().y + 1.2).abs() < 1e-6);
    }
}
