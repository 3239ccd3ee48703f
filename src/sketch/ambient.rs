use crate::config::*;
use glam::{Vec2, vec2};
use rand::Rng;

/// Drift parameters shared by every point added to the curve in progress
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Ambient {
    pub velocity: Vec2,
    pub point_speed: f32,
    pub direction: Vec2,
}

impl Ambient {
    /// Draws fresh velocity, point speed and direction
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            velocity: vec2(base_speed(rng), base_speed(rng)),
            point_speed: base_speed(rng),
            direction: vec2(perturbation(rng), perturbation(rng)),
        }
    }
}

/// `0.001 * U(0,1) + 0.0001`
pub fn base_speed(rng: &mut impl Rng) -> f32 {
    BASE_SPEED_SCALE * rng.random::<f32>() + BASE_SPEED_OFFSET
}

/// `(U(0,1) - 0.6) * 0.3`, biased towards negative values
pub fn perturbation(rng: &mut impl Rng) -> f32 {
    (rng.random::<f32>() - PERTURBATION_BIAS) * PERTURBATION_SCALE
}

/// Draws `min + span * U(0,1)`
pub fn in_range(rng: &mut impl Rng, min: f32, span: f32) -> f32 {
    min + span * rng.random::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DRAWS: usize = 10_000;

    #[test]
    fn base_speed_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..DRAWS {
            let speed = base_speed(&mut rng);
            assert!((BASE_SPEED_OFFSET..BASE_SPEED_OFFSET + BASE_SPEED_SCALE).contains(&speed));
        }
    }

    #[test]
    fn perturbation_is_biased_negative() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sum = 0.0;
        for _ in 0..DRAWS {
            let p = perturbation(&mut rng);
            assert!((-0.181..0.121).contains(&p));
            sum += p;
        }
        let mean = sum / DRAWS as f32;
        // Expected mean is (0.5 - 0.6) * 0.3 = -0.03
        assert!((mean + 0.03).abs() < 0.005, "mean = {mean}");
    }

    #[test]
    fn draws_are_independent() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = Ambient::random(&mut rng);
        let b = Ambient::random(&mut rng);
        assert_ne!(a, b);
        assert_ne!(a.velocity.x, a.velocity.y);
    }

    #[test]
    fn same_seed_same_draws() {
        let a = Ambient::random(&mut StdRng::seed_from_u64(5));
        let b = Ambient::random(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
