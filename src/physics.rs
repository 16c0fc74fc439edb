// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::particle::{rain_glyph, Kind, Particle, SNOW_GLYPH, SNOW_RESISTANCE};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindField {
    pub strength: f64,
    /// Symmetric jitter bound, never negative.
    pub variation: f64,
}

impl WindField {
    pub fn new(strength: f64, variation: f64) -> Self {
        Self {
            strength,
            variation: variation.max(0.0),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.variation > 0.0 {
            self.strength + rng.random_range(-self.variation..=self.variation)
        } else {
            self.strength
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsEngine {
    pub gravitation: f64,
    pub temperature_delta: f64,
    pub max_fall_speed: f64,
    pub wind: WindField,
}

impl PhysicsEngine {
    pub fn new(
        gravitation: f64,
        temperature_delta: f64,
        max_fall_speed: f64,
        wind: WindField,
    ) -> Self {
        Self {
            gravitation,
            temperature_delta,
            max_fall_speed,
            wind,
        }
    }

    pub fn advance<R: Rng + ?Sized>(&self, p: &mut Particle, rng: &mut R) {
        match p.kind {
            Kind::Lightning | Kind::Overlay => return,
            Kind::Rain | Kind::Snow => {}
        }

        p.vx += self.wind.sample(rng) * p.wind_resistance;

        p.charge += self.temperature_delta;
        self.apply_phase(p, rng);

        p.vy += self.gravitation;
        p.x += p.vx;
        p.y += p.vy.min(self.max_fall_speed / p.wind_resistance);
    }

    fn apply_phase<R: Rng + ?Sized>(&self, p: &mut Particle, rng: &mut R) {
        if p.charge <= 0.0 {
            if p.kind != Kind::Snow {
                p.kind = Kind::Snow;
                p.glyph = SNOW_GLYPH;
                p.wind_resistance = rng.random_range(SNOW_RESISTANCE);
            }
        } else if p.kind != Kind::Rain {
            // Melted flakes keep their drag.
            p.kind = Kind::Rain;
            p.glyph = rain_glyph(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::particle::RAIN_GLYPHS;

    fn still_air(temperature_delta: f64) -> PhysicsEngine {
        PhysicsEngine::new(0.02, temperature_delta, 1.4, WindField::new(0.0, 0.0))
    }

    #[test]
    fn wind_sample_stays_within_variation() {
        let mut rng = StdRng::seed_from_u64(3);
        let wind = WindField::new(0.5, 0.2);
        for _ in 0..1000 {
            let w = wind.sample(&mut rng);
            assert!((0.3..=0.7).contains(&w), "sample {w}");
        }
    }

    #[test]
    fn negative_variation_is_clamped() {
        let wind = WindField::new(-1.0, -3.0);
        assert_eq!(wind.variation, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(wind.sample(&mut rng), -1.0);
    }

    #[test]
    fn rain_freezes_and_melts_back() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = Particle::rain(10.0, 0.0, 0.1, 1.0, &mut rng);

        still_air(-5.0).advance(&mut p, &mut rng);
        assert_eq!(p.kind, Kind::Snow);
        assert_eq!(p.glyph, SNOW_GLYPH);
        assert!(SNOW_RESISTANCE.contains(&p.wind_resistance));
        let frozen_drag = p.wind_resistance;

        still_air(5.0).advance(&mut p, &mut rng);
        assert_eq!(p.kind, Kind::Rain);
        assert!(RAIN_GLYPHS.contains(&p.glyph));
        assert_eq!(p.wind_resistance, frozen_drag);
    }

    #[test]
    fn snow_keeps_drag_while_frozen() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut p = Particle::rain(0.0, 0.0, 0.1, 0.0, &mut rng);
        let engine = still_air(-0.5);
        engine.advance(&mut p, &mut rng);
        let drag = p.wind_resistance;
        for _ in 0..10 {
            engine.advance(&mut p, &mut rng);
            assert_eq!(p.wind_resistance, drag);
        }
    }

    #[test]
    fn lightning_and_overlay_are_static() {
        let mut rng = StdRng::seed_from_u64(2);
        let engine = PhysicsEngine::new(3.0, -10.0, 5.0, WindField::new(4.0, 2.0));
        for mut p in [
            Particle::lightning(5.0, 7.0, &mut rng),
            Particle::overlay(1.0, 2.0, '~'),
        ] {
            let before = p.clone();
            engine.advance(&mut p, &mut rng);
            assert_eq!(p, before);
        }
    }

    #[test]
    fn fall_speed_is_capped_by_drag() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = Particle::rain(0.0, 0.0, 10.0, 1.0, &mut rng);
        p.wind_resistance = 2.0;
        let engine = PhysicsEngine::new(0.0, 0.0, 1.4, WindField::new(0.0, 0.0));
        engine.advance(&mut p, &mut rng);
        assert!((p.y - 0.7).abs() < 1e-6);
        assert_eq!(p.vy, 10.0);
    }

    #[test]
    fn wind_scales_with_resistance_and_x_is_uncapped() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut p = Particle::rain(0.0, 0.0, 0.1, 1.0, &mut rng);
        p.wind_resistance = 1.0;
        let engine = PhysicsEngine::new(0.0, 0.0, 1.4, WindField::new(3.0, 0.0));
        engine.advance(&mut p, &mut rng);
        engine.advance(&mut p, &mut rng);
        assert!((p.vx - 6.0).abs() < 1e-6);
        assert!((p.x - 9.0).abs() < 1e-6);
    }
}
