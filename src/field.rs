// Copyright (c) 2026 rezky_nightky

use std::ops::Range;

use rand::Rng;

use crate::particle::{Kind, Particle};

pub const SPAWN_FALL_SPEED: Range<f64> = 0.05..0.13;
pub const REFERENCE_FPS: f64 = 30.0;

pub fn scaled_quota(base_quota: f64, fps: u32) -> f64 {
    base_quota * REFERENCE_FPS / (fps.max(1) as f64)
}

#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    spawn_remainder: f64,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn insert(&mut self, p: Particle) {
        self.particles.push(p);
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.particles.iter().filter(|p| p.kind == kind).count()
    }

    pub fn purge(&mut self, kind: Kind) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.kind != kind);
        before - self.particles.len()
    }

    /// Spawns rain along the top row. Fractional quotas carry over to later
    /// ticks so low per-tick rates still average out.
    pub fn spawn_drops<R: Rng + ?Sized>(
        &mut self,
        width: u16,
        quota: f64,
        cap: usize,
        charge: f64,
        rng: &mut R,
    ) -> usize {
        if width == 0 || !quota.is_finite() || quota <= 0.0 {
            return 0;
        }

        let budget = quota + self.spawn_remainder;
        let wanted = budget.floor() as usize;
        self.spawn_remainder = budget - wanted as f64;

        let room = cap.saturating_sub(self.particles.len());
        let n = wanted.min(room);
        for _ in 0..n {
            let x = rng.random_range(0..width) as f64;
            let vy = rng.random_range(SPAWN_FALL_SPEED);
            self.particles.push(Particle::rain(x, 0.0, vy, charge, rng));
        }
        n
    }

    /// Wraps every particle horizontally and drops the ones that left the
    /// viewport vertically. Overlay particles are only wrapped.
    pub fn cull_and_wrap(&mut self, width: u16, height: u16) {
        let w = width as f64;
        let h = height as f64;
        self.particles.retain_mut(|p| {
            p.x = wrap(p.x, w);
            match p.kind {
                Kind::Overlay => true,
                Kind::Rain | Kind::Snow | Kind::Lightning => p.y >= 0.0 && p.y < h,
            }
        });
    }
}

fn wrap(x: f64, w: f64) -> f64 {
    if w <= 0.0 || !x.is_finite() {
        return 0.0;
    }
    let r = x.rem_euclid(w);
    // rem_euclid can round up to `w` for tiny negative inputs.
    if r >= w {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn spawn_respects_population_cap() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new();
        assert_eq!(field.spawn_drops(80, 10.0, 25, 1.0, &mut rng), 10);
        assert_eq!(field.spawn_drops(80, 10.0, 25, 1.0, &mut rng), 10);
        assert_eq!(field.spawn_drops(80, 10.0, 25, 1.0, &mut rng), 5);
        assert_eq!(field.spawn_drops(80, 1000.0, 25, 1.0, &mut rng), 0);
        assert_eq!(field.len(), 25);
    }

    #[test]
    fn spawned_drops_start_on_top_row() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut field = ParticleField::new();
        field.spawn_drops(40, 50.0, 500, 2.0, &mut rng);
        for p in field.iter() {
            assert_eq!(p.kind, Kind::Rain);
            assert_eq!(p.y, 0.0);
            assert!(p.x >= 0.0 && p.x < 40.0);
            assert_eq!(p.x.fract(), 0.0);
            assert!(SPAWN_FALL_SPEED.contains(&p.vy));
            assert_eq!(p.charge, 2.0);
        }
    }

    #[test]
    fn fractional_quota_accumulates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::new();
        let spawned: usize = (0..4)
            .map(|_| field.spawn_drops(10, 0.5, 100, 1.0, &mut rng))
            .sum();
        assert_eq!(spawned, 2);
    }

    #[test]
    fn quota_scales_inversely_with_fps() {
        assert_eq!(scaled_quota(3.0, 30), 3.0);
        assert_eq!(scaled_quota(3.0, 60), 1.5);
        assert_eq!(scaled_quota(3.0, 15), 6.0);
    }

    #[test]
    fn cull_and_wrap_keeps_particles_in_view() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut field = ParticleField::new();
        let xs = [-0.000_001, -3.5, 0.0, 79.9, 80.0, 161.2, 1e6];
        for (i, x) in xs.iter().enumerate() {
            field.insert(Particle::rain(*x, i as f64, 0.1, 1.0, &mut rng));
        }
        field.insert(Particle::rain(5.0, 24.0, 0.1, 1.0, &mut rng));
        field.insert(Particle::rain(5.0, 30.5, 0.1, 1.0, &mut rng));
        field.insert(Particle::rain(5.0, -0.5, 0.1, 1.0, &mut rng));

        field.cull_and_wrap(80, 24);

        assert_eq!(field.len(), xs.len());
        for p in field.iter() {
            assert!(p.x >= 0.0 && p.x < 80.0, "x {}", p.x);
            assert!(p.y < 24.0);
        }
    }

    #[test]
    fn overlay_particles_wrap_but_survive_culling() {
        let mut field = ParticleField::new();
        field.insert(Particle::overlay(85.0, 40.0, '~'));
        field.cull_and_wrap(80, 24);
        assert_eq!(field.len(), 1);
        assert_eq!(field.iter().next().map(|p| p.x), Some(5.0));
    }

    #[test]
    fn purge_removes_only_requested_kind() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = ParticleField::new();
        field.spawn_drops(20, 4.0, 100, 1.0, &mut rng);
        field.insert(Particle::lightning(3.0, 1.0, &mut rng));
        field.insert(Particle::lightning(4.0, 2.0, &mut rng));
        assert_eq!(field.purge(Kind::Lightning), 2);
        assert_eq!(field.count(Kind::Lightning), 0);
        assert_eq!(field.count(Kind::Rain), 4);
    }
}
