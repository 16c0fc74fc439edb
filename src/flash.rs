// Copyright (c) 2026 rezky_nightky

use rand::Rng;
use tracing::debug;

use crate::field::ParticleField;
use crate::particle::{Kind, Particle};

pub const FLASH_TICKS: u32 = 18;
const FLICKER_PERIOD: u32 = 9;
const FLICKER_BAND: std::ops::Range<u32> = 3..8;
const BOLT_JITTER: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mapping {
    Calm,
    Flicker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backdrop {
    Default,
    Filled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderState {
    pub mapping: Mapping,
    pub backdrop: Backdrop,
}

impl RenderState {
    pub const IDLE: RenderState = RenderState {
        mapping: Mapping::Calm,
        backdrop: Backdrop::Default,
    };
    pub const LIT: RenderState = RenderState {
        mapping: Mapping::Calm,
        backdrop: Backdrop::Filled,
    };
    pub const FLICKER: RenderState = RenderState {
        mapping: Mapping::Flicker,
        backdrop: Backdrop::Filled,
    };
}

#[derive(Clone, Debug)]
pub struct FlashController {
    countdown: u32,
    duration: u32,
    state: RenderState,
}

impl Default for FlashController {
    fn default() -> Self {
        Self::new(FLASH_TICKS)
    }
}

impl FlashController {
    pub fn new(duration: u32) -> Self {
        Self {
            countdown: 0,
            duration: duration.max(1),
            state: RenderState::IDLE,
        }
    }

    #[cfg(test)]
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.countdown > 0
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    /// Restarts the flash and drops a fresh bolt into `field`. Bolts from
    /// earlier triggers stay until the countdown runs out.
    pub fn trigger<R: Rng + ?Sized>(
        &mut self,
        field: &mut ParticleField,
        width: u16,
        height: u16,
        rng: &mut R,
    ) {
        self.countdown = self.duration;
        self.state = RenderState::LIT;

        if width == 0 {
            return;
        }
        let center = rng.random_range(0..width) as i32;
        for row in 0..height {
            let x = center + rng.random_range(-BOLT_JITTER..=BOLT_JITTER);
            field.insert(Particle::lightning(x as f64, row as f64, rng));
        }
        debug!(center, rows = height, "lightning");
    }

    pub fn tick(&mut self, field: &mut ParticleField) {
        if self.countdown == 0 {
            return;
        }
        self.countdown -= 1;

        if self.countdown == 0 {
            let purged = field.purge(Kind::Lightning);
            self.state = RenderState::IDLE;
            debug!(purged, "flash over");
        } else if FLICKER_BAND.contains(&(self.countdown % FLICKER_PERIOD)) {
            self.state = RenderState::FLICKER;
        } else {
            self.state = RenderState::LIT;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn trigger_drops_one_bolt_cell_per_row() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new();
        let mut flash = FlashController::default();
        flash.trigger(&mut field, 80, 24, &mut rng);

        assert_eq!(flash.countdown(), FLASH_TICKS);
        assert_eq!(flash.render_state(), RenderState::LIT);
        assert_eq!(field.count(Kind::Lightning), 24);

        let xs: Vec<f64> = field.iter().map(|p| p.x).collect();
        let lo = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(hi - lo <= (2 * BOLT_JITTER) as f64);
        for (row, p) in field.iter().enumerate() {
            assert_eq!(p.y, row as f64);
        }
    }

    #[test]
    fn envelope_clears_bolt_on_final_tick() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut field = ParticleField::new();
        let mut flash = FlashController::default();
        flash.trigger(&mut field, 80, 24, &mut rng);

        for _ in 0..FLASH_TICKS - 1 {
            flash.tick(&mut field);
            assert_eq!(field.count(Kind::Lightning), 24);
            assert!(flash.is_active());
            assert_eq!(flash.render_state().backdrop, Backdrop::Filled);
        }
        flash.tick(&mut field);
        assert_eq!(field.count(Kind::Lightning), 0);
        assert_eq!(flash.render_state(), RenderState::IDLE);
    }

    #[test]
    fn envelope_strobes_in_flicker_band() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::new();
        let mut flash = FlashController::default();
        flash.trigger(&mut field, 10, 5, &mut rng);

        let mut states = Vec::new();
        for _ in 0..FLASH_TICKS {
            flash.tick(&mut field);
            states.push((flash.countdown(), flash.render_state()));
        }
        for (countdown, state) in states {
            let expected = if countdown == 0 {
                RenderState::IDLE
            } else if (3..8).contains(&(countdown % 9)) {
                RenderState::FLICKER
            } else {
                RenderState::LIT
            };
            assert_eq!(state, expected, "countdown {countdown}");
        }
    }

    #[test]
    fn retrigger_stacks_bolts_and_restarts() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut field = ParticleField::new();
        let mut flash = FlashController::default();
        flash.trigger(&mut field, 40, 10, &mut rng);
        for _ in 0..5 {
            flash.tick(&mut field);
        }
        flash.trigger(&mut field, 40, 10, &mut rng);
        assert_eq!(flash.countdown(), FLASH_TICKS);
        assert_eq!(field.count(Kind::Lightning), 20);

        for _ in 0..FLASH_TICKS {
            flash.tick(&mut field);
        }
        assert_eq!(field.count(Kind::Lightning), 0);
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let mut field = ParticleField::new();
        let mut flash = FlashController::default();
        flash.tick(&mut field);
        assert_eq!(flash.countdown(), 0);
        assert_eq!(flash.render_state(), RenderState::IDLE);
    }
}
