// Copyright (c) 2026 rezky_nightky

use std::ops::RangeInclusive;

use rand::distr::{weighted::WeightedIndex, Distribution};
use rand::seq::IndexedRandom;
use rand::Rng;

pub const SNOW_GLYPH: char = '❉';
pub const RAIN_GLYPHS: [char; 3] = ['|', '¦', '╿'];
const RAIN_GLYPH_WEIGHTS: [u32; 3] = [5, 5, 1];
pub const LIGHTNING_GLYPHS: [char; 3] = ['█', '▓', '░'];

pub const RAIN_RESISTANCE: RangeInclusive<f64> = 0.8..=1.2;
pub const SNOW_RESISTANCE: RangeInclusive<f64> = 1.3..=2.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Rain,
    Snow,
    Lightning,
    /// Static decoration; never moved or culled.
    #[allow(dead_code)]
    Overlay,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub wind_resistance: f64,
    pub glyph: char,
    pub kind: Kind,
    pub charge: f64,
}

impl Particle {
    pub fn rain<R: Rng + ?Sized>(x: f64, y: f64, vy: f64, charge: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy,
            wind_resistance: rng.random_range(RAIN_RESISTANCE),
            glyph: rain_glyph(rng),
            kind: Kind::Rain,
            charge,
        }
    }

    pub fn lightning<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            wind_resistance: 1.0,
            glyph: *LIGHTNING_GLYPHS.choose(rng).unwrap_or(&LIGHTNING_GLYPHS[0]),
            kind: Kind::Lightning,
            charge: 0.0,
        }
    }

    #[allow(dead_code)]
    pub fn overlay(x: f64, y: f64, glyph: char) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            wind_resistance: 1.0,
            glyph,
            kind: Kind::Overlay,
            charge: 0.0,
        }
    }

    pub fn cell(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

pub fn rain_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    match WeightedIndex::new(RAIN_GLYPH_WEIGHTS) {
        Ok(dist) => RAIN_GLYPHS[dist.sample(rng)],
        Err(_) => RAIN_GLYPHS[0],
    }
}
