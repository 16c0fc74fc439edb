// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::flash::{Backdrop, Mapping, RenderState};
use crate::particle::Kind;
use crate::runtime::ColorMode;

type Rgb = (u8, u8, u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorClass {
    Rain,
    Snow,
    Bolt,
    Decoration,
    Cloud,
    Status,
    Panel,
}

impl From<Kind> for ColorClass {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Rain => ColorClass::Rain,
            Kind::Snow => ColorClass::Snow,
            Kind::Lightning => ColorClass::Bolt,
            Kind::Overlay => ColorClass::Decoration,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Scheme {
    rain: Rgb,
    snow: Rgb,
    other: Rgb,
}

const CALM: Scheme = Scheme {
    rain: (70, 130, 220),
    snow: (235, 235, 245),
    other: (250, 220, 60),
};

const FLICKER: Scheme = Scheme {
    rain: (20, 40, 140),
    snow: (90, 90, 110),
    other: (255, 255, 255),
};

const LIT_BG: Rgb = (30, 30, 42);
const FLASH_BG: Rgb = (205, 205, 220);
const CLOUD: Rgb = (150, 150, 165);
const STATUS_FG: Rgb = (0, 0, 0);
const STATUS_BG: Rgb = (200, 200, 200);

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

fn rgb_to_ansi256((r, g, b): Rgb) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let step = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (step(r), step(g), step(b));
    let cube = (
        LEVELS[r6 as usize],
        LEVELS[g6 as usize],
        LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, (0, 0, 0)),
        239..=255 => (231, (255, 255, 255)),
        _ => {
            let i = (avg - 8) / 10;
            let v = 8 + 10 * i;
            (232 + i, (v, v, v))
        }
    };

    if dist2((r, g, b), gray) < dist2((r, g, b), cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(rgb: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, c)| dist2(rgb, *c))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub mode: ColorMode,
}

impl Palette {
    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    fn convert(&self, rgb: Rgb) -> Option<Color> {
        match self.mode {
            ColorMode::Mono => None,
            ColorMode::Color16 => Some(rgb_to_color16(rgb)),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(rgb))),
            ColorMode::TrueColor => Some(Color::Rgb {
                r: rgb.0,
                g: rgb.1,
                b: rgb.2,
            }),
        }
    }

    pub fn background(&self, state: RenderState) -> Option<Color> {
        match (state.backdrop, state.mapping) {
            (Backdrop::Default, _) => None,
            (Backdrop::Filled, Mapping::Calm) => self.convert(LIT_BG),
            (Backdrop::Filled, Mapping::Flicker) => self.convert(FLASH_BG),
        }
    }

    pub fn cell(&self, ch: char, class: ColorClass, state: RenderState) -> Cell {
        let scheme = match state.mapping {
            Mapping::Calm => CALM,
            Mapping::Flicker => FLICKER,
        };
        let bg = self.background(state);
        let (fg, bg, bold) = match class {
            ColorClass::Rain => (self.convert(scheme.rain), bg, false),
            ColorClass::Snow => (self.convert(scheme.snow), bg, false),
            ColorClass::Bolt | ColorClass::Decoration => (self.convert(scheme.other), bg, true),
            ColorClass::Cloud => (self.convert(CLOUD), bg, false),
            ColorClass::Panel => (self.convert(CALM.snow), bg, true),
            ColorClass::Status => (
                self.convert(STATUS_FG),
                self.convert(STATUS_BG),
                self.mode == ColorMode::Mono,
            ),
        };
        Cell { ch, fg, bg, bold }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256_picks_cube_and_gray() {
        assert_eq!(rgb_to_ansi256((255, 0, 0)), 196);
        assert_eq!(rgb_to_ansi256((0, 0, 0)), 16);
        assert_eq!(rgb_to_ansi256((255, 255, 255)), 231);
        assert_eq!(rgb_to_ansi256((128, 128, 128)), 244);
    }

    #[test]
    fn color16_picks_nearest() {
        assert_eq!(rgb_to_color16((250, 250, 250)), Color::White);
        assert_eq!(rgb_to_color16((10, 10, 140)), Color::DarkBlue);
    }

    #[test]
    fn backdrop_follows_render_state() {
        let p = Palette::new(ColorMode::TrueColor);
        assert_eq!(p.background(RenderState::IDLE), None);
        assert!(p.background(RenderState::LIT).is_some());
        assert_ne!(p.background(RenderState::LIT), p.background(RenderState::FLICKER));
    }

    #[test]
    fn flicker_changes_particle_colors() {
        let p = Palette::new(ColorMode::Color256);
        for class in [ColorClass::Rain, ColorClass::Snow, ColorClass::Bolt] {
            let calm = p.cell('x', class, RenderState::LIT);
            let flicker = p.cell('x', class, RenderState::FLICKER);
            assert_ne!(calm.fg, flicker.fg, "{class:?}");
        }
    }

    #[test]
    fn mono_has_no_colors() {
        let p = Palette::new(ColorMode::Mono);
        let c = p.cell('|', ColorClass::Rain, RenderState::FLICKER);
        assert_eq!((c.fg, c.bg), (None, None));
    }
}
