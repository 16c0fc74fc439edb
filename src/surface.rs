// Copyright (c) 2026 rezky_nightky

use std::io;

use crossterm::event::KeyEvent;
use crossterm::style::Color;

use crate::cell::Cell;

pub trait Surface {
    /// Current size as `(columns, rows)`; may change between ticks.
    fn size(&self) -> io::Result<(u16, u16)>;

    fn erase(&mut self, width: u16, height: u16, bg: Option<Color>);

    /// Writes one glyph. Cells outside the surface are dropped silently.
    fn put(&mut self, x: i32, y: i32, cell: Cell);

    fn print(&mut self, x: i32, y: i32, text: &str, style: Cell) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i as i32, y, Cell { ch, ..style });
        }
    }

    fn present(&mut self) -> io::Result<()>;
}

pub trait InputSource {
    /// Next key press, or `None` when nothing is pending. Never blocks.
    fn poll_key(&mut self) -> Option<KeyEvent>;
}
