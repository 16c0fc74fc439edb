// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing::{debug, trace};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::surface::{InputSource, Surface};

#[derive(Default)]
struct Pen {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
    bold: Option<bool>,
    pos: Option<(u16, u16)>,
}

/// Raw-mode alternate screen. Presents frames by diffing against the
/// previously presented one and writing runs of same-styled cells.
pub struct Terminal {
    stdout: Stdout,
    frame: Frame,
    last: Option<Frame>,
    run: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }

        Ok(Self {
            stdout: out,
            frame: Frame::new(0, 0, None),
            last: None,
            run: String::with_capacity(64),
        })
    }

    fn style(&mut self, pen: &mut Pen, cell: &Cell) -> Result<()> {
        if pen.fg != Some(cell.fg) {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = Some(cell.fg);
        }
        if pen.bg != Some(cell.bg) {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = Some(cell.bg);
        }
        if pen.bold != Some(cell.bold) {
            let attr = if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            };
            self.stdout.queue(SetAttribute(attr))?;
            pen.bold = Some(cell.bold);
        }
        Ok(())
    }

    fn flush_run(&mut self, pen: &mut Pen, x: u16, y: u16, style: &Cell) -> Result<()> {
        if self.run.is_empty() {
            return Ok(());
        }
        if pen.pos != Some((x, y)) {
            self.stdout.queue(cursor::MoveTo(x, y))?;
        }
        self.style(pen, style)?;
        self.stdout.queue(Print(self.run.as_str()))?;
        let next = x.saturating_add(self.run.chars().count() as u16);
        pen.pos = (next < self.frame.width).then_some((next, y));
        self.run.clear();
        Ok(())
    }
}

impl Surface for Terminal {
    fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    fn erase(&mut self, width: u16, height: u16, bg: Option<Color>) {
        if width != self.frame.width || height != self.frame.height {
            debug!(width, height, "resize");
        }
        self.frame.resize(width, height);
        self.frame.clear_with_bg(bg);
    }

    fn put(&mut self, x: i32, y: i32, cell: Cell) {
        self.frame.set(x, y, cell);
    }

    fn present(&mut self) -> Result<()> {
        let full = self
            .last
            .as_ref()
            .map_or(true, |l| l.width != self.frame.width || l.height != self.frame.height);
        if full {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        let mut pen = Pen::default();
        let width = self.frame.width;
        for y in 0..self.frame.height {
            let mut run_start = 0u16;
            let mut run_style: Option<Cell> = None;
            for x in 0..width {
                let cell = self
                    .frame
                    .get(x as i32, y as i32)
                    .copied()
                    .unwrap_or(Cell::blank_with_bg(None));
                let unchanged = !full
                    && self
                        .last
                        .as_ref()
                        .and_then(|l| l.get(x as i32, y as i32))
                        .is_some_and(|old| *old == cell);

                let extends = run_style.is_some_and(|s| s.same_style(&cell)) && !unchanged;
                if !extends {
                    if let Some(style) = run_style.take() {
                        self.flush_run(&mut pen, run_start, y, &style)?;
                    }
                    if unchanged {
                        continue;
                    }
                    run_start = x;
                    run_style = Some(cell);
                }
                self.run.push(cell.ch);
            }
            if let Some(style) = run_style {
                self.flush_run(&mut pen, run_start, y, &style)?;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        self.last = Some(self.frame.clone());
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn poll_key(&mut self) -> Option<KeyEvent> {
        match event::poll(Duration::ZERO) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                trace!(error = %e, "input poll failed");
                return None;
            }
        }
        match event::read() {
            Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => Some(k),
            Ok(_) => None,
            Err(e) => {
                trace!(error = %e, "input read failed");
                None
            }
        }
    }
}
