// Copyright (c) 2026 rezky_nightky

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub dx: i32,
    pub dy: i32,
    pub ch: char,
}

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("cannot read art {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no art named {0:?}")]
    UnknownResource(String),
}

const EMBEDDED: &[(&str, &str)] = &[
    ("cloud", include_str!("../assets/cloud.txt")),
    ("cloud_small", include_str!("../assets/cloud_small.txt")),
];

/// Turns a glyph map into opaque cells; spaces are transparent.
pub fn parse_art(text: &str) -> Vec<Glyph> {
    text.lines()
        .enumerate()
        .flat_map(|(dy, line)| {
            line.chars()
                .enumerate()
                .filter(|(_, ch)| *ch != ' ' && *ch != '\t')
                .map(move |(dx, ch)| Glyph {
                    dx: dx as i32,
                    dy: dy as i32,
                    ch,
                })
        })
        .collect()
}

pub fn art_width(art: &[Glyph]) -> i32 {
    art.iter().map(|g| g.dx + 1).max().unwrap_or(0)
}

#[derive(Clone, Debug, Default)]
pub struct ArtLibrary {
    dir: Option<PathBuf>,
}

impl ArtLibrary {
    /// Files named `<name>.txt` in `dir` take precedence over built-in art.
    pub fn new(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf),
        }
    }

    pub fn load(&self, name: &str) -> Result<Vec<Glyph>, ArtError> {
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{name}.txt"));
            match fs::read_to_string(&path) {
                Ok(text) => return Ok(parse_art(&text)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(ArtError::Io { path, source }),
            }
        }
        EMBEDDED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, text)| parse_art(text))
            .ok_or_else(|| ArtError::UnknownResource(name.to_string()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Clouds {
    large: Vec<Glyph>,
    small: Vec<Glyph>,
}

impl Clouds {
    pub fn load(lib: &ArtLibrary) -> Result<Self, ArtError> {
        Ok(Self {
            large: lib.load("cloud")?,
            small: lib.load("cloud_small")?,
        })
    }

    pub fn layout(&self, width: u16) -> Vec<(i32, i32, char)> {
        const ANCHORS: [(f32, bool); 4] =
            [(0.03, true), (0.32, false), (0.55, true), (0.85, false)];
        let mut out = Vec::new();
        for (frac, large) in ANCHORS {
            let art = if large { &self.large } else { &self.small };
            let x0 = (width as f32 * frac) as i32;
            if x0 + art_width(art) > width as i32 {
                continue;
            }
            out.extend(art.iter().map(|g| (x0 + g.dx, g.dy, g.ch)));
        }
        out
    }
}

/// Centered bordered box listing key bindings, clipped to the viewport.
pub fn help_panel(rows: &[(String, &str)], cols: u16, lines: u16) -> Vec<(i32, i32, char)> {
    const PAD_X: usize = 2;
    const PAD_Y: usize = 1;
    const BORDER: usize = 1;
    let title = "nimbus keys";

    let key_w = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let mut content: Vec<Vec<char>> = vec![title.chars().collect(), Vec::new()];
    content.extend(
        rows.iter()
            .map(|(k, text)| format!("{k:<key_w$}  {text}").chars().collect()),
    );

    let frame_w = 2 * (BORDER + PAD_X);
    let frame_h = 2 * (BORDER + PAD_Y);
    let (cols, lines) = (cols as usize, lines as usize);
    if cols <= frame_w || lines <= frame_h {
        return Vec::new();
    }

    let content_w = content
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .clamp(1, cols - frame_w);
    content.truncate(lines - frame_h);
    let box_w = content_w + frame_w;
    let box_h = content.len() + frame_h;
    let left = (cols - box_w) / 2;
    let top = (lines - box_h) / 2;

    let mut out = Vec::with_capacity(box_w * box_h);
    for y in 0..box_h {
        for x in 0..box_w {
            let edge_y = y == 0 || y + 1 == box_h;
            let edge_x = x == 0 || x + 1 == box_w;
            let ch = match (edge_x, edge_y) {
                (true, true) => '+',
                (false, true) => '-',
                (true, false) => '|',
                (false, false) => {
                    let inner_y = y.checked_sub(BORDER + PAD_Y);
                    let inner_x = x.checked_sub(BORDER + PAD_X);
                    match (inner_y, inner_x) {
                        (Some(iy), Some(ix)) if ix < content_w => content
                            .get(iy)
                            .and_then(|line| line.get(ix))
                            .copied()
                            .unwrap_or(' '),
                        _ => ' ',
                    }
                }
            };
            out.push(((left + x) as i32, (top + y) as i32, ch));
        }
    }
    out
}
