// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }

    pub fn from_depth(depth: u16) -> Result<Self, String> {
        match depth {
            0 => Ok(ColorMode::Mono),
            16 => Ok(ColorMode::Color16),
            8 | 256 => Ok(ColorMode::Color256),
            24 | 32 => Ok(ColorMode::TrueColor),
            _ => Err(format!("invalid --colormode: {} (allowed: 0,16,256,24)", depth)),
        }
    }
}

pub fn detect_color_mode(colorterm: &str, term: &str) -> ColorMode {
    let colorterm = colorterm.to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = term.to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    if term.is_empty() || term == "linux" || term.starts_with("vt") {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

pub fn detect_color_mode_from_env() -> ColorMode {
    let colorterm = std::env::var("COLORTERM").unwrap_or_default();
    let term = std::env::var("TERM").unwrap_or_default();
    detect_color_mode(&colorterm, &term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorterm_wins_over_term() {
        assert_eq!(detect_color_mode("truecolor", "dumb"), ColorMode::TrueColor);
        assert_eq!(detect_color_mode("24bit", ""), ColorMode::TrueColor);
    }

    #[test]
    fn term_decides_otherwise() {
        assert_eq!(detect_color_mode("", "dumb"), ColorMode::Mono);
        assert_eq!(detect_color_mode("", "xterm-256color"), ColorMode::Color256);
        assert_eq!(detect_color_mode("", "linux"), ColorMode::Color16);
        assert_eq!(detect_color_mode("", "xterm"), ColorMode::Color256);
    }

    #[test]
    fn depth_flag_values() {
        assert_eq!(ColorMode::from_depth(0), Ok(ColorMode::Mono));
        assert_eq!(ColorMode::from_depth(256), Ok(ColorMode::Color256));
        assert_eq!(ColorMode::from_depth(32), Ok(ColorMode::TrueColor));
        assert!(ColorMode::from_depth(12).is_err());
    }
}
