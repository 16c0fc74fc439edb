// Copyright (c) 2026 rezky_nightky

mod cell;
mod config;
mod field;
mod flash;
mod frame;
mod keymap;
mod overlay;
mod palette;
mod particle;
mod physics;
mod runtime;
mod surface;
mod terminal;
mod weather;

use std::env;
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{Args, Settings, SettingsStore, MAX_FPS, MIN_FPS};
use crate::overlay::{ArtLibrary, Clouds};
use crate::palette::Palette;
use crate::runtime::{detect_color_mode_from_env, ColorMode};
use crate::surface::Surface;
use crate::terminal::{restore_terminal_best_effort, Terminal, TerminalInput};
use crate::weather::Weather;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const LOG_ENV: &str = "NIMBUS_LOG";

fn build_info() -> String {
    let sha = env!("NIMBUS_GIT_SHA");
    if sha.is_empty() {
        env!("NIMBUS_BUILD").to_string()
    } else {
        format!("{} ({})", env!("NIMBUS_BUILD"), sha)
    }
}

fn color_enabled_stdout() -> bool {
    env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn fatal(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn require_u32_range(name: &str, v: u32, min: u32, max: u32) -> u32 {
    if v < min || v > max {
        fatal(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

fn color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        Some(depth) => ColorMode::from_depth(depth).unwrap_or_else(|e| fatal(e)),
        None => detect_color_mode_from_env(),
    }
}

fn init_logging(path: &Path) {
    let file = File::create(path)
        .unwrap_or_else(|e| fatal(format!("cannot open log file {}: {}", path.display(), e)));
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let fps = args
        .fps
        .map(|v| require_u32_range("--fps", v, MIN_FPS, MAX_FPS));
    let color_mode = color_mode(&args);

    if let Some(path) = &args.log_file {
        init_logging(path);
    }

    let store = SettingsStore::new(&args.config);
    let mut settings = store.load_or_init().unwrap_or_else(|e| fatal(e));
    if let Some(fps) = fps {
        settings.frame.rate = fps;
    }
    if args.no_clouds {
        settings.frame.show_clouds = false;
    }

    if args.print_config {
        print!("{}", settings.to_toml().unwrap_or_else(|e| fatal(e)));
        return Ok(());
    }

    let (settings, keymap) = Settings::resolve(settings).unwrap_or_else(|e| fatal(e));
    let art = ArtLibrary::new(settings.frame.art_dir.as_deref());
    let clouds = Clouds::load(&art).unwrap_or_else(|e| fatal(e));
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    info!(
        config = %store.path().display(),
        width = w,
        height = h,
        color = color_mode.label(),
        fps = settings.frame.rate,
        seed = ?args.seed,
        "startup"
    );

    let mut weather = Weather::new(
        settings,
        keymap,
        store,
        Palette::new(color_mode),
        clouds,
        rng,
    );
    weather.run(&mut term, &mut TerminalInput)?;
    drop(term);

    Ok(())
}
