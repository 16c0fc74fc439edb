// Copyright (c) 2026 rezky_nightky

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::{Settings, SettingsStore, MAX_FPS, MIN_FPS};
use crate::field::{scaled_quota, ParticleField};
use crate::flash::FlashController;
use crate::keymap::{Action, Direction, KeyMap, Tunable};
use crate::overlay::{help_panel, ArtLibrary, Clouds};
use crate::palette::{ColorClass, Palette};
use crate::particle::Kind;
use crate::physics::{PhysicsEngine, WindField};
use crate::surface::{InputSource, Surface};

const NOTICE_SECONDS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

fn nudge(v: f64, delta: f64) -> f64 {
    ((v + delta) * 1000.0).round() / 1000.0
}

fn physics_from(settings: &Settings) -> PhysicsEngine {
    PhysicsEngine::new(
        settings.physics.gravitation,
        settings.physics.temperature_delta,
        settings.particles.max_speed,
        WindField::new(settings.physics.wind, settings.physics.wind_variation),
    )
}

pub struct Weather {
    field: ParticleField,
    physics: PhysicsEngine,
    flash: FlashController,
    settings: Settings,
    keymap: KeyMap,
    store: SettingsStore,
    palette: Palette,
    clouds: Clouds,
    rng: StdRng,

    fps: u32,
    width: u16,
    height: u16,

    show_status: bool,
    show_help: bool,
    show_clouds: bool,

    status: String,
    notice: Option<(String, u32)>,
    frames: u64,
}

impl Weather {
    pub fn new(
        settings: Settings,
        keymap: KeyMap,
        store: SettingsStore,
        palette: Palette,
        clouds: Clouds,
        rng: StdRng,
    ) -> Self {
        let mut weather = Self {
            field: ParticleField::new(),
            physics: physics_from(&settings),
            flash: FlashController::default(),
            keymap,
            store,
            palette,
            clouds,
            rng,
            fps: settings.frame.rate,
            width: 0,
            height: 0,
            show_status: settings.frame.show_status,
            show_help: false,
            show_clouds: settings.frame.show_clouds,
            status: String::new(),
            notice: None,
            frames: 0,
            settings,
        };
        weather.refresh_status(None);
        weather
    }

    pub fn snapshot(&self) -> Settings {
        let mut s = self.settings.clone();
        s.frame.rate = self.fps;
        s.frame.show_status = self.show_status;
        s.frame.show_clouds = self.show_clouds;
        s.particles.max_speed = self.physics.max_fall_speed;
        s.physics.gravitation = self.physics.gravitation;
        s.physics.wind = self.physics.wind.strength;
        s.physics.wind_variation = self.physics.wind.variation;
        s.physics.temperature_delta = self.physics.temperature_delta;
        s
    }

    fn apply(&mut self, settings: Settings, keymap: KeyMap, clouds: Clouds) {
        self.physics = physics_from(&settings);
        self.clouds = clouds;
        self.fps = settings.frame.rate;
        self.show_status = settings.frame.show_status;
        self.show_clouds = settings.frame.show_clouds;
        self.keymap = keymap;
        self.settings = settings;
    }

    fn notify(&mut self, msg: String) {
        self.notice = Some((msg, self.fps * NOTICE_SECONDS));
    }

    /// One simulation step: input, flash, spawn, physics, cull.
    pub fn step(&mut self, width: u16, height: u16, key: Option<KeyEvent>) -> Control {
        self.width = width;
        self.height = height;

        if let Some(action) = key.and_then(|k| self.keymap.action_for(&k)) {
            if self.perform(action) == Control::Quit {
                return Control::Quit;
            }
        }

        self.flash.tick(&mut self.field);

        let quota = scaled_quota(self.settings.particles.spawn_quota, self.fps);
        self.field.spawn_drops(
            width,
            quota,
            self.settings.particles.max_count,
            self.settings.particles.spawn_charge as f64,
            &mut self.rng,
        );

        for p in self.field.iter_mut() {
            self.physics.advance(p, &mut self.rng);
        }

        self.field.cull_and_wrap(width, height);
        Control::Continue
    }

    pub fn perform(&mut self, action: Action) -> Control {
        match action {
            Action::Quit => return Control::Quit,
            Action::Lightning => {
                self.flash
                    .trigger(&mut self.field, self.width, self.height, &mut self.rng);
            }
            Action::Adjust(tunable, dir) => self.adjust(tunable, dir),
            Action::ToggleStatus => self.show_status = !self.show_status,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::ToggleClouds => self.show_clouds = !self.show_clouds,
            Action::SaveConfig => self.save(),
            Action::ReloadConfig => self.reload(),
        }
        Control::Continue
    }

    fn adjust(&mut self, tunable: Tunable, dir: Direction) {
        let delta = tunable.step() * dir.sign();
        let p = &mut self.physics;
        match tunable {
            Tunable::Gravitation => p.gravitation = nudge(p.gravitation, delta),
            Tunable::Wind => p.wind.strength = nudge(p.wind.strength, delta),
            Tunable::WindVariation => p.wind.variation = nudge(p.wind.variation, delta).max(0.0),
            Tunable::Temperature => p.temperature_delta = nudge(p.temperature_delta, delta),
            Tunable::MaxSpeed => p.max_fall_speed = nudge(p.max_fall_speed, delta).max(0.1),
            Tunable::FrameRate => {
                let fps = self.fps as f64 + delta;
                self.fps = (fps.round() as u32).clamp(MIN_FPS, MAX_FPS);
            }
        }
        debug!(?tunable, physics = ?self.physics, fps = self.fps, "adjusted");
    }

    fn save(&mut self) {
        let snapshot = self.snapshot();
        match self.store.save(&snapshot) {
            Ok(()) => {
                info!(path = %self.store.path().display(), "settings saved");
                self.settings = snapshot;
                self.notify(format!("saved {}", self.store.path().display()));
            }
            Err(e) => {
                warn!(error = %e, "settings save failed");
                self.notify(format!("save failed: {e}"));
            }
        }
    }

    fn reload(&mut self) {
        let loaded = self
            .store
            .load()
            .and_then(Settings::resolve)
            .and_then(|(s, k)| {
                let clouds = Clouds::load(&ArtLibrary::new(s.frame.art_dir.as_deref()))?;
                Ok((s, k, clouds))
            });
        match loaded {
            Ok((settings, keymap, clouds)) => {
                info!(path = %self.store.path().display(), "settings reloaded");
                self.apply(settings, keymap, clouds);
                self.notify(format!("reloaded {}", self.store.path().display()));
            }
            Err(e) => {
                warn!(error = %e, "settings reload failed");
                self.notify(format!("reload failed: {e}"));
            }
        }
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> io::Result<()> {
        let state = self.flash.render_state();
        surface.erase(self.width, self.height, self.palette.background(state));

        for p in self.field.iter() {
            let (x, y) = p.cell();
            let cell = self.palette.cell(p.glyph, ColorClass::from(p.kind), state);
            surface.put(x, y, cell);
        }

        if self.show_clouds {
            for (x, y, ch) in self.clouds.layout(self.width) {
                surface.put(x, y, self.palette.cell(ch, ColorClass::Cloud, state));
            }
        }

        if self.show_help {
            for (x, y, ch) in help_panel(self.keymap.help_rows(), self.width, self.height) {
                surface.put(x, y, self.palette.cell(ch, ColorClass::Panel, state));
            }
        }

        if self.show_status && self.height > 0 {
            let text: String = self
                .status
                .chars()
                .take((self.width as usize).saturating_sub(1))
                .collect();
            let style = self.palette.cell(' ', ColorClass::Status, state);
            surface.print(0, self.height as i32 - 1, &text, style);
        }

        surface.present()
    }

    fn refresh_status(&mut self, frame_time: Option<Duration>) {
        let fps = frame_time
            .map(|t| t.as_secs_f64())
            .filter(|s| *s > 0.0)
            .map(|s| format!("{:>3.0}", 1.0 / s))
            .unwrap_or_else(|| "  -".to_string());
        let p = &self.physics;
        self.status = format!(
            " {} fps | wind {:+.2} ±{:.2} | gravity {:+.2} | temp {:+.2} | max {:.1} | drops {} ",
            fps,
            p.wind.strength,
            p.wind.variation,
            p.gravitation,
            p.temperature_delta,
            p.max_fall_speed,
            self.field.len(),
        );

        if let Some((msg, left)) = &mut self.notice {
            self.status.push_str("| ");
            self.status.push_str(msg);
            self.status.push(' ');
            *left = left.saturating_sub(1);
            if *left == 0 {
                self.notice = None;
            }
        }
    }

    pub fn run<S, I>(&mut self, surface: &mut S, input: &mut I) -> io::Result<()>
    where
        S: Surface + ?Sized,
        I: InputSource + ?Sized,
    {
        let started = Instant::now();
        loop {
            let tick_start = Instant::now();
            let (width, height) = surface.size()?;
            let key = input.poll_key();

            if self.step(width, height, key) == Control::Quit {
                break;
            }
            self.render(surface)?;
            self.frames += 1;

            let budget = Duration::from_secs_f64(1.0 / self.fps.max(1) as f64);
            if let Some(rest) = budget.checked_sub(tick_start.elapsed()) {
                thread::sleep(rest);
            }
            self.refresh_status(Some(tick_start.elapsed()));
        }

        let secs = started.elapsed().as_secs_f64().max(0.000_001);
        info!(
            frames = self.frames,
            avg_fps = self.frames as f64 / secs,
            rain = self.field.count(Kind::Rain),
            snow = self.field.count(Kind::Snow),
            "shutdown"
        );
        Ok(())
    }
}
