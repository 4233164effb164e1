//! heartglow - pulsing heart particle animation.

mod compositor;
mod config;
mod heart;
mod particles;
mod pulse;

use std::time::Instant;

use eframe::egui;
use tracing::{info, warn};

use compositor::Compositor;
use config::{AppConfig, ColorScheme, QualityTier};
use heart::Outline;
use particles::ParticleEngine;
use pulse::PulseClock;

/// Main application state.
struct HeartglowApp {
    config: AppConfig,
    /// Last config the engine was built from; structural edits trigger a
    /// rebuild, everything else is consumed live each frame.
    applied: AppConfig,
    engine: ParticleEngine,
    compositor: Compositor,
    clock: PulseClock,
    last_update: Instant,

    // UI state
    show_settings: bool,
    scheme_names: Vec<String>,
}

impl HeartglowApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_unmultiplied(10, 10, 18, 245);
        visuals.panel_fill = egui::Color32::from_rgba_unmultiplied(12, 12, 22, 240);
        cc.egui_ctx.set_visuals(visuals);

        let config = AppConfig::default();
        let engine = Self::build_engine(&config, 1280.0, 720.0);
        info!(
            particles = engine.particles.len(),
            outline = engine.outline().len(),
            "engine ready"
        );

        let scheme_names: Vec<String> = ColorScheme::all_schemes()
            .iter()
            .map(|s| s.name.clone())
            .collect();

        Self {
            applied: config.clone(),
            config,
            engine,
            compositor: Compositor::new(1280, 720),
            clock: PulseClock::new(),
            last_update: Instant::now(),
            show_settings: true,
            scheme_names,
        }
    }

    fn build_engine(config: &AppConfig, width: f32, height: f32) -> ParticleEngine {
        let outline = Outline::sample(&config.heart.layers, config.heart.detail);
        ParticleEngine::new(
            width,
            height,
            outline,
            &config.particles,
            &config.trails,
            config.render.low_power,
            &config.get_color_scheme(),
        )
    }

    /// Rebuild the engine when a structural setting changed. Resizing alone
    /// never resamples the outline.
    fn sync_engine(&mut self) {
        if self.config == self.applied {
            return;
        }
        let structural = self.config.heart != self.applied.heart
            || self.config.particles != self.applied.particles
            || self.config.trails.length != self.applied.trails.length
            || self.config.render.low_power != self.applied.render.low_power
            || self.config.color_scheme_index != self.applied.color_scheme_index;
        if structural {
            self.engine = Self::build_engine(&self.config, self.engine.width, self.engine.height);
            info!(
                particles = self.engine.particles.len(),
                outline = self.engine.outline().len(),
                "engine rebuilt"
            );
        }
        self.applied = self.config.clone();
    }
}

impl eframe::App for HeartglowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;

        self.sync_engine();

        self.render_top_bar(ctx);
        if self.show_settings {
            self.render_settings_panel(ctx);
        }
        self.render_canvas(ctx, dt);

        // Animation never idles.
        ctx.request_repaint();
    }
}

impl HeartglowApp {
    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("heartglow");
                ui.separator();
                let label = if self.show_settings {
                    "Hide settings"
                } else {
                    "Settings"
                };
                if ui.button(label).clicked() {
                    self.show_settings = !self.show_settings;
                }
                ui.separator();
                ui.label(format!(
                    "{} particles / {} outline points",
                    self.engine.particles.len(),
                    self.engine.outline().len()
                ));
            });
        });
    }

    fn render_settings_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("settings")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Presets");
                ui.horizontal_wrapped(|ui| {
                    for name in AppConfig::preset_names() {
                        if ui.button(name).clicked() {
                            self.config.apply_preset(name);
                        }
                    }
                });

                ui.separator();
                ui.heading("Quality");
                let prev_tier = self.config.tier;
                egui::ComboBox::from_label("Tier")
                    .selected_text(match self.config.tier {
                        QualityTier::Full => "Full",
                        QualityTier::Reduced => "Reduced",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.config.tier, QualityTier::Full, "Full");
                        ui.selectable_value(&mut self.config.tier, QualityTier::Reduced, "Reduced");
                    });
                if self.config.tier != prev_tier {
                    self.config.apply_tier();
                }

                ui.separator();
                ui.heading("Heart");
                ui.add(
                    egui::Slider::new(&mut self.config.heart.detail, 0.02..=0.5)
                        .text("Detail (rad)"),
                );
                ui.add(egui::Slider::new(&mut self.config.pulse.rate, 0.1..=2.0).text("Pulse rate"));

                ui.separator();
                ui.heading("Particles");
                ui.checkbox(
                    &mut self.config.particles.count_follows_outline,
                    "One particle per outline point",
                );
                if !self.config.particles.count_follows_outline {
                    ui.add(egui::Slider::new(&mut self.config.particles.count, 10..=600).text("Count"));
                }
                ui.add(egui::Slider::new(&mut self.config.trails.length, 2..=120).text("Trail length"));
                ui.add(
                    egui::Slider::new(&mut self.config.trails.smoothing, 0.05..=0.9)
                        .text("Trail smoothing"),
                );
                ui.add(
                    egui::Slider::new(&mut self.config.render.fade_alpha, 0.02..=1.0)
                        .text("Background fade"),
                );
                ui.checkbox(
                    &mut self.config.render.low_power,
                    "Low power (flat, no trails)",
                );

                ui.separator();
                ui.heading("Colors");
                let mut index = self.config.color_scheme_index;
                egui::ComboBox::from_label("Scheme")
                    .selected_text(
                        self.scheme_names
                            .get(index)
                            .cloned()
                            .unwrap_or_default(),
                    )
                    .show_ui(ui, |ui| {
                        for (i, name) in self.scheme_names.iter().enumerate() {
                            ui.selectable_value(&mut index, i, name);
                        }
                    });
                self.config.color_scheme_index = index;

                ui.separator();
                ui.heading("Config");
                ui.horizontal(|ui| {
                    if ui.button("Save…").clicked() {
                        self.save_config();
                    }
                    if ui.button("Load…").clicked() {
                        self.load_config();
                    }
                });
                if ui.button("Snapshot PNG…").clicked() {
                    self.save_snapshot();
                }
            });
    }

    fn render_canvas(&mut self, ctx: &egui::Context, dt: f32) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (rect, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
                let width = rect.width().max(1.0);
                let height = rect.height().max(1.0);

                self.engine.resize(width, height);
                self.compositor.resize(width as u32, height as u32);

                let pulse_scale = self.clock.advance(dt, &self.config.pulse);
                self.engine
                    .update(&self.config.particles, &self.config.trails, pulse_scale);

                let scheme = self.config.get_color_scheme();
                self.compositor.composite(
                    &self.engine,
                    &self.config.trails,
                    &self.config.render,
                    scheme.background,
                );
                self.compositor.paint(ui, rect);
            });
    }

    fn save_config(&self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .save_file()
        {
            match self.config.save(&path.to_string_lossy()) {
                Ok(()) => info!(path = %path.display(), "config saved"),
                Err(e) => warn!("config save failed: {e:#}"),
            }
        }
    }

    fn load_config(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match AppConfig::load(&path.to_string_lossy()) {
                Ok(config) => {
                    info!(path = %path.display(), "config loaded");
                    self.config = config;
                }
                Err(e) => warn!("config load failed: {e:#}"),
            }
        }
    }

    fn save_snapshot(&self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .save_file()
        {
            match self.compositor.save_png(&path) {
                Ok(()) => info!(path = %path.display(), "snapshot saved"),
                Err(e) => warn!("snapshot failed: {e:#}"),
            }
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("heartglow")
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "heartglow",
        options,
        Box::new(|cc| Box::new(HeartglowApp::new(cc))),
    )
}
