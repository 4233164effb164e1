//! Configuration for heartglow.
//! Serde structs with hand-written defaults, color schemes, and presets.

use serde::{Deserialize, Serialize};

// ============================================================================
// Quality tier
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum QualityTier {
    /// Desktop-class settings.
    Full,
    /// Constrained hosts: fewer particles, shorter trails, coarser outline.
    Reduced,
}

impl Default for QualityTier {
    fn default() -> Self {
        Self::Full
    }
}

// ============================================================================
// Color schemes
// ============================================================================

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ColorScheme {
    pub name: String,
    /// Radial gradient stops, center outward, at offsets 0.0 / 0.7 / 1.0.
    pub stops: [[u8; 3]; 3],
    pub background: [u8; 3],
    /// Flat particle color used on the low-power path.
    pub flat: [u8; 3],
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::azure()
    }
}

impl ColorScheme {
    pub fn azure() -> Self {
        Self {
            name: "Azure".to_string(),
            stops: [[0, 168, 255], [0, 151, 230], [0, 119, 182]],
            background: [5, 10, 20],
            flat: [51, 173, 255],
        }
    }

    pub fn crimson() -> Self {
        Self {
            name: "Crimson".to_string(),
            stops: [[255, 120, 150], [230, 60, 100], [170, 20, 70]],
            background: [18, 5, 10],
            flat: [255, 99, 130],
        }
    }

    pub fn ember() -> Self {
        Self {
            name: "Ember".to_string(),
            stops: [[255, 210, 120], [255, 140, 40], [200, 60, 0]],
            background: [12, 6, 2],
            flat: [255, 160, 60],
        }
    }

    pub fn orchid() -> Self {
        Self {
            name: "Orchid".to_string(),
            stops: [[240, 160, 255], [190, 90, 230], [120, 40, 170]],
            background: [10, 5, 18],
            flat: [210, 130, 250],
        }
    }

    pub fn moonlight() -> Self {
        Self {
            name: "Moonlight".to_string(),
            stops: [[255, 255, 255], [190, 200, 215], [120, 130, 150]],
            background: [8, 10, 14],
            flat: [220, 228, 240],
        }
    }

    pub fn all_schemes() -> Vec<ColorScheme> {
        vec![
            Self::azure(),
            Self::crimson(),
            Self::ember(),
            Self::orchid(),
            Self::moonlight(),
        ]
    }
}

// ============================================================================
// Heart outline
// ============================================================================

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct HeartConfig {
    /// Angular step between outline samples, radians.
    pub detail: f32,
    /// Componentwise (x, y) scale per concentric layer, outermost first.
    pub layers: Vec<[f32; 2]>,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            detail: 0.1,
            layers: vec![[210.0, 13.0], [150.0, 9.0], [90.0, 5.0]],
        }
    }
}

impl HeartConfig {
    /// Constrained-tier outline: coarser sampling, 70% scale.
    pub fn reduced() -> Self {
        Self {
            detail: 0.3,
            layers: vec![[147.0, 9.1], [105.0, 6.3], [63.0, 3.5]],
        }
    }
}

// ============================================================================
// Particles
// ============================================================================

/// Probability table consulted once a particle has arrived at its target.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize, Debug)]
pub struct TargetJitter {
    /// Chance of jumping to a uniformly random outline point.
    pub reassign: f32,
    /// Chance of flipping traversal direction before stepping.
    pub reverse: f32,
}

impl Default for TargetJitter {
    fn default() -> Self {
        Self {
            reassign: 0.05,
            reverse: 0.01,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ParticleConfig {
    /// One particle per outline point when set; `count` otherwise.
    pub count_follows_outline: bool,
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Per-particle drag multiplier range. Must stay below 1.0 or velocity
    /// never bleeds off.
    pub min_damping: f32,
    pub max_damping: f32,
    /// Fraction of the normalized steering force fed into velocity per tick.
    pub steer_gain: f32,
    /// Distance at which a particle counts as arrived at its target.
    pub arrival_radius: f32,
    pub jitter: TargetJitter,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count_follows_outline: true,
            count: 120,
            min_radius: 2.0,
            max_radius: 4.0,
            min_speed: 1.0,
            max_speed: 4.0,
            min_damping: 0.75,
            max_damping: 0.9,
            steer_gain: 0.1,
            arrival_radius: 10.0,
            jitter: TargetJitter::default(),
        }
    }
}

// ============================================================================
// Trails
// ============================================================================

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct TrailConfig {
    /// Points kept per particle. Fixed for the lifetime of a particle.
    pub length: usize,
    /// Exponential-approach factor: each trail point moves this fraction of
    /// the way toward its predecessor every tick. The trail is an elastic
    /// ribbon, not a frame-by-frame position history.
    pub smoothing: f32,
    /// How much the circle radius shrinks toward the tail, 0..1.
    pub taper: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            length: 50,
            smoothing: 0.4,
            taper: 0.7,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RenderConfig {
    /// Alpha of the background wash blended over the previous frame.
    /// Below 1.0 old frames bleed through as motion blur.
    pub fade_alpha: f32,
    /// Flat colors and no trails; the reduced-motion branch.
    pub low_power: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fade_alpha: 0.2,
            low_power: false,
        }
    }
}

// ============================================================================
// Pulse
// ============================================================================

#[derive(Clone, Copy, PartialEq, Serialize, Deserialize, Debug)]
pub struct PulseConfig {
    /// Phase advance per second at the neutral gait.
    pub rate: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self { rate: 0.6 }
    }
}

// ============================================================================
// Main app configuration
// ============================================================================

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct AppConfig {
    pub tier: QualityTier,
    pub heart: HeartConfig,
    pub particles: ParticleConfig,
    pub trails: TrailConfig,
    pub pulse: PulseConfig,
    pub render: RenderConfig,
    pub color_scheme_index: usize,
}

impl AppConfig {
    pub fn get_color_scheme(&self) -> ColorScheme {
        let schemes = ColorScheme::all_schemes();
        schemes
            .get(self.color_scheme_index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Apply tier-dependent settings (the desktop/constrained split).
    pub fn apply_tier(&mut self) {
        match self.tier {
            QualityTier::Full => {
                self.heart = HeartConfig::default();
                self.particles.count = 120;
                self.trails.length = 50;
            }
            QualityTier::Reduced => {
                self.heart = HeartConfig::reduced();
                self.particles.count_follows_outline = false;
                self.particles.count = 60;
                self.trails.length = 20;
            }
        }
    }

    /// All available preset names.
    pub fn preset_names() -> Vec<&'static str> {
        vec!["Nested Bloom", "Classic Blue", "Ember Waltz", "Low Power"]
    }

    /// Apply a preset by name.
    pub fn apply_preset(&mut self, name: &str) {
        match name {
            "Nested Bloom" => self.preset_nested_bloom(),
            "Classic Blue" => self.preset_classic_blue(),
            "Ember Waltz" => self.preset_ember_waltz(),
            "Low Power" => self.preset_low_power(),
            _ => {}
        }
    }

    /// Three nested outlines, one particle per point, elastic ribbons.
    pub fn preset_nested_bloom(&mut self) {
        *self = Self::default();
    }

    /// Single outline chased by a fixed pool of 120 particles, shorter smear.
    pub fn preset_classic_blue(&mut self) {
        *self = Self::default();
        self.heart = HeartConfig {
            detail: 0.1,
            layers: vec![[200.0, 13.0]],
        };
        self.particles.count_follows_outline = false;
        self.particles.count = 120;
        self.render.fade_alpha = 0.5;
        self.color_scheme_index = 0;
    }

    /// Slow warm beat with long, loose trails.
    pub fn preset_ember_waltz(&mut self) {
        *self = Self::default();
        self.color_scheme_index = 2;
        self.pulse.rate = 0.45;
        self.trails.length = 70;
        self.trails.smoothing = 0.3;
        self.render.fade_alpha = 0.12;
    }

    /// Reduced tier with flat colors and no trails.
    pub fn preset_low_power(&mut self) {
        *self = Self::default();
        self.tier = QualityTier::Reduced;
        self.apply_tier();
        self.render.low_power = true;
    }
}
