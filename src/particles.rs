//! Particle engine for heartglow.
//! Steering physics, target tracking along the outline, and elastic trails.

use egui::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{ColorScheme, ParticleConfig, TargetJitter, TrailConfig};
use crate::heart::Outline;

/// Precomputed rendering style, built once when the store is created.
/// Gradients are the expensive startup cost; nothing re-derives them per
/// frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ParticleStyle {
    /// Radial gradient stops, center outward at offsets 0.0, 0.7, 1.0.
    Gradient([[u8; 3]; 3]),
    /// Single flat color with a fixed alpha, for the low-power path.
    Flat([u8; 3], f32),
}

impl ParticleStyle {
    /// Color at normalized distance `t` from the circle center.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        match self {
            Self::Flat(color, _) => *color,
            Self::Gradient(stops) => {
                let t = t.clamp(0.0, 1.0);
                if t < 0.7 {
                    lerp_rgb(stops[0], stops[1], t / 0.7)
                } else {
                    lerp_rgb(stops[1], stops[2], (t - 0.7) / 0.3)
                }
            }
        }
    }

    /// Opacity of the head of the trail.
    pub fn base_alpha(&self) -> f32 {
        match self {
            Self::Flat(_, alpha) => *alpha,
            Self::Gradient(_) => 1.0,
        }
    }
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t) as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Individual particle chasing a point on the outline.
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// Index of the outline point this particle is steering toward.
    pub target: usize,
    /// Traversal direction along the outline, +1 or -1.
    pub dir: i8,
    /// Drag multiplier applied to velocity every tick.
    pub damping: f32,
    pub style: ParticleStyle,
    /// Recent positions, head first. Length is fixed at spawn.
    pub trail: Vec<Vec2>,
}

/// Particle store plus the outline its particles chase.
pub struct ParticleEngine {
    pub particles: Vec<Particle>,
    pub width: f32,
    pub height: f32,
    outline: Outline,
    rng: SmallRng,
}

impl ParticleEngine {
    pub fn new(
        width: f32,
        height: f32,
        outline: Outline,
        config: &ParticleConfig,
        trails: &TrailConfig,
        low_power: bool,
        scheme: &ColorScheme,
    ) -> Self {
        Self::with_rng(
            width,
            height,
            outline,
            config,
            trails,
            low_power,
            scheme,
            SmallRng::from_entropy(),
        )
    }

    /// Seedable constructor; tests pin the RNG to make jitter deterministic.
    #[allow(clippy::too_many_arguments)]
    pub fn with_rng(
        width: f32,
        height: f32,
        outline: Outline,
        config: &ParticleConfig,
        trails: &TrailConfig,
        low_power: bool,
        scheme: &ColorScheme,
        rng: SmallRng,
    ) -> Self {
        let count = if config.count_follows_outline {
            outline.len()
        } else {
            config.count
        };

        let mut engine = Self {
            particles: Vec::with_capacity(count),
            width,
            height,
            outline,
            rng,
        };
        for i in 0..count {
            engine.spawn_particle(i, config, trails, low_power, scheme);
        }
        engine
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn spawn_particle(
        &mut self,
        index: usize,
        config: &ParticleConfig,
        trails: &TrailConfig,
        low_power: bool,
        scheme: &ColorScheme,
    ) {
        let pos = Vec2::new(
            self.rng.gen::<f32>() * self.width,
            self.rng.gen::<f32>() * self.height,
        );

        let style = if low_power {
            ParticleStyle::Flat(scheme.flat, 0.4 + self.rng.gen::<f32>() * 0.3)
        } else {
            ParticleStyle::Gradient(scheme.stops)
        };

        // Ranges may collapse to a point; keep the spans non-negative.
        let radius_span = (config.max_radius - config.min_radius).max(0.0);
        let speed_span = (config.max_speed - config.min_speed).max(0.0);
        let damping_span = (config.max_damping - config.min_damping).max(0.0);

        let particle = Particle {
            pos,
            vel: Vec2::ZERO,
            radius: config.min_radius + self.rng.gen::<f32>() * radius_span,
            speed: config.min_speed + self.rng.gen::<f32>() * speed_span,
            target: self.rng.gen_range(0..self.outline.len()),
            dir: if index % 2 == 0 { 1 } else { -1 },
            damping: config.min_damping + self.rng.gen::<f32>() * damping_span,
            style,
            trail: vec![pos; trails.length.max(1)],
        };

        self.particles.push(particle);
    }

    /// Advance every particle one tick toward its pulsed target.
    pub fn update(&mut self, config: &ParticleConfig, trails: &TrailConfig, pulse_scale: f32) {
        let center = Vec2::new(self.width * 0.5, self.height * 0.5);
        let Self {
            particles,
            outline,
            rng,
            ..
        } = self;

        for p in particles.iter_mut() {
            let target = center + outline.point(p.target) * pulse_scale;
            let delta = target - p.pos;
            let dist = delta.length();

            if dist < config.arrival_radius {
                Self::retarget(p, outline, &config.jitter, rng);
            }

            // Zero distance would divide by zero; skip steering this tick.
            if dist > 0.0 {
                p.vel += delta / dist * (p.speed * config.steer_gain);
            }
            p.pos += p.vel;
            p.vel *= p.damping;

            // Elastic trail: head snaps to the particle, the rest chase.
            p.trail[0] = p.pos;
            for k in 1..p.trail.len() {
                let ahead = p.trail[k - 1];
                let point = &mut p.trail[k];
                *point += (ahead - *point) * trails.smoothing;
            }
        }
    }

    /// Pick the next target for an arrived particle: occasionally jump to a
    /// random outline point, otherwise walk along the outline, rarely
    /// turning around.
    fn retarget(p: &mut Particle, outline: &Outline, jitter: &TargetJitter, rng: &mut SmallRng) {
        if rng.gen::<f32>() < jitter.reassign {
            p.target = rng.gen_range(0..outline.len());
            return;
        }
        if rng.gen::<f32>() < jitter.reverse {
            p.dir = -p.dir;
        }
        p.target = outline.wrap(p.target as i64 + p.dir as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParticleConfig, TargetJitter, TrailConfig};
    use crate::heart::Outline;

    fn test_outline() -> Outline {
        Outline::sample(&[[200.0, 13.0]], 0.1)
    }

    fn test_engine(seed: u64) -> ParticleEngine {
        ParticleEngine::with_rng(
            800.0,
            600.0,
            test_outline(),
            &ParticleConfig::default(),
            &TrailConfig::default(),
            false,
            &ColorScheme::default(),
            SmallRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn store_matches_outline_when_configured() {
        let engine = test_engine(1);
        assert_eq!(engine.particles.len(), engine.outline().len());
    }

    #[test]
    fn fixed_count_overrides_outline_length() {
        let config = ParticleConfig {
            count_follows_outline: false,
            count: 37,
            ..Default::default()
        };
        let engine = ParticleEngine::with_rng(
            800.0,
            600.0,
            test_outline(),
            &config,
            &TrailConfig::default(),
            false,
            &ColorScheme::default(),
            SmallRng::seed_from_u64(2),
        );
        assert_eq!(engine.particles.len(), 37);
    }

    #[test]
    fn trail_prefilled_with_spawn_position() {
        let engine = test_engine(3);
        for p in &engine.particles {
            assert_eq!(p.trail.len(), TrailConfig::default().length);
            for point in &p.trail {
                assert_eq!(*point, p.pos);
            }
        }
    }

    #[test]
    fn spawn_ranges_are_respected() {
        let engine = test_engine(4);
        let config = ParticleConfig::default();
        for p in &engine.particles {
            assert!(p.radius >= config.min_radius && p.radius <= config.max_radius);
            assert!(p.speed >= config.min_speed && p.speed <= config.max_speed);
            assert!(p.damping >= config.min_damping && p.damping <= config.max_damping);
            assert!(p.dir == 1 || p.dir == -1);
        }
    }

    #[test]
    fn low_power_styles_are_flat() {
        let engine = ParticleEngine::with_rng(
            800.0,
            600.0,
            test_outline(),
            &ParticleConfig::default(),
            &TrailConfig::default(),
            true,
            &ColorScheme::default(),
            SmallRng::seed_from_u64(5),
        );
        for p in &engine.particles {
            assert!(matches!(p.style, ParticleStyle::Flat(_, _)));
        }
    }

    #[test]
    fn targets_stay_in_range() {
        let mut engine = test_engine(7);
        let config = ParticleConfig::default();
        let trails = TrailConfig::default();
        for tick in 0..2_000 {
            let pulse = 0.5 * (1.0 - (tick as f32 * 0.01).cos());
            engine.update(&config, &trails, pulse);
            let len = engine.outline().len();
            for p in &engine.particles {
                assert!(p.target < len);
            }
        }
    }

    #[test]
    fn trail_length_never_changes() {
        let mut engine = test_engine(8);
        let config = ParticleConfig::default();
        let trails = TrailConfig::default();
        for _ in 0..500 {
            engine.update(&config, &trails, 0.8);
            for p in &engine.particles {
                assert_eq!(p.trail.len(), trails.length);
            }
        }
    }

    #[test]
    fn zero_distance_skips_steering() {
        let mut engine = test_engine(9);
        let config = ParticleConfig::default();
        let trails = TrailConfig::default();
        engine.particles.truncate(1);

        let pulse = 0.6;
        let center = Vec2::new(400.0, 300.0);
        let target = center + engine.outline().point(engine.particles[0].target) * pulse;
        engine.particles[0].pos = target;
        engine.particles[0].vel = Vec2::ZERO;

        engine.update(&config, &trails, pulse);

        let p = &engine.particles[0];
        assert_eq!(p.vel, Vec2::ZERO);
        assert_eq!(p.pos, target);
        assert!(p.pos.x.is_finite() && p.pos.y.is_finite());
    }

    #[test]
    fn particles_drift_toward_target() {
        let mut engine = test_engine(10);
        let config = ParticleConfig::default();
        let trails = TrailConfig::default();
        engine.particles.truncate(1);

        let pulse = 1.0;
        let center = Vec2::new(400.0, 300.0);
        let target = center + engine.outline().point(engine.particles[0].target) * pulse;
        engine.particles[0].pos = Vec2::new(10.0, 10.0);
        engine.particles[0].vel = Vec2::ZERO;
        let before = (target - engine.particles[0].pos).length();

        for _ in 0..60 {
            engine.update(&config, &trails, pulse);
        }

        let after = (target - engine.particles[0].pos).length();
        assert!(after < before, "distance grew from {before} to {after}");
    }

    #[test]
    fn forced_reassign_usually_changes_target() {
        let outline = test_outline();
        let mut rng = SmallRng::seed_from_u64(42);
        let jitter = TargetJitter {
            reassign: 1.0,
            reverse: 0.0,
        };

        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: 2.0,
            speed: 1.0,
            target: 0,
            dir: 1,
            damping: 0.85,
            style: ParticleStyle::Flat([255, 255, 255], 1.0),
            trail: vec![Vec2::ZERO; 4],
        };

        let trials = 200;
        let mut changed = 0;
        for _ in 0..trials {
            let before = p.target;
            ParticleEngine::retarget(&mut p, &outline, &jitter, &mut rng);
            if p.target != before {
                changed += 1;
            }
        }
        assert!(
            changed * 10 >= trials * 9,
            "only {changed}/{trials} reassignments moved the target"
        );
    }

    #[test]
    fn sequential_walk_wraps_at_the_ends() {
        let outline = test_outline();
        let mut rng = SmallRng::seed_from_u64(11);
        let jitter = TargetJitter {
            reassign: 0.0,
            reverse: 0.0,
        };

        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: 2.0,
            speed: 1.0,
            target: 0,
            dir: -1,
            damping: 0.85,
            style: ParticleStyle::Flat([255, 255, 255], 1.0),
            trail: vec![Vec2::ZERO; 4],
        };

        ParticleEngine::retarget(&mut p, &outline, &jitter, &mut rng);
        assert_eq!(p.target, outline.len() - 1);

        p.dir = 1;
        ParticleEngine::retarget(&mut p, &outline, &jitter, &mut rng);
        assert_eq!(p.target, 0);
    }

    #[test]
    fn gradient_sample_hits_the_stops() {
        let style = ParticleStyle::Gradient([[10, 20, 30], [100, 110, 120], [200, 210, 220]]);
        assert_eq!(style.sample(0.0), [10, 20, 30]);
        assert_eq!(style.sample(1.0), [200, 210, 220]);
        assert_eq!(style.sample(0.7), [100, 110, 120]);
    }
}
