//! CPU compositor for heartglow.
//! Persistent frame buffer, translucent fade, and trail rasterization.

use egui::{Color32, ColorImage, Rect, TextureHandle, TextureOptions, Ui};
use image::{ImageBuffer, Rgb};
use rayon::prelude::*;

use crate::config::{RenderConfig, TrailConfig};
use crate::particles::{Particle, ParticleEngine, ParticleStyle};

pub type FrameBuffer = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Owns the frame buffer the animation accumulates into. The buffer persists
/// across frames; each tick washes it with a translucent background instead
/// of clearing it, which is what turns motion into blur.
pub struct Compositor {
    width: u32,
    height: u32,
    buffer: FrameBuffer,
    texture: Option<TextureHandle>,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: ImageBuffer::new(width, height),
            texture: None,
        }
    }

    /// Reallocate on size change. Accumulated blur is lost, which is fine;
    /// it rebuilds within a few frames.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.buffer = ImageBuffer::new(width, height);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Render one frame: fade, then every particle's trail, tail first.
    pub fn composite(
        &mut self,
        engine: &ParticleEngine,
        trails: &TrailConfig,
        render: &RenderConfig,
        background: [u8; 3],
    ) {
        self.fade(background, render.fade_alpha);

        for p in &engine.particles {
            if render.low_power {
                // Single circle, no trail, matching the flat style.
                self.draw_circle(p.pos.x, p.pos.y, p.radius, &p.style, p.style.base_alpha());
            } else {
                self.draw_trail(p, trails);
            }
        }
    }

    /// Blend the background over the whole buffer. Alpha below 1.0 leaves
    /// the previous frame showing through.
    fn fade(&mut self, background: [u8; 3], alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        let inv = 1.0 - a;
        let bg = [
            background[0] as f32 * a,
            background[1] as f32 * a,
            background[2] as f32 * a,
        ];

        let pixels: &mut [u8] = &mut self.buffer;
        pixels.par_chunks_exact_mut(3).for_each(|px| {
            px[0] = (px[0] as f32 * inv + bg[0]) as u8;
            px[1] = (px[1] as f32 * inv + bg[1]) as u8;
            px[2] = (px[2] as f32 * inv + bg[2]) as u8;
        });
    }

    fn draw_trail(&mut self, p: &Particle, trails: &TrailConfig) {
        let len = p.trail.len().max(1) as f32;
        // Tail first so the head lands on top.
        for (k, point) in p.trail.iter().enumerate().rev() {
            let t = k as f32 / len;
            let radius = p.radius * (1.0 - t * trails.taper);
            let alpha = (1.0 - t) * p.style.base_alpha();
            if alpha < 0.01 || radius < 0.3 {
                continue;
            }
            self.draw_circle(point.x, point.y, radius, &p.style, alpha);
        }
    }

    /// Soft-edged filled circle. Color comes from the style's gradient
    /// sampled by normalized distance from the center; coverage falls off
    /// linearly toward the rim.
    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, style: &ParticleStyle, alpha: f32) {
        if radius <= 0.0 {
            return;
        }
        let r = radius.ceil() as i32;
        let x0 = cx.round() as i32;
        let y0 = cy.round() as i32;
        let w = self.width as i32;
        let h = self.height as i32;
        let r2 = radius * radius;

        for dy in -r..=r {
            let py = y0 + dy;
            if py < 0 || py >= h {
                continue;
            }
            for dx in -r..=r {
                let px = x0 + dx;
                if px < 0 || px >= w {
                    continue;
                }
                let d2 = (dx * dx + dy * dy) as f32;
                if d2 > r2 {
                    continue;
                }

                let t = d2.sqrt() / radius;
                let color = style.sample(t);
                let a = alpha * (1.0 - t).max(0.0);
                if a <= 0.0 {
                    continue;
                }

                let pixel = self.buffer.get_pixel_mut(px as u32, py as u32);
                pixel[0] = (pixel[0] as f32 * (1.0 - a) + color[0] as f32 * a) as u8;
                pixel[1] = (pixel[1] as f32 * (1.0 - a) + color[1] as f32 * a) as u8;
                pixel[2] = (pixel[2] as f32 * (1.0 - a) + color[2] as f32 * a) as u8;
            }
        }
    }

    /// Upload the buffer and paint it into `rect`.
    pub fn paint(&mut self, ui: &Ui, rect: Rect) {
        let image = ColorImage::from_rgb(
            [self.width as usize, self.height as usize],
            self.buffer.as_raw(),
        );

        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::LINEAR);
        } else {
            self.texture = Some(ui.ctx().load_texture(
                "heartglow-frame",
                image,
                TextureOptions::LINEAR,
            ));
        }

        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter_at(rect)
                .image(texture.id(), rect, uv, Color32::WHITE);
        }
    }

    /// Save the current frame as a PNG.
    pub fn save_png(&self, path: &std::path::Path) -> anyhow::Result<()> {
        self.buffer.save(path)?;
        Ok(())
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let p = self.buffer.get_pixel(x, y);
        [p[0], p[1], p[2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorScheme, ParticleConfig, TrailConfig};
    use crate::heart::Outline;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn fade_converges_toward_background() {
        let mut compositor = Compositor::new(8, 8);
        compositor.fade([100, 100, 100], 0.5);
        assert_eq!(compositor.pixel(4, 4), [50, 50, 50]);
        compositor.fade([100, 100, 100], 0.5);
        assert_eq!(compositor.pixel(4, 4), [75, 75, 75]);
    }

    #[test]
    fn full_alpha_fade_is_a_hard_clear() {
        let mut compositor = Compositor::new(8, 8);
        let style = ParticleStyle::Flat([255, 255, 255], 1.0);
        compositor.draw_circle(4.0, 4.0, 3.0, &style, 1.0);
        compositor.fade([5, 10, 20], 1.0);
        assert_eq!(compositor.pixel(4, 4), [5, 10, 20]);
    }

    #[test]
    fn circle_is_brightest_at_the_center() {
        let mut compositor = Compositor::new(16, 16);
        let style = ParticleStyle::Gradient([[255, 255, 255], [128, 128, 128], [0, 0, 0]]);
        compositor.draw_circle(8.0, 8.0, 6.0, &style, 1.0);
        let center = compositor.pixel(8, 8);
        let rim = compositor.pixel(12, 8);
        assert!(center[0] > rim[0]);
    }

    #[test]
    fn off_canvas_circles_are_clipped() {
        let mut compositor = Compositor::new(8, 8);
        let style = ParticleStyle::Flat([255, 0, 0], 1.0);
        compositor.draw_circle(-10.0, -10.0, 5.0, &style, 1.0);
        compositor.draw_circle(100.0, 4.0, 5.0, &style, 1.0);
        compositor.draw_circle(6.0, 6.0, 50.0, &style, 1.0);
    }

    #[test]
    fn resize_reallocates_only_on_change() {
        let mut compositor = Compositor::new(8, 8);
        compositor.fade([200, 200, 200], 1.0);
        compositor.resize(8, 8);
        // Same size: buffer kept.
        assert_eq!(compositor.pixel(0, 0), [200, 200, 200]);
        compositor.resize(4, 4);
        assert_eq!(compositor.width(), 4);
        assert_eq!(compositor.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn composite_runs_without_a_texture() {
        let scheme = ColorScheme::default();
        let engine = ParticleEngine::with_rng(
            64.0,
            64.0,
            Outline::sample(&[[20.0, 1.3]], 0.3),
            &ParticleConfig::default(),
            &TrailConfig::default(),
            false,
            &scheme,
            SmallRng::seed_from_u64(6),
        );
        let mut compositor = Compositor::new(64, 64);
        compositor.composite(
            &engine,
            &TrailConfig::default(),
            &RenderConfig::default(),
            scheme.background,
        );
    }
}
