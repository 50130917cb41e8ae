//! Software framebuffer for the road view
//!
//! The road is rasterised into an RGB buffer with twice the terminal's row
//! count, then shown with upper-half-block cells so each terminal cell
//! carries two vertical pixels.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use super::scene::{Placement, Scene};
use crate::assets::{AssetProvider, Sprite};
use crate::game::state::BACKGROUND_SPAN;
use crate::game::{wrap_position, Facing, Rgb};

const SKY_TOP: Rgb = Rgb(40, 90, 200);
const SKY_HORIZON: Rgb = Rgb(170, 210, 255);
const FAR_HILLS: Rgb = Rgb(70, 110, 90);
const NEAR_HILLS: Rgb = Rgb(40, 80, 50);

/// Half-block glyph: foreground paints the upper pixel
const HALF_BLOCK: &str = "▀";

/// RGB pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
        }
    }

    /// Buffer covering a terminal area, two pixels per cell vertically
    pub fn for_area(area: Rect) -> Self {
        Self::new(area.width as usize, area.height as usize * 2)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize to match `area`, keeping the allocation when the size is unchanged
    pub fn resize_to(&mut self, area: Rect) {
        let (width, height) = (area.width as usize, area.height as usize * 2);
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Fill the pixels of row `y` whose centres lie in `[x0, x1)`
    fn fill_span(&mut self, y: usize, x0: f64, x1: f64, color: Rgb) {
        if y >= self.height || x1 <= x0 {
            return;
        }
        let start = (x0 - 0.5).ceil().max(0.0);
        let end = (x1 - 0.5).ceil().min(self.width as f64);
        if start >= end {
            return;
        }
        let row = y * self.width;
        for x in start as usize..end as usize {
            self.pixels[row + x] = color;
        }
    }

    /// Fill the trapezoid between two horizontal edges.
    ///
    /// Each edge is a centre `x`, a row `y` and a half-width `w`. Pixel rows
    /// whose centres fall between the two edges are filled.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_quad(&mut self, color: Rgb, x1: f64, y1: f64, w1: f64, x2: f64, y2: f64, w2: f64) {
        let values = [x1, y1, w1, x2, y2, w2];
        if values.iter().any(|v| !v.is_finite()) || y1 == y2 {
            return;
        }

        let (top, bottom) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
        let first = (top - 0.5).ceil().max(0.0);
        let last = (bottom - 0.5).ceil().min(self.height as f64);
        if first >= last {
            return;
        }

        for y in first as usize..last as usize {
            let t = (y as f64 + 0.5 - y1) / (y2 - y1);
            let cx = x1 + (x2 - x1) * t;
            let cw = w1 + (w2 - w1) * t;
            self.fill_span(y, cx - cw, cx + cw, color);
        }
    }

    /// Draw `sprite` scaled into `placement`, skipping transparent texels
    /// and every row at or below the placement's clip line
    pub fn blit_sprite(&mut self, sprite: &Sprite, placement: &Placement) {
        let Placement {
            left,
            top,
            width,
            height,
            clip,
        } = *placement;
        if !(width > 0.0 && height > 0.0) || ![left, top, clip].iter().all(|v| v.is_finite()) {
            return;
        }

        let bottom = (top + height).min(clip);
        let first_row = (top - 0.5).ceil().max(0.0);
        let last_row = (bottom - 0.5).ceil().min(self.height as f64);
        let first_col = (left - 0.5).ceil().max(0.0);
        let last_col = (left + width - 0.5).ceil().min(self.width as f64);
        if first_row >= last_row || first_col >= last_col {
            return;
        }

        for y in first_row as usize..last_row as usize {
            let v = (y as f64 + 0.5 - top) / height;
            for x in first_col as usize..last_col as usize {
                let u = (x as f64 + 0.5 - left) / width;
                if let Some(color) = sprite.sample(u, v) {
                    self.pixels[y * self.width + x] = color;
                }
            }
        }
    }

    /// Paint the sky and two parallax hill layers, shifted by `offset`
    /// (in `[0, BACKGROUND_SPAN)`)
    pub fn draw_background(&mut self, offset: f64) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let horizon = self.height as f64 / 2.0;
        let shift = wrap_position(offset, BACKGROUND_SPAN) / BACKGROUND_SPAN * self.width as f64;

        for y in 0..self.height {
            let t = (y as f64 / horizon).min(1.0);
            let sky = lerp(SKY_TOP, SKY_HORIZON, t);
            let row = y * self.width;
            self.pixels[row..row + self.width].fill(sky);
        }

        for x in 0..self.width {
            let phase = (x as f64 + shift) / self.width as f64 * std::f64::consts::TAU;
            let far = horizon - (0.18 + 0.08 * (phase * 2.0).sin()) * horizon;
            let near = horizon - (0.08 + 0.05 * (phase * 3.0 + 1.3).sin().abs()) * horizon;
            for y in far.max(0.0) as usize..self.height {
                let color = if (y as f64) >= near { NEAR_HILLS } else { FAR_HILLS };
                self.pixels[y * self.width + x] = color;
            }
        }
    }

    /// Paint a projected scene: background, road bands, decorations, the
    /// opponent and finally the player car
    pub fn draw_scene(
        &mut self,
        scene: &Scene,
        assets: &dyn AssetProvider,
        facing: Facing,
        background_offset: f64,
    ) {
        self.draw_background(background_offset);

        let full_width = self.width as f64;
        for band in &scene.bands {
            let (near, far) = (&band.near, &band.far);
            self.fill_quad(band.colors.surface, 0.0, near.y, full_width, 0.0, far.y, full_width);
            self.fill_quad(
                band.colors.rumble,
                near.x,
                near.y,
                near.w * 1.2,
                far.x,
                far.y,
                far.w * 1.2,
            );
            self.fill_quad(band.colors.road, near.x, near.y, near.w, far.x, far.y, far.w);
        }

        let decorations = assets.decorations();
        for decoration in &scene.decorations {
            if let Some(sprite) = decorations.get(decoration.sprite) {
                self.blit_sprite(sprite, &decoration.placement);
            }
        }

        if let Some(actor) = &scene.actor {
            self.blit_sprite(assets.opponent(), &actor.placement);
        }

        if let Some(player) = &scene.player {
            self.blit_sprite(assets.vehicle(facing), player);
        }
    }
}

fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

impl Widget for &Framebuffer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = (self.height / 2).min(area.height as usize);
        let columns = self.width.min(area.width as usize);

        for row in 0..rows {
            for column in 0..columns {
                let upper = self.pixels[(row * 2) * self.width + column];
                let lower = self.pixels[(row * 2 + 1) * self.width + column];
                let position = (area.x + column as u16, area.y + row as u16);
                if let Some(cell) = buf.cell_mut(position) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(color(upper))
                        .set_bg(color(lower));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ProceduralAssets;
    use crate::game::{Projection, SegmentColors};
    use crate::render::scene::{RoadBand, SpritePlacement};

    const RED: Rgb = Rgb(255, 0, 0);

    #[test]
    fn test_fill_quad_rectangle() {
        let mut fb = Framebuffer::new(10, 10);
        fb.fill_quad(RED, 5.0, 8.0, 2.0, 5.0, 2.0, 2.0);

        assert_eq!(fb.get(3, 2), Some(RED));
        assert_eq!(fb.get(6, 7), Some(RED));
        assert_eq!(fb.get(2, 5), Some(Rgb::BLACK));
        assert_eq!(fb.get(7, 5), Some(Rgb::BLACK));
        assert_eq!(fb.get(4, 1), Some(Rgb::BLACK));
        assert_eq!(fb.get(4, 8), Some(Rgb::BLACK));
    }

    #[test]
    fn test_fill_quad_trapezoid_narrows() {
        let mut fb = Framebuffer::new(20, 10);
        fb.fill_quad(RED, 10.0, 10.0, 8.0, 10.0, 0.0, 0.0);

        let width_at = |fb: &Framebuffer, y: usize| {
            (0..20).filter(|&x| fb.get(x, y) == Some(RED)).count()
        };
        assert!(width_at(&fb, 9) > width_at(&fb, 5));
        assert!(width_at(&fb, 5) > width_at(&fb, 1));
    }

    #[test]
    fn test_fill_quad_ignores_degenerate_input() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill_quad(RED, 2.0, 1.0, 2.0, 2.0, 1.0, 2.0);
        fb.fill_quad(RED, f64::NAN, 0.0, 2.0, 2.0, 4.0, 2.0);
        fb.fill_quad(RED, 2.0, -50.0, 1e9, 2.0, 1e9, 1e9);
        // Only the last, finite quad paints
        assert!(fb.pixels.iter().all(|&p| p == RED));
    }

    #[test]
    fn test_blit_respects_clip() {
        let mut fb = Framebuffer::new(10, 10);
        let sprite = Sprite::solid(4, 4, RED);
        let placement = Placement {
            left: 2.0,
            top: 2.0,
            width: 4.0,
            height: 6.0,
            clip: 5.0,
        };
        fb.blit_sprite(&sprite, &placement);

        assert_eq!(fb.get(2, 2), Some(RED));
        assert_eq!(fb.get(5, 4), Some(RED));
        // At and below the clip line nothing is drawn
        assert_eq!(fb.get(3, 5), Some(Rgb::BLACK));
        assert_eq!(fb.get(3, 7), Some(Rgb::BLACK));
        assert_eq!(fb.get(6, 3), Some(Rgb::BLACK));
    }

    #[test]
    fn test_blit_skips_transparent_texels() {
        let mut fb = Framebuffer::new(4, 2);
        fb.clear(Rgb::WHITE);
        let sprite = Sprite::from_art(2, 1, &["#."], &[('#', RED)]);
        let placement = Placement {
            left: 0.0,
            top: 0.0,
            width: 4.0,
            height: 2.0,
            clip: 2.0,
        };
        fb.blit_sprite(&sprite, &placement);

        assert_eq!(fb.get(0, 0), Some(RED));
        assert_eq!(fb.get(1, 1), Some(RED));
        assert_eq!(fb.get(3, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn test_blit_off_screen_is_safe() {
        let mut fb = Framebuffer::new(4, 4);
        let sprite = Sprite::solid(4, 4, RED);
        let placement = Placement {
            left: -100.0,
            top: -100.0,
            width: 1000.0,
            height: 1000.0,
            clip: 1e9,
        };
        fb.blit_sprite(&sprite, &placement);
        assert!(fb.pixels.iter().all(|&p| p == RED));
    }

    #[test]
    fn test_background_wraps() {
        let mut a = Framebuffer::new(32, 16);
        let mut b = Framebuffer::new(32, 16);
        a.draw_background(0.0);
        b.draw_background(BACKGROUND_SPAN);
        assert_eq!(a, b);
        assert_eq!(a.get(0, 0), Some(SKY_TOP));
    }

    #[test]
    fn test_draw_scene_paints_road() {
        let assets = ProceduralAssets::new();
        let mut fb = Framebuffer::new(40, 20);
        let colors = SegmentColors {
            surface: Rgb(0, 200, 0),
            rumble: Rgb::WHITE,
            road: Rgb(100, 100, 100),
        };
        let scene = Scene {
            bands: vec![RoadBand {
                colors,
                near: Projection {
                    x: 20.0,
                    y: 20.0,
                    w: 10.0,
                    scale: 0.0,
                },
                far: Projection {
                    x: 20.0,
                    y: 10.0,
                    w: 2.0,
                    scale: 0.0,
                },
            }],
            decorations: vec![SpritePlacement {
                sprite: 99,
                placement: Placement {
                    left: 0.0,
                    top: 0.0,
                    width: 5.0,
                    height: 5.0,
                    clip: 20.0,
                },
            }],
            actor: None,
            player: None,
        };

        fb.draw_scene(&scene, &assets, Facing::Front, 0.0);
        assert_eq!(fb.get(20, 18), Some(Rgb(100, 100, 100)));
        assert_eq!(fb.get(1, 18), Some(Rgb(0, 200, 0)));
    }

    #[test]
    fn test_widget_uses_half_blocks() {
        let mut fb = Framebuffer::new(2, 4);
        fb.set(0, 0, RED);
        fb.set(0, 1, Rgb::WHITE);

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        (&fb).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), HALF_BLOCK);
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_resize_to_area() {
        let mut fb = Framebuffer::new(1, 1);
        fb.resize_to(Rect::new(0, 0, 80, 24));
        assert_eq!(fb.width(), 80);
        assert_eq!(fb.height(), 48);
    }
}
