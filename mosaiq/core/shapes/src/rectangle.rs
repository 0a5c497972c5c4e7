use mosaiq_core::{RasterContext, Span};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// An axis-aligned filled rectangle defined by two integer corner points.
/// The corners may be stored in any order; rasterization normalizes them.
pub struct Rectangle {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
}

impl Rectangle {
  /// Creates a small random rectangle anchored at a uniform point.
  pub fn random<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> Rectangle {
    let x1 = p_rng.random_range(0..p_width);
    let y1 = p_rng.random_range(0..p_height);
    let x2 = (x1 + p_rng.random_range(0..32) + 1).clamp(0, p_width - 1);
    let y2 = (y1 + p_rng.random_range(0..32) + 1).clamp(0, p_height - 1);
    Rectangle { x1, y1, x2, y2 }
  }

  /// Perturbs one corner by a uniform offset, clamped to the canvas.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    match p_rng.random_range(0..2) {
      0 => {
        self.x1 = (self.x1 + p_rng.random_range(-10..=10)).clamp(0, p_width - 1);
        self.y1 = (self.y1 + p_rng.random_range(-10..=10)).clamp(0, p_height - 1);
      }
      _ => {
        self.x2 = (self.x2 + p_rng.random_range(-10..=10)).clamp(0, p_width - 1);
        self.y2 = (self.y2 + p_rng.random_range(-10..=10)).clamp(0, p_height - 1);
      }
    }
  }

  /// Returns the corners ordered as `(min_x, min_y, max_x, max_y)`.
  fn ordered(&self) -> (i32, i32, i32, i32) {
    (
      self.x1.min(self.x2),
      self.y1.min(self.y2),
      self.x1.max(self.x2),
      self.y1.max(self.y2),
    )
  }

  /// Rasterizes the rectangle: one full-alpha span per covered row.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    p_ctx.begin();
    let (x1, y1, x2, y2) = self.ordered();
    for y in y1..=y2 {
      p_ctx.push(y, x1, x2, 0xFFFF);
    }
    p_ctx.spans()
  }

  /// Emits the rectangle as an SVG rect element.
  pub fn svg(&self, p_attrs: &str) -> String {
    let (x1, y1, x2, y2) = self.ordered();
    format!(
      "<rect {} x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" />",
      p_attrs,
      x1,
      y1,
      x2 - x1 + 1,
      y2 - y1 + 1
    )
  }

  /// Returns the rectangle mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> Rectangle {
    let map = |v: i32| ((v as f64 + 0.5) * p_scale).round() as i32;
    Rectangle {
      x1: map(self.x1),
      y1: map(self.y1),
      x2: map(self.x2),
      y2: map(self.y2),
    }
  }
}
