use mosaiq_core::math::degrees;
use mosaiq_core::{RasterContext, Span};
use rand::Rng;

/// Smallest interior angle a triangle may have, in degrees.
const MIN_DEGREES: f64 = 15.0;
/// Off-canvas margin allowed for triangle vertices.
const MARGIN: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A filled triangle with integer vertices.
pub struct Triangle {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
  pub x3: i32,
  pub y3: i32,
}

impl Triangle {
  /// Creates a random triangle: one uniform vertex with the other two
  /// nearby, then mutated until the angle constraint holds.
  pub fn random<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> Triangle {
    let x1 = p_rng.random_range(0..p_width);
    let y1 = p_rng.random_range(0..p_height);
    let x2 = x1 + p_rng.random_range(-15..=15);
    let y2 = y1 + p_rng.random_range(-15..=15);
    let x3 = x1 + p_rng.random_range(-15..=15);
    let y3 = y1 + p_rng.random_range(-15..=15);
    let mut t = Triangle { x1, y1, x2, y2, x3, y3 };
    t.mutate(p_width, p_height, p_rng);
    t
  }

  /// Perturbs one vertex by a uniform offset, retrying until the triangle
  /// keeps all interior angles above the minimum.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    let lo_x = -MARGIN;
    let hi_x = p_width - 1 + MARGIN;
    let lo_y = -MARGIN;
    let hi_y = p_height - 1 + MARGIN;
    loop {
      match p_rng.random_range(0..3) {
        0 => {
          self.x1 = (self.x1 + p_rng.random_range(-10..=10)).clamp(lo_x, hi_x);
          self.y1 = (self.y1 + p_rng.random_range(-10..=10)).clamp(lo_y, hi_y);
        }
        1 => {
          self.x2 = (self.x2 + p_rng.random_range(-10..=10)).clamp(lo_x, hi_x);
          self.y2 = (self.y2 + p_rng.random_range(-10..=10)).clamp(lo_y, hi_y);
        }
        _ => {
          self.x3 = (self.x3 + p_rng.random_range(-10..=10)).clamp(lo_x, hi_x);
          self.y3 = (self.y3 + p_rng.random_range(-10..=10)).clamp(lo_y, hi_y);
        }
      }
      if self.valid() {
        break;
      }
    }
  }

  /// True when all three interior angles are at least the minimum.
  fn valid(&self) -> bool {
    let angle = |ox: i32, oy: i32, px: i32, py: i32, qx: i32, qy: i32| -> f64 {
      let mut x1 = (px - ox) as f64;
      let mut y1 = (py - oy) as f64;
      let mut x2 = (qx - ox) as f64;
      let mut y2 = (qy - oy) as f64;
      let d1 = (x1 * x1 + y1 * y1).sqrt();
      let d2 = (x2 * x2 + y2 * y2).sqrt();
      if d1 == 0.0 || d2 == 0.0 {
        return 0.0;
      }
      x1 /= d1;
      y1 /= d1;
      x2 /= d2;
      y2 /= d2;
      degrees((x1 * x2 + y1 * y2).clamp(-1.0, 1.0).acos())
    };
    let a1 = angle(self.x1, self.y1, self.x2, self.y2, self.x3, self.y3);
    let a2 = angle(self.x2, self.y2, self.x1, self.y1, self.x3, self.y3);
    let a3 = 180.0 - a1 - a2;
    a1 > MIN_DEGREES && a2 > MIN_DEGREES && a3 > MIN_DEGREES
  }

  /// Rasterizes the triangle by splitting it at the middle vertex into a
  /// flat-bottom and a flat-top half.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    p_ctx.begin();
    let (mut x1, mut y1) = (self.x1, self.y1);
    let (mut x2, mut y2) = (self.x2, self.y2);
    let (mut x3, mut y3) = (self.x3, self.y3);
    if y1 > y3 {
      std::mem::swap(&mut x1, &mut x3);
      std::mem::swap(&mut y1, &mut y3);
    }
    if y1 > y2 {
      std::mem::swap(&mut x1, &mut x2);
      std::mem::swap(&mut y1, &mut y2);
    }
    if y2 > y3 {
      std::mem::swap(&mut x2, &mut x3);
      std::mem::swap(&mut y2, &mut y3);
    }
    if y1 == y3 {
      // Degenerate horizontal sliver.
      let lo = x1.min(x2).min(x3);
      let hi = x1.max(x2).max(x3);
      p_ctx.push(y1, lo, hi, 0xFFFF);
    } else if y2 == y3 {
      fill_flat_bottom(p_ctx, x1, y1, x2, y2, x3, y3);
    } else if y1 == y2 {
      fill_flat_top(p_ctx, x1, y1, x2, y2, x3, y3);
    } else {
      let x4 = x1 + (((y2 - y1) as f64 / (y3 - y1) as f64) * (x3 - x1) as f64) as i32;
      fill_flat_bottom(p_ctx, x1, y1, x2, y2, x4, y2);
      fill_flat_top(p_ctx, x2, y2, x4, y2, x3, y3);
    }
    p_ctx.spans()
  }

  /// Emits the triangle as an SVG polygon element.
  pub fn svg(&self, p_attrs: &str) -> String {
    format!(
      "<polygon {} points=\"{},{} {},{} {},{}\" />",
      p_attrs, self.x1, self.y1, self.x2, self.y2, self.x3, self.y3
    )
  }

  /// Returns the triangle mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> Triangle {
    let map = |v: i32| ((v as f64 + 0.5) * p_scale).round() as i32;
    Triangle {
      x1: map(self.x1),
      y1: map(self.y1),
      x2: map(self.x2),
      y2: map(self.y2),
      x3: map(self.x3),
      y3: map(self.y3),
    }
  }
}

/// Fills the half with a flat bottom edge: apex `(x1, y1)`, base at `y2 == y3`.
fn fill_flat_bottom(p_ctx: &mut RasterContext, x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32) {
  let s1 = (x2 - x1) as f64 / (y2 - y1) as f64;
  let s2 = (x3 - x1) as f64 / (y3 - y1) as f64;
  let mut ax = x1 as f64;
  let mut bx = x1 as f64;
  for y in y1..=y2 {
    let a = ax as i32;
    let b = bx as i32;
    ax += s1;
    bx += s2;
    p_ctx.push(y, a.min(b), a.max(b), 0xFFFF);
  }
}

/// Fills the half with a flat top edge at `y1 == y2`, apex `(x3, y3)`.
/// Walks upward from the apex, excluding the shared row emitted by the
/// flat-bottom half.
fn fill_flat_top(p_ctx: &mut RasterContext, x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32) {
  let s1 = (x3 - x1) as f64 / (y3 - y1) as f64;
  let s2 = (x3 - x2) as f64 / (y3 - y2) as f64;
  let mut ax = x3 as f64;
  let mut bx = x3 as f64;
  let mut y = y3;
  while y > y1 {
    ax -= s1;
    bx -= s2;
    let a = ax as i32;
    let b = bx as i32;
    p_ctx.push(y, a.min(b), a.max(b), 0xFFFF);
    y -= 1;
  }
}
