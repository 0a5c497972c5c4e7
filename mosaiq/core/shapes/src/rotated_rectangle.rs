use mosaiq_core::math::{radians, rotate};
use mosaiq_core::{RasterContext, Span};
use rand::Rng;

/// Largest allowed side ratio for a rotated rectangle.
const MAX_ASPECT: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A filled rectangle of size `sx` by `sy`, centered on `(x, y)` and rotated
/// by `angle` degrees.
pub struct RotatedRectangle {
  pub x: i32,
  pub y: i32,
  pub sx: i32,
  pub sy: i32,
  pub angle: i32,
}

impl RotatedRectangle {
  /// Creates a random rotated rectangle, mutated until the aspect constraint
  /// holds.
  pub fn random<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> RotatedRectangle {
    let mut r = RotatedRectangle {
      x: p_rng.random_range(0..p_width),
      y: p_rng.random_range(0..p_height),
      sx: p_rng.random_range(0..32) + 1,
      sy: p_rng.random_range(0..32) + 1,
      angle: p_rng.random_range(0..360),
    };
    r.mutate(p_width, p_height, p_rng);
    r
  }

  /// Perturbs the center, the extents, or the angle by a uniform offset,
  /// retrying until the aspect constraint holds.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    loop {
      match p_rng.random_range(0..3) {
        0 => {
          self.x = (self.x + p_rng.random_range(-10..=10)).clamp(0, p_width - 1);
          self.y = (self.y + p_rng.random_range(-10..=10)).clamp(0, p_height - 1);
        }
        1 => {
          self.sx = (self.sx + p_rng.random_range(-10..=10)).clamp(1, p_width - 1);
          self.sy = (self.sy + p_rng.random_range(-10..=10)).clamp(1, p_height - 1);
        }
        _ => {
          self.angle += p_rng.random_range(-10..=10);
        }
      }
      if self.valid() {
        break;
      }
    }
  }

  /// True when the side ratio does not exceed the aspect limit.
  fn valid(&self) -> bool {
    let aspect = self.sx.max(self.sy) as f64 / self.sx.min(self.sy) as f64;
    aspect <= MAX_ASPECT
  }

  /// Returns the four rotated corners, translated to the center.
  fn corners(&self) -> [(i32, i32); 4] {
    let sx = self.sx as f64;
    let sy = self.sy as f64;
    let theta = radians(self.angle as f64);
    let corner = |cx: f64, cy: f64| -> (i32, i32) {
      let (rx, ry) = rotate(cx, cy, theta);
      (rx as i32 + self.x, ry as i32 + self.y)
    };
    [
      corner(-sx / 2.0, -sy / 2.0),
      corner(sx / 2.0, -sy / 2.0),
      corner(sx / 2.0, sy / 2.0),
      corner(-sx / 2.0, sy / 2.0),
    ]
  }

  /// Rasterizes the rectangle by walking its four edges with two samples per
  /// pixel of edge length, tracking per-row horizontal extents.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    p_ctx.begin();
    let corners = self.corners();
    let min_y = corners.iter().map(|c| c.1).min().unwrap();
    let max_y = corners.iter().map(|c| c.1).max().unwrap();
    let rows = (max_y - min_y + 1) as usize;
    let mut lo = vec![i32::MAX; rows];
    let mut hi = vec![i32::MIN; rows];
    for i in 0..4 {
      let (ax, ay) = corners[i];
      let (bx, by) = corners[(i + 1) % 4];
      let dx = (bx - ax) as f64;
      let dy = (by - ay) as f64;
      let count = (((dx * dx + dy * dy).sqrt() as i32) * 2).max(2);
      for j in 0..count {
        let t = j as f64 / (count - 1) as f64;
        let xi = (ax as f64 + dx * t) as i32;
        let yi = (((ay as f64 + dy * t) as i32).clamp(min_y, max_y) - min_y) as usize;
        lo[yi] = lo[yi].min(xi);
        hi[yi] = hi[yi].max(xi);
      }
    }
    for (i, (&l, &h)) in lo.iter().zip(hi.iter()).enumerate() {
      if l <= h {
        p_ctx.push(min_y + i as i32, l, h, 0xFFFF);
      }
    }
    p_ctx.spans()
  }

  /// Emits the rectangle as a unit rect inside a transform group.
  pub fn svg(&self, p_attrs: &str) -> String {
    format!(
      "<g transform=\"translate({} {}) rotate({}) scale({} {})\"><rect {} x=\"-0.5\" y=\"-0.5\" width=\"1\" height=\"1\" /></g>",
      self.x, self.y, self.angle, self.sx, self.sy, p_attrs
    )
  }

  /// Returns the rectangle mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> RotatedRectangle {
    RotatedRectangle {
      x: ((self.x as f64 + 0.5) * p_scale).round() as i32,
      y: ((self.y as f64 + 0.5) * p_scale).round() as i32,
      sx: ((self.sx as f64 * p_scale).round() as i32).max(1),
      sy: ((self.sy as f64 * p_scale).round() as i32).max(1),
      angle: self.angle,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  #[test]
  fn aspect_limit_is_enforced() {
    let r = RotatedRectangle {
      x: 0,
      y: 0,
      sx: 30,
      sy: 5,
      angle: 0,
    };
    assert!(!r.valid());
    let r = RotatedRectangle { sy: 6, ..r };
    assert!(r.valid());
  }

  #[test]
  fn mutate_preserves_validity() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut r = RotatedRectangle::random(80, 80, &mut rng);
    for _ in 0..200 {
      r.mutate(80, 80, &mut rng);
      assert!(r.valid());
    }
  }

  #[test]
  fn unrotated_rasterization_matches_extents() {
    let r = RotatedRectangle {
      x: 32,
      y: 32,
      sx: 10,
      sy: 6,
      angle: 0,
    };
    let mut ctx = RasterContext::new(64, 64);
    let spans = r.rasterize(&mut ctx);
    assert!(!spans.is_empty());
    let min_y = spans.iter().map(|s| s.y).min().unwrap();
    let max_y = spans.iter().map(|s| s.y).max().unwrap();
    assert_eq!(max_y - min_y, 6);
    for s in spans {
      assert!(s.x1 >= 27 - 1 && s.x2 <= 37 + 1);
    }
  }

  #[test]
  fn rotation_by_90_degrees_swaps_extents() {
    let r = RotatedRectangle {
      x: 32,
      y: 32,
      sx: 20,
      sy: 8,
      angle: 90,
    };
    let mut ctx = RasterContext::new(64, 64);
    let spans = r.rasterize(&mut ctx);
    let min_y = spans.iter().map(|s| s.y).min().unwrap();
    let max_y = spans.iter().map(|s| s.y).max().unwrap();
    // The long side now runs vertically.
    assert!((max_y - min_y) >= 19 && (max_y - min_y) <= 21);
  }
}
