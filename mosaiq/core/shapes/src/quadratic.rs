use mosaiq_core::math::gaussian;
use mosaiq_core::{Path, RasterContext, Span, stroke_round};
use rand::Rng;

/// Off-canvas margin allowed for control points.
const MARGIN: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
/// A stroked quadratic Bezier curve with float control points and width.
pub struct Quadratic {
  pub x1: f64,
  pub y1: f64,
  pub x2: f64,
  pub y2: f64,
  pub x3: f64,
  pub y3: f64,
  pub width: f64,
}

impl Quadratic {
  /// Creates a random quadratic stroke: a uniform start point with the
  /// control and end points nearby, mutated until the endpoint pair is the
  /// longest leg.
  pub fn random<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> Quadratic {
    let x1 = p_rng.random::<f64>() * p_width as f64;
    let y1 = p_rng.random::<f64>() * p_height as f64;
    let x2 = x1 + p_rng.random::<f64>() * 40.0 - 20.0;
    let y2 = y1 + p_rng.random::<f64>() * 40.0 - 20.0;
    let x3 = x2 + p_rng.random::<f64>() * 40.0 - 20.0;
    let y3 = y2 + p_rng.random::<f64>() * 40.0 - 20.0;
    let mut q = Quadratic {
      x1,
      y1,
      x2,
      y2,
      x3,
      y3,
      width: 1.0,
    };
    q.mutate(p_width, p_height, p_rng);
    q
  }

  /// Perturbs one control point (Gaussian, sigma 16) or the stroke width
  /// (Gaussian, sigma 1), retrying until the shape stays valid.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    let hi_x = (p_width - 1) as f64 + MARGIN;
    let hi_y = (p_height - 1) as f64 + MARGIN;
    loop {
      match p_rng.random_range(0..4) {
        0 => {
          self.x1 = (self.x1 + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_x);
          self.y1 = (self.y1 + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_y);
        }
        1 => {
          self.x2 = (self.x2 + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_x);
          self.y2 = (self.y2 + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_y);
        }
        2 => {
          self.x3 = (self.x3 + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_x);
          self.y3 = (self.y3 + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_y);
        }
        _ => {
          self.width = (self.width + gaussian(p_rng)).clamp(0.5, 16.0);
        }
      }
      if self.valid() {
        break;
      }
    }
  }

  /// True when the endpoints form the longest leg of the control triangle,
  /// which prevents the stroke from folding back over itself.
  fn valid(&self) -> bool {
    let dx12 = (self.x1 - self.x2) as i64;
    let dy12 = (self.y1 - self.y2) as i64;
    let dx23 = (self.x2 - self.x3) as i64;
    let dy23 = (self.y2 - self.y3) as i64;
    let dx13 = (self.x1 - self.x3) as i64;
    let dy13 = (self.y1 - self.y3) as i64;
    let d12 = dx12 * dx12 + dy12 * dy12;
    let d23 = dx23 * dx23 + dy23 * dy23;
    let d13 = dx13 * dx13 + dy13 * dy13;
    d13 > d12 && d13 > d23
  }

  /// Rasterizes the stroke: flatten the curve, expand it to a round-capped
  /// outline, and fill the outline.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    p_ctx.begin();
    let mut path = Path::new();
    path.move_to((self.x1, self.y1)).quad_to((self.x2, self.y2), (self.x3, self.y3));
    let outline = stroke_round(path.points(), self.width);
    p_ctx.fill_loop(&outline);
    p_ctx.spans()
  }

  /// Emits the stroke as an SVG path element. The generic fill attributes
  /// are rewritten to stroke attributes with a plain substring replace.
  pub fn svg(&self, p_attrs: &str) -> String {
    let attrs = p_attrs.replace("fill", "stroke");
    format!(
      "<path {} fill=\"none\" d=\"M {} {} Q {} {}, {} {}\" stroke-width=\"{}\" />",
      attrs, self.x1, self.y1, self.x2, self.y2, self.x3, self.y3, self.width
    )
  }

  /// Returns the stroke mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> Quadratic {
    Quadratic {
      x1: (self.x1 + 0.5) * p_scale,
      y1: (self.y1 + 0.5) * p_scale,
      x2: (self.x2 + 0.5) * p_scale,
      y2: (self.y2 + 0.5) * p_scale,
      x3: (self.x3 + 0.5) * p_scale,
      y3: (self.y3 + 0.5) * p_scale,
      width: self.width * p_scale,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  #[test]
  fn folded_curve_is_invalid() {
    // The control point is farther from both endpoints than they are from
    // each other.
    let q = Quadratic {
      x1: 0.0,
      y1: 0.0,
      x2: 50.0,
      y2: 0.0,
      x3: 5.0,
      y3: 0.0,
      width: 2.0,
    };
    assert!(!q.valid());
  }

  #[test]
  fn gentle_curve_is_valid() {
    let q = Quadratic {
      x1: 0.0,
      y1: 0.0,
      x2: 10.0,
      y2: 10.0,
      x3: 20.0,
      y3: 0.0,
      width: 2.0,
    };
    assert!(q.valid());
  }

  #[test]
  fn mutate_preserves_validity_and_width_bounds() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut q = Quadratic::random(100, 100, &mut rng);
    for _ in 0..200 {
      q.mutate(100, 100, &mut rng);
      assert!(q.valid());
      assert!(q.width >= 0.5 && q.width <= 16.0);
    }
  }

  #[test]
  fn rasterized_stroke_tracks_the_width() {
    let q = Quadratic {
      x1: 10.0,
      y1: 30.0,
      x2: 30.0,
      y2: 30.0,
      x3: 50.0,
      y3: 30.0,
      width: 6.0,
    };
    let mut ctx = RasterContext::new(64, 64);
    let spans = q.rasterize(&mut ctx);
    assert!(!spans.is_empty());
    // Rows well inside the stroke get full coverage at the middle.
    let mid = spans.iter().find(|s| s.y == 30 && s.x1 <= 30 && 30 <= s.x2).unwrap();
    assert_eq!(mid.alpha, 0xFFFF);
    let rows: Vec<i32> = spans.iter().map(|s| s.y).collect();
    let min = *rows.iter().min().unwrap();
    let max = *rows.iter().max().unwrap();
    assert!((max - min) >= 5 && (max - min) <= 8, "stroke rows {min}..{max}");
  }

  #[test]
  fn svg_rewrites_fill_attributes_to_stroke() {
    let q = Quadratic {
      x1: 1.0,
      y1: 2.0,
      x2: 3.0,
      y2: 4.0,
      x3: 5.0,
      y3: 6.0,
      width: 2.5,
    };
    let element = q.svg("fill=\"#102030\" fill-opacity=\"0.5\"");
    assert!(element.contains("stroke=\"#102030\""));
    assert!(element.contains("stroke-opacity=\"0.5\""));
    assert!(element.contains("fill=\"none\""));
  }
}
