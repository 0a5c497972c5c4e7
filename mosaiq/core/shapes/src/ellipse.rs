use mosaiq_core::{RasterContext, Span};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// An axis-aligned filled ellipse with an integer center and radii.
/// With the `circle` flag set the radii are kept equal under mutation.
pub struct Ellipse {
  pub x: i32,
  pub y: i32,
  pub rx: i32,
  pub ry: i32,
  pub circle: bool,
}

impl Ellipse {
  /// Creates a random ellipse with radii up to 32 pixels.
  pub fn random<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> Ellipse {
    Ellipse {
      x: p_rng.random_range(0..p_width),
      y: p_rng.random_range(0..p_height),
      rx: p_rng.random_range(0..32) + 1,
      ry: p_rng.random_range(0..32) + 1,
      circle: false,
    }
  }

  /// Creates a random circle with a radius up to 32 pixels.
  pub fn random_circle<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> Ellipse {
    let r = p_rng.random_range(0..32) + 1;
    Ellipse {
      x: p_rng.random_range(0..p_width),
      y: p_rng.random_range(0..p_height),
      rx: r,
      ry: r,
      circle: true,
    }
  }

  /// Perturbs the center or one radius by a uniform offset.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    match p_rng.random_range(0..3) {
      0 => {
        self.x = (self.x + p_rng.random_range(-10..=10)).clamp(0, p_width - 1);
        self.y = (self.y + p_rng.random_range(-10..=10)).clamp(0, p_height - 1);
      }
      1 => {
        self.rx = (self.rx + p_rng.random_range(-10..=10)).clamp(1, p_width - 1);
        if self.circle {
          self.ry = self.rx;
        }
      }
      _ => {
        self.ry = (self.ry + p_rng.random_range(-10..=10)).clamp(1, p_height - 1);
        if self.circle {
          self.rx = self.ry;
        }
      }
    }
  }

  /// Rasterizes the ellipse analytically: for each vertical offset `dy` the
  /// half-width is `sqrt(ry^2 - dy^2) * rx / ry`, emitted for both mirrored
  /// rows.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    p_ctx.begin();
    let aspect = self.rx as f64 / self.ry as f64;
    for dy in 0..self.ry {
      let y1 = self.y - dy;
      let y2 = self.y + dy;
      let s = (((self.ry * self.ry - dy * dy) as f64).sqrt() * aspect) as i32;
      p_ctx.push(y1, self.x - s, self.x + s, 0xFFFF);
      if dy > 0 {
        p_ctx.push(y2, self.x - s, self.x + s, 0xFFFF);
      }
    }
    p_ctx.spans()
  }

  /// Emits the ellipse as an SVG ellipse element.
  pub fn svg(&self, p_attrs: &str) -> String {
    format!(
      "<ellipse {} cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" />",
      p_attrs, self.x, self.y, self.rx, self.ry
    )
  }

  /// Returns the ellipse mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> Ellipse {
    Ellipse {
      x: ((self.x as f64 + 0.5) * p_scale).round() as i32,
      y: ((self.y as f64 + 0.5) * p_scale).round() as i32,
      rx: ((self.rx as f64 * p_scale).round() as i32).max(1),
      ry: ((self.ry as f64 * p_scale).round() as i32).max(1),
      circle: self.circle,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  #[test]
  fn rasterize_is_vertically_symmetric() {
    let e = Ellipse {
      x: 32,
      y: 32,
      rx: 10,
      ry: 6,
      circle: false,
    };
    let mut ctx = RasterContext::new(64, 64);
    let spans = e.rasterize(&mut ctx);
    for s in spans {
      let dy = s.y - 32;
      let mirrored = spans.iter().find(|m| m.y - 32 == -dy).expect("mirror row");
      assert_eq!((mirrored.x1, mirrored.x2), (s.x1, s.x2));
    }
  }

  #[test]
  fn widest_row_is_the_center() {
    let e = Ellipse {
      x: 32,
      y: 32,
      rx: 10,
      ry: 6,
      circle: false,
    };
    let mut ctx = RasterContext::new(64, 64);
    let spans = e.rasterize(&mut ctx);
    let center = spans.iter().find(|s| s.y == 32).unwrap();
    assert_eq!((center.x1, center.x2), (22, 42));
  }

  #[test]
  fn circle_mutation_keeps_radii_equal() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut c = Ellipse::random_circle(64, 64, &mut rng);
    for _ in 0..100 {
      c.mutate(64, 64, &mut rng);
      assert_eq!(c.rx, c.ry);
    }
  }

  #[test]
  fn offscreen_rows_are_dropped() {
    let e = Ellipse {
      x: 2,
      y: 0,
      rx: 8,
      ry: 8,
      circle: true,
    };
    let mut ctx = RasterContext::new(16, 16);
    for s in e.rasterize(&mut ctx) {
      assert!(s.y >= 0 && s.y < 16);
      assert!(s.x1 >= 0 && s.x2 < 16);
    }
  }
}
