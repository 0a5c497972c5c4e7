use mosaiq_core::math::gaussian;
use mosaiq_core::{Path, RasterContext, Span};
use rand::Rng;

/// Off-canvas margin allowed for polygon vertices.
const MARGIN: f64 = 16.0;

#[derive(Clone, Debug, PartialEq)]
/// A filled polygon with a fixed vertex count. With the `convex` flag set,
/// mutations are rejected until the vertex loop is convex again.
pub struct Polygon {
  pub order: usize,
  pub convex: bool,
  pub x: Vec<f64>,
  pub y: Vec<f64>,
}

impl Polygon {
  /// Creates a random convex quadrilateral, the variant used by the engine
  /// dispatch table.
  pub fn random<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> Polygon {
    Polygon::random_with_order(4, true, p_width, p_height, p_rng)
  }

  /// Creates a random polygon of the given order: a uniform anchor vertex
  /// with the rest nearby, mutated until valid.
  pub fn random_with_order<R: Rng>(
    p_order: usize, p_convex: bool, p_width: i32, p_height: i32, p_rng: &mut R,
  ) -> Polygon {
    let mut x = vec![0.0; p_order];
    let mut y = vec![0.0; p_order];
    x[0] = p_rng.random::<f64>() * p_width as f64;
    y[0] = p_rng.random::<f64>() * p_height as f64;
    for i in 1..p_order {
      x[i] = x[0] + p_rng.random::<f64>() * 40.0 - 20.0;
      y[i] = y[0] + p_rng.random::<f64>() * 40.0 - 20.0;
    }
    let mut p = Polygon {
      order: p_order,
      convex: p_convex,
      x,
      y,
    };
    p.mutate(p_width, p_height, p_rng);
    p
  }

  /// Either swaps two vertices or perturbs one with a Gaussian offset,
  /// retrying until the convexity constraint holds.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    let hi_x = (p_width - 1) as f64 + MARGIN;
    let hi_y = (p_height - 1) as f64 + MARGIN;
    loop {
      if p_rng.random_bool(0.25) {
        let i = p_rng.random_range(0..self.order);
        let j = p_rng.random_range(0..self.order);
        self.x.swap(i, j);
        self.y.swap(i, j);
      } else {
        let i = p_rng.random_range(0..self.order);
        self.x[i] = (self.x[i] + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_x);
        self.y[i] = (self.y[i] + gaussian(p_rng) * 16.0).clamp(-MARGIN, hi_y);
      }
      if self.valid() {
        break;
      }
    }
  }

  /// For convex polygons: all consecutive edge cross products share a sign.
  fn valid(&self) -> bool {
    if !self.convex {
      return true;
    }
    let mut sign = false;
    for a in 0..self.order {
      let i = a % self.order;
      let j = (a + 1) % self.order;
      let k = (a + 2) % self.order;
      let c = cross3(
        self.x[i], self.y[i], self.x[j], self.y[j], self.x[k], self.y[k],
      );
      if a == 0 {
        sign = c > 0.0;
      } else if (c > 0.0) != sign {
        return false;
      }
    }
    true
  }

  /// Rasterizes the polygon by filling its closed vertex loop.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    p_ctx.begin();
    let mut path = Path::new();
    path.move_to((self.x[0], self.y[0]));
    for i in 1..self.order {
      path.line_to((self.x[i], self.y[i]));
    }
    p_ctx.fill_loop(path.points());
    p_ctx.spans()
  }

  /// Emits the polygon as an SVG polygon element.
  pub fn svg(&self, p_attrs: &str) -> String {
    let points: Vec<String> = (0..self.order).map(|i| format!("{},{}", self.x[i], self.y[i])).collect();
    format!("<polygon {} points=\"{}\" />", p_attrs, points.join(" "))
  }

  /// Returns the polygon mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> Polygon {
    Polygon {
      order: self.order,
      convex: self.convex,
      x: self.x.iter().map(|v| (v + 0.5) * p_scale).collect(),
      y: self.y.iter().map(|v| (v + 0.5) * p_scale).collect(),
    }
  }
}

/// Cross product of the edges `(p1, p2)` and `(p2, p3)`.
fn cross3(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> f64 {
  let dx1 = x2 - x1;
  let dy1 = y2 - y1;
  let dx2 = x3 - x2;
  let dy2 = y3 - y2;
  dx1 * dy2 - dy1 * dx2
}
