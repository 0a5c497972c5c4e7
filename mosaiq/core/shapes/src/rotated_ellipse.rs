use mosaiq_core::math::{gaussian, radians, rotate};
use mosaiq_core::{Path, PointF, RasterContext, Span};
use rand::Rng;

/// Number of quadratic arcs approximating the ellipse boundary.
const ARC_COUNT: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
/// A filled ellipse with float center and radii, rotated by `angle` degrees.
pub struct RotatedEllipse {
  pub x: f64,
  pub y: f64,
  pub rx: f64,
  pub ry: f64,
  pub angle: f64,
}

impl RotatedEllipse {
  /// Creates a random rotated ellipse with radii up to 32 pixels.
  pub fn random<R: Rng>(p_width: i32, p_height: i32, p_rng: &mut R) -> RotatedEllipse {
    RotatedEllipse {
      x: p_rng.random::<f64>() * p_width as f64,
      y: p_rng.random::<f64>() * p_height as f64,
      rx: p_rng.random::<f64>() * 32.0 + 1.0,
      ry: p_rng.random::<f64>() * 32.0 + 1.0,
      angle: p_rng.random::<f64>() * 360.0,
    }
  }

  /// Perturbs the center, the radii, or the angle with Gaussian offsets.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    match p_rng.random_range(0..3) {
      0 => {
        self.x = (self.x + gaussian(p_rng) * 16.0).clamp(0.0, (p_width - 1) as f64);
        self.y = (self.y + gaussian(p_rng) * 16.0).clamp(0.0, (p_height - 1) as f64);
      }
      1 => {
        self.rx = (self.rx + gaussian(p_rng) * 16.0).clamp(1.0, (p_width - 1) as f64);
        self.ry = (self.ry + gaussian(p_rng) * 16.0).clamp(1.0, (p_height - 1) as f64);
      }
      _ => {
        self.angle += gaussian(p_rng) * 32.0;
      }
    }
  }

  /// Point on the rotated boundary at parametric angle `p_t`.
  fn point(&self, p_t: f64) -> PointF {
    let (dx, dy) = rotate(self.rx * p_t.cos(), self.ry * p_t.sin(), radians(self.angle));
    PointF::new(self.x + dx, self.y + dy)
  }

  /// Rasterizes the ellipse by approximating the boundary with quadratic
  /// arcs and handing the loop to the generic path filler.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    p_ctx.begin();
    let tau = 2.0 * std::f64::consts::PI;
    let mut path = Path::new();
    path.move_to(self.point(0.0));
    for i in 0..ARC_COUNT {
      let p0 = self.point(i as f64 / ARC_COUNT as f64 * tau);
      let mid = self.point((i as f64 + 0.5) / ARC_COUNT as f64 * tau);
      let p2 = self.point((i + 1) as f64 / ARC_COUNT as f64 * tau);
      // Control point that makes the quadratic pass through the arc midpoint.
      let ctrl = mid * 2.0 - (p0 + p2) * 0.5;
      path.quad_to(ctrl, p2);
    }
    p_ctx.fill_loop(path.points());
    p_ctx.spans()
  }

  /// Emits the ellipse as a unit ellipse inside a transform group.
  pub fn svg(&self, p_attrs: &str) -> String {
    format!(
      "<g transform=\"translate({} {}) rotate({}) scale({} {})\"><ellipse {} cx=\"0\" cy=\"0\" rx=\"1\" ry=\"1\" /></g>",
      self.x, self.y, self.angle, self.rx, self.ry, p_attrs
    )
  }

  /// Returns the ellipse mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> RotatedEllipse {
    RotatedEllipse {
      x: (self.x + 0.5) * p_scale,
      y: (self.y + 0.5) * p_scale,
      rx: self.rx * p_scale,
      ry: self.ry * p_scale,
      angle: self.angle,
    }
  }
}
