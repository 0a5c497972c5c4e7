use super::pointf::PointF;

/// Maximum recursion depth for curve subdivision.
const MAX_DEPTH: u32 = 16;
/// Largest allowed deviation of a flattened curve from the true curve.
const TOLERANCE: f64 = 0.25;

#[derive(Clone, Debug, Default)]
/// A path built from lines and quadratic Bezier segments.
/// Curves are flattened to a polyline as they are added, so the stored
/// representation is always a point sequence ready for filling or stroking.
pub struct Path {
  points: Vec<PointF>,
}

impl Path {
  /// Creates a new empty path.
  pub fn new() -> Path {
    Path { points: Vec::new() }
  }
  /// Sets the starting point of the path, discarding any previous points.
  /// - `p_start`: The starting point.
  pub fn move_to(&mut self, p_start: impl Into<PointF>) -> &mut Self {
    self.points.clear();
    self.points.push(p_start.into());
    self
  }
  /// Adds a line to the next point of the path.
  /// - `p_to`: The next point to add to the path.
  pub fn line_to(&mut self, p_to: impl Into<PointF>) -> &mut Self {
    self.points.push(p_to.into());
    self
  }
  /// Adds a quadratic Bezier segment to the path.
  /// - `p_ctrl`: The control point for the curve.
  /// - `p_to`: The end point of the curve.
  pub fn quad_to(&mut self, p_ctrl: impl Into<PointF>, p_to: impl Into<PointF>) -> &mut Self {
    let ctrl = p_ctrl.into();
    let to = p_to.into();
    let from = *self.points.last().expect("quad_to requires a current point");
    flatten_quad(from, ctrl, to, TOLERANCE, MAX_DEPTH, &mut self.points);
    self
  }
  /// Gets the flattened points of the path.
  pub fn points(&self) -> &[PointF] {
    &self.points
  }
}

/// Recursively subdivides a quadratic Bezier until it is flat enough, pushing
/// the resulting polyline points (excluding `p_from`) onto `p_out`.
fn flatten_quad(p_from: PointF, p_ctrl: PointF, p_to: PointF, p_tolerance: f64, p_depth: u32, p_out: &mut Vec<PointF>) {
  // Deviation of the control point from the chord midpoint bounds the error.
  let deviation = (p_ctrl - (p_from + p_to) * 0.5).length();
  if p_depth == 0 || deviation <= p_tolerance {
    p_out.push(p_to);
    return;
  }
  let q0 = (p_from + p_ctrl) * 0.5;
  let q1 = (p_ctrl + p_to) * 0.5;
  let mid = (q0 + q1) * 0.5;
  flatten_quad(p_from, q0, mid, p_tolerance, p_depth - 1, p_out);
  flatten_quad(mid, q1, p_to, p_tolerance, p_depth - 1, p_out);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quad_to_keeps_endpoints() {
    let mut path = Path::new();
    path.move_to((0.0, 0.0)).quad_to((5.0, 10.0), (10.0, 0.0));
    let pts = path.points();
    assert_eq!(pts[0], PointF::new(0.0, 0.0));
    assert_eq!(*pts.last().unwrap(), PointF::new(10.0, 0.0));
    assert!(pts.len() > 2, "curve should be subdivided");
  }

  #[test]
  fn flat_curve_is_not_subdivided() {
    let mut path = Path::new();
    path.move_to((0.0, 0.0)).quad_to((5.0, 0.0), (10.0, 0.0));
    assert_eq!(path.points().len(), 2);
  }

  #[test]
  fn subdivision_stays_near_curve() {
    let mut path = Path::new();
    path.move_to((0.0, 0.0)).quad_to((50.0, 100.0), (100.0, 0.0));
    // All polyline points must lie close to the analytic curve.
    for p in path.points() {
      // Invert x(t) for this symmetric curve: x = 100t.
      let t = p.x / 100.0;
      let y = 2.0 * (1.0 - t) * t * 100.0;
      assert!((p.y - y).abs() < 1.5, "point {p} deviates from curve");
    }
  }
}
