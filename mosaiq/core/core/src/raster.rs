//! Reusable rasterization state: the span arena that analytic rasterizers
//! push into, plus a generic anti-aliased polygon filler for path-based
//! shapes. One context lives in each worker and is refilled in place for
//! every candidate, which keeps the hot path free of allocations.

use crate::geometry::pointf::PointF;
use crate::span::Span;

/// Vertical supersampling factor of the polygon filler.
const SUBROWS: u32 = 4;
/// Coverage contributed by one fully covered subrow cell.
const SUBROW_UNIT: f64 = (65536 / SUBROWS) as f64;

/// Per-worker rasterization scratch. Owns the span arena and the coverage
/// accumulators used by the polygon filler; buffers grow on demand and are
/// reused across candidates.
pub struct RasterContext {
  width: i32,
  height: i32,
  spans: Vec<Span>,
  cover: Vec<u32>,
  crossings: Vec<(f64, i32)>,
}

impl RasterContext {
  /// Creates a context for a canvas of the given size.
  pub fn new(p_width: i32, p_height: i32) -> RasterContext {
    RasterContext {
      width: p_width,
      height: p_height,
      spans: Vec::with_capacity(4096),
      cover: vec![0; p_width.max(0) as usize],
      crossings: Vec::with_capacity(16),
    }
  }
  /// Returns the canvas width.
  pub fn width(&self) -> i32 {
    self.width
  }
  /// Returns the canvas height.
  pub fn height(&self) -> i32 {
    self.height
  }
  /// Clears the span arena before rasterizing a new shape.
  pub fn begin(&mut self) {
    self.spans.clear();
  }
  /// Returns the spans accumulated since the last `begin`.
  pub fn spans(&self) -> &[Span] {
    &self.spans
  }
  /// Clips a span against the canvas and appends it if anything remains.
  pub fn push(&mut self, p_y: i32, p_x1: i32, p_x2: i32, p_alpha: u16) {
    if self.width < 1 || p_y < 0 || p_y >= self.height {
      return;
    }
    let x1 = p_x1.clamp(0, self.width - 1);
    let x2 = p_x2.clamp(0, self.width - 1);
    if x1 > x2 {
      return;
    }
    self.spans.push(Span::new(p_y, x1, x2, p_alpha));
  }

  /// Fills a closed polygon with the nonzero winding rule and appends the
  /// resulting anti-aliased spans. Coverage is sampled on four sub-scanlines
  /// per row with fractional end cells, then run-length encoded.
  pub fn fill_loop(&mut self, p_points: &[PointF]) {
    if p_points.len() < 3 || self.width < 1 || self.height < 1 {
      return;
    }

    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;
    for p in p_points {
      min_x = min_x.min(p.x);
      max_x = max_x.max(p.x);
      min_y = min_y.min(p.y);
      max_y = max_y.max(p.y);
    }

    let y_lo = (min_y.floor() as i32).max(0);
    let y_hi = (max_y.ceil() as i32).min(self.height - 1);
    let x_lo = (min_x.floor() as i32).max(0);
    let x_hi = (max_x.ceil() as i32).min(self.width - 1);
    if y_lo > y_hi || x_lo > x_hi {
      return;
    }
    let x_lo = x_lo as usize;
    let x_hi = x_hi as usize;

    let n = p_points.len();
    for y in y_lo..=y_hi {
      self.cover[x_lo..=x_hi].fill(0);
      let mut covered = false;

      for sub in 0..SUBROWS {
        let sy = y as f64 + (sub as f64 + 0.5) / SUBROWS as f64;

        // Edge crossings with winding direction.
        self.crossings.clear();
        for i in 0..n {
          let a = p_points[i];
          let b = p_points[(i + 1) % n];
          if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
            let t = (sy - a.y) / (b.y - a.y);
            let dir = if b.y > a.y { 1 } else { -1 };
            self.crossings.push((a.x + t * (b.x - a.x), dir));
          }
        }
        if self.crossings.is_empty() {
          continue;
        }
        self.crossings.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        // Accumulate coverage over nonzero-winding intervals.
        let mut winding = 0;
        let mut interval_start = 0.0;
        for ci in 0..self.crossings.len() {
          let (x, dir) = self.crossings[ci];
          let was = winding;
          winding += dir;
          if was == 0 && winding != 0 {
            interval_start = x;
          } else if was != 0 && winding == 0 {
            covered |= accumulate_interval(&mut self.cover, interval_start, x, self.width);
          }
        }
      }

      if !covered {
        continue;
      }

      // Run-length encode equal coverage into spans.
      let mut x = x_lo;
      while x <= x_hi {
        let alpha = coverage_to_alpha(self.cover[x]);
        if alpha == 0 {
          x += 1;
          continue;
        }
        let mut run_end = x;
        while run_end + 1 <= x_hi && coverage_to_alpha(self.cover[run_end + 1]) == alpha {
          run_end += 1;
        }
        self.spans.push(Span::new(y, x as i32, run_end as i32, alpha));
        x = run_end + 1;
      }
    }
  }
}

/// Adds one subrow interval `[x0, x1)` into the coverage accumulator,
/// distributing fractional coverage to the partially covered end cells.
/// Returns true when any coverage was added.
fn accumulate_interval(p_cover: &mut [u32], p_x0: f64, p_x1: f64, p_width: i32) -> bool {
  let x0 = p_x0.max(0.0);
  let x1 = p_x1.min(p_width as f64);
  if x1 <= x0 {
    return false;
  }
  let first = x0.floor() as usize;
  let last = ((x1 - 1e-9).floor() as usize).min(p_cover.len() - 1);
  for cell in first..=last {
    let l = x0.max(cell as f64);
    let r = x1.min((cell + 1) as f64);
    p_cover[cell] += ((r - l) * SUBROW_UNIT) as u32;
  }
  true
}

/// Maps accumulated coverage (up to 65536) to a span alpha in `[0, 0xFFFF]`.
#[inline]
fn coverage_to_alpha(p_cover: u32) -> u16 {
  ((p_cover.min(65536) as u64 * 0xFFFF) >> 16) as u16
}

#[cfg(test)]
mod tests {
  use super::*;

  fn square(p_x0: f64, p_y0: f64, p_x1: f64, p_y1: f64) -> Vec<PointF> {
    vec![
      PointF::new(p_x0, p_y0),
      PointF::new(p_x1, p_y0),
      PointF::new(p_x1, p_y1),
      PointF::new(p_x0, p_y1),
    ]
  }

  #[test]
  fn pixel_aligned_square_is_fully_covered() {
    let mut ctx = RasterContext::new(20, 20);
    ctx.begin();
    ctx.fill_loop(&square(5.0, 5.0, 15.0, 15.0));
    let spans = ctx.spans();
    assert_eq!(spans.len(), 10, "one span per covered row");
    for s in spans {
      assert_eq!((s.x1, s.x2), (5, 14));
      assert_eq!(s.alpha, 0xFFFF);
    }
  }

  #[test]
  fn half_covered_column_gets_half_alpha() {
    let mut ctx = RasterContext::new(20, 20);
    ctx.begin();
    ctx.fill_loop(&square(5.5, 5.0, 10.0, 6.0));
    // Row 5 should start with a half-covered cell at x=5.
    let edge = ctx.spans().iter().find(|s| s.x1 == 5 && s.x2 == 5).expect("edge span");
    let alpha = edge.alpha as f64 / 0xFFFF as f64;
    assert!((alpha - 0.5).abs() < 0.02, "edge alpha {alpha}");
  }

  #[test]
  fn spans_are_clipped_to_canvas() {
    let mut ctx = RasterContext::new(10, 10);
    ctx.begin();
    ctx.fill_loop(&square(-5.0, -5.0, 15.0, 15.0));
    assert!(!ctx.spans().is_empty());
    for s in ctx.spans() {
      assert!(s.y >= 0 && s.y < 10);
      assert!(s.x1 >= 0 && s.x1 <= s.x2 && s.x2 < 10);
    }
  }

  #[test]
  fn push_drops_offscreen_rows_and_clamps_x() {
    let mut ctx = RasterContext::new(10, 10);
    ctx.begin();
    ctx.push(-1, 0, 5, 0xFFFF);
    ctx.push(12, 0, 5, 0xFFFF);
    ctx.push(3, -4, 20, 0xFFFF);
    ctx.push(4, 8, 2, 0xFFFF);
    assert_eq!(ctx.spans(), &[Span::new(3, 0, 9, 0xFFFF)]);
  }

  #[test]
  fn winding_fills_self_overlapping_loop_once() {
    // A bow-tie style loop where the overlap region keeps nonzero winding.
    let mut ctx = RasterContext::new(30, 30);
    ctx.begin();
    let mut loop_pts = square(5.0, 5.0, 25.0, 25.0);
    loop_pts.extend(square(10.0, 10.0, 20.0, 20.0));
    ctx.fill_loop(&loop_pts);
    assert!(!ctx.spans().is_empty());
    // The doubly wound interior must still blend at full coverage, not double.
    let mid = ctx
      .spans()
      .iter()
      .find(|s| s.y == 15 && s.x1 <= 15 && 15 <= s.x2)
      .expect("interior span");
    assert_eq!(mid.alpha, 0xFFFF);
  }
}
