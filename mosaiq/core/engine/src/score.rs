//! Scoring kernels: full and partial RMSE between rasters, and the
//! closed-form optimal flat color for a set of coverage spans.
//!
//! Scores are normalized root-mean-square errors over the three color
//! channels, in `[0, 1]`. The partial kernel recovers the squared-error
//! total from the previous score and adjusts only the covered pixels, which
//! is what makes candidate evaluation cheap.

use mosaiq_core::Span;
use primitives::{Color, Image};

/// Full RMSE between two same-sized rasters, alpha excluded.
pub fn difference_full(p_a: &Image, p_b: &Image) -> f64 {
  let (w, h) = p_a.dimensions();
  let pa = p_a.rgba();
  let pb = p_b.rgba();
  let mut total: u64 = 0;
  for (a, b) in pa.chunks_exact(4).zip(pb.chunks_exact(4)) {
    let dr = a[0] as i64 - b[0] as i64;
    let dg = a[1] as i64 - b[1] as i64;
    let db = a[2] as i64 - b[2] as i64;
    total += (dr * dr + dg * dg + db * db) as u64;
  }
  let denom = (w as u64 * h as u64 * 3) as f64;
  (total as f64 / denom).sqrt() / 255.0
}

/// RMSE of `p_after` against the target, given the score of `p_before` and
/// the spans over which the two rasters differ. O(covered pixels).
pub fn difference_partial(p_target: &Image, p_before: &Image, p_after: &Image, p_score: f64, p_spans: &[Span]) -> f64 {
  let (w, h) = p_target.dimensions();
  let denom = (w as u64 * h as u64 * 3) as f64;
  let mut total = ((p_score * 255.0).powi(2) * denom) as i64;
  let t = p_target.rgba();
  let b = p_before.rgba();
  let a = p_after.rgba();
  for span in p_spans {
    let mut i = p_target.pix_offset(span.x1, span.y);
    for _ in span.x1..=span.x2 {
      let tr = t[i] as i64;
      let tg = t[i + 1] as i64;
      let tb = t[i + 2] as i64;
      let br = b[i] as i64;
      let bg = b[i + 1] as i64;
      let bb = b[i + 2] as i64;
      let ar = a[i] as i64;
      let ag = a[i + 1] as i64;
      let ab = a[i + 2] as i64;
      i += 4;
      let (dr1, dg1, db1) = (tr - br, tg - bg, tb - bb);
      let (dr2, dg2, db2) = (tr - ar, tg - ag, tb - ab);
      total -= dr1 * dr1 + dg1 * dg1 + db1 * db1;
      total += dr2 * dr2 + dg2 * dg2 + db2 * db2;
    }
  }
  (total.max(0) as f64 / denom).sqrt() / 255.0
}

/// The flat color minimizing post-blend squared error over the covered
/// pixels, for source-over blending at the given alpha. Fixed-point integer
/// arithmetic, matching the compositor byte-for-byte. Returns opaque black
/// when nothing is covered.
pub fn compute_color(p_target: &Image, p_current: &Image, p_spans: &[Span], p_alpha: u8) -> Color {
  let mut rsum: i64 = 0;
  let mut gsum: i64 = 0;
  let mut bsum: i64 = 0;
  let mut count: i64 = 0;
  let a = 0x101 * 255 / p_alpha.max(1) as i64;
  let t = p_target.rgba();
  let c = p_current.rgba();
  for span in p_spans {
    let mut i = p_target.pix_offset(span.x1, span.y);
    for _ in span.x1..=span.x2 {
      let tr = t[i] as i64;
      let tg = t[i + 1] as i64;
      let tb = t[i + 2] as i64;
      let cr = c[i] as i64;
      let cg = c[i + 1] as i64;
      let cb = c[i + 2] as i64;
      i += 4;
      rsum += (tr - cr) * a + cr * 0x101;
      gsum += (tg - cg) * a + cg * 0x101;
      bsum += (tb - cb) * a + cb * 0x101;
      count += 1;
    }
  }
  if count == 0 {
    return Color::black();
  }
  let r = ((rsum / count) >> 8).clamp(0, 255) as u8;
  let g = ((gsum / count) >> 8).clamp(0, 255) as u8;
  let b = ((bsum / count) >> 8).clamp(0, 255) as u8;
  Color::from_rgba(r, g, b, p_alpha)
}
