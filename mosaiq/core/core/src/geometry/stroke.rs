//! Stroke expansion: converts an open polyline into a closed outline polygon
//! with round joins and round caps, ready for the scanline filler.

use super::pointf::PointF;

/// Number of segments used to approximate each join or cap arc.
const ARC_STEPS: usize = 12;

/// Expands an open polyline into a closed stroke outline of the given width.
/// Joins and caps are round. Returns an empty outline for degenerate input.
/// - `p_points`: The flattened centerline, at least two points.
/// - `p_width`: The stroke width.
pub fn stroke_round(p_points: &[PointF], p_width: f64) -> Vec<PointF> {
  let half_width = (p_width / 2.0).max(1e-3);
  if p_points.len() < 2 {
    return Vec::new();
  }

  // Per-segment unit normals.
  let seg_count = p_points.len() - 1;
  let mut normals: Vec<PointF> = Vec::with_capacity(seg_count);
  for i in 0..seg_count {
    let dir = p_points[i + 1] - p_points[i];
    normals.push(dir.perpendicular().normalized());
  }

  // Per-vertex offsets for the initial left/right sequences.
  let mut left_points: Vec<PointF> = Vec::with_capacity(p_points.len());
  let mut right_points: Vec<PointF> = Vec::with_capacity(p_points.len());
  for (i, p) in p_points.iter().enumerate() {
    let n = if i < seg_count { normals[i] } else { normals[i - 1] };
    left_points.push(*p + n * half_width);
    right_points.push(*p - n * half_width);
  }

  let start_dir = (p_points[1] - p_points[0]).normalized();
  let end_dir = (p_points[p_points.len() - 1] - p_points[p_points.len() - 2]).normalized();

  let mut outline: Vec<PointF> = Vec::new();

  // Left edge forward, inserting arcs at corners where this side is outside.
  outline.push(left_points[0]);
  for i in 1..left_points.len() {
    if i < p_points.len() - 1 {
      let prev_n = normals[i - 1];
      let next_n = normals[i];
      let center = p_points[i];
      let turn = (p_points[i] - p_points[i - 1]).cross(p_points[i + 1] - p_points[i]);
      if turn > 0.0 {
        // Inner side of the corner, no outward arc.
        outline.push(left_points[i]);
        continue;
      }
      let from = center + prev_n * half_width;
      let to = center + next_n * half_width;
      push_arc(&mut outline, center, from, to, half_width, prev_n + next_n);
      continue;
    }
    outline.push(left_points[i]);
  }

  // End cap.
  {
    let end = p_points[p_points.len() - 1];
    let from = *left_points.last().unwrap();
    let to = *right_points.last().unwrap();
    push_arc(&mut outline, end, from, to, half_width, end_dir);
  }

  // Right edge backward.
  for i in (0..right_points.len() - 1).rev() {
    if i > 0 {
      let prev_n = normals[i - 1];
      let next_n = normals[i];
      let center = p_points[i];
      let turn = (p_points[i] - p_points[i - 1]).cross(p_points[i + 1] - p_points[i]);
      if turn < 0.0 {
        outline.push(right_points[i]);
        continue;
      }
      // Arc from the next segment's offset back to the previous segment's.
      let from = center - next_n * half_width;
      let to = center - prev_n * half_width;
      push_arc(&mut outline, center, from, to, half_width, (prev_n + next_n) * -1.0);
      continue;
    }
    outline.push(right_points[i]);
  }

  // Start cap, closing back to the first left offset.
  {
    let start = p_points[0];
    let from = right_points[0];
    let to = left_points[0];
    push_arc(&mut outline, start, from, to, half_width, start_dir * -1.0);
  }

  outline
}

/// Appends the arc from `p_from` to `p_to` around `p_center`. Of the two
/// candidate sweeps, the one whose midpoint faces `p_outward` is taken, so
/// half-turn cap arcs bulge away from the stroked line.
fn push_arc(p_out: &mut Vec<PointF>, p_center: PointF, p_from: PointF, p_to: PointF, p_radius: f64, p_outward: PointF) {
  use std::f64::consts::PI;
  let start = (p_from.y - p_center.y).atan2(p_from.x - p_center.x);
  let end = (p_to.y - p_center.y).atan2(p_to.x - p_center.x);
  let mut sweep = end - start;
  while sweep <= -PI {
    sweep += 2.0 * PI;
  }
  while sweep > PI {
    sweep -= 2.0 * PI;
  }
  if sweep.abs() < 1e-9 {
    sweep = PI;
  }
  let mid = start + sweep / 2.0;
  let outward = p_outward.y.atan2(p_outward.x);
  let mut facing = mid - outward;
  while facing <= -PI {
    facing += 2.0 * PI;
  }
  while facing > PI {
    facing -= 2.0 * PI;
  }
  if facing.abs() > PI / 2.0 {
    // The midpoint faces the wrong way; take the complementary sweep.
    sweep += if sweep > 0.0 { -2.0 * PI } else { 2.0 * PI };
  }
  let step = sweep / ARC_STEPS as f64;
  for i in 0..=ARC_STEPS {
    let a = start + step * i as f64;
    p_out.push(PointF::new(p_center.x + a.cos() * p_radius, p_center.y + a.sin() * p_radius));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn straight_segment_outline_spans_width() {
    let line = [PointF::new(10.0, 10.0), PointF::new(30.0, 10.0)];
    let outline = stroke_round(&line, 4.0);
    assert!(!outline.is_empty());
    let min_y = outline.iter().map(|p| p.y).fold(f64::MAX, f64::min);
    let max_y = outline.iter().map(|p| p.y).fold(f64::MIN, f64::max);
    assert!((max_y - min_y - 4.0).abs() < 1e-6, "outline height {}", max_y - min_y);
  }

  #[test]
  fn round_caps_extend_past_endpoints() {
    let line = [PointF::new(10.0, 10.0), PointF::new(30.0, 10.0)];
    let outline = stroke_round(&line, 4.0);
    let min_x = outline.iter().map(|p| p.x).fold(f64::MAX, f64::min);
    let max_x = outline.iter().map(|p| p.x).fold(f64::MIN, f64::max);
    assert!(min_x < 10.0 - 1.5);
    assert!(max_x > 30.0 + 1.5);
  }

  #[test]
  fn outline_stays_within_half_width_of_centerline() {
    let line = [PointF::new(0.0, 0.0), PointF::new(20.0, 0.0), PointF::new(20.0, 20.0)];
    let outline = stroke_round(&line, 6.0);
    for p in &outline {
      let d = segment_distance(*p, line[0], line[1]).min(segment_distance(*p, line[1], line[2]));
      assert!(d < 3.0 + 1e-6, "outline point {p} is {d} away from the centerline");
    }
  }

  #[test]
  fn degenerate_input_yields_empty_outline() {
    assert!(stroke_round(&[PointF::new(1.0, 1.0)], 4.0).is_empty());
  }

  fn segment_distance(p: PointF, a: PointF, b: PointF) -> f64 {
    let ab = b - a;
    let t = ((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / (ab.x * ab.x + ab.y * ab.y);
    let t = t.clamp(0.0, 1.0);
    p.distance_to(a + ab * t)
  }
}
