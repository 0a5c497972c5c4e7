//! Small numeric helpers shared by the geometry and shape code.

use rand::Rng;

/// Converts degrees to radians.
#[inline]
pub fn radians(p_degrees: f64) -> f64 {
  p_degrees * std::f64::consts::PI / 180.0
}

/// Converts radians to degrees.
#[inline]
pub fn degrees(p_radians: f64) -> f64 {
  p_radians * 180.0 / std::f64::consts::PI
}

/// Rotates `(x, y)` by `theta` radians about the origin.
#[inline]
pub fn rotate(p_x: f64, p_y: f64, p_theta: f64) -> (f64, f64) {
  let (sin, cos) = p_theta.sin_cos();
  (p_x * cos - p_y * sin, p_x * sin + p_y * cos)
}

/// Draws one sample from the standard normal distribution via Box-Muller.
pub fn gaussian<R: Rng>(p_rng: &mut R) -> f64 {
  let u1 = p_rng.random::<f64>().max(1e-12);
  let u2 = p_rng.random::<f64>();
  (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  #[test]
  fn radians_degrees_round_trip() {
    assert!((degrees(radians(123.0)) - 123.0).abs() < 1e-12);
  }

  #[test]
  fn rotate_quarter_turn() {
    let (x, y) = rotate(1.0, 0.0, radians(90.0));
    assert!(x.abs() < 1e-12);
    assert!((y - 1.0).abs() < 1e-12);
  }

  #[test]
  fn gaussian_is_roughly_centered() {
    let mut rng = StdRng::seed_from_u64(11);
    let mean: f64 = (0..4000).map(|_| gaussian(&mut rng)).sum::<f64>() / 4000.0;
    assert!(mean.abs() < 0.1, "mean {mean} too far from zero");
  }
}
