//! Span compositing: source-over blending of a flat color along coverage
//! spans, and span-limited raster copies. All arithmetic is 16-bit fixed
//! point (`0x101` widening, `/0xFFFF >> 8` narrowing) so composites are
//! byte-identical across platforms.

use mosaiq_core::Span;
use primitives::{Color, Image};

/// Blends a flat color over the raster along the given spans, weighting the
/// source by each span's coverage.
pub fn draw_spans(p_image: &mut Image, p_color: &Color, p_spans: &[Span]) {
  const M: u32 = 0xFFFF;
  let (sr, sg, sb, sa) = p_color.premultiplied16();
  for span in p_spans {
    let ma = span.alpha as u32;
    let a = (M - sa * ma / M) * 0x101;
    let mut i = p_image.pix_offset(span.x1, span.y);
    let pixels = p_image.rgba_mut();
    for _ in span.x1..=span.x2 {
      let dr = pixels[i] as u32;
      let dg = pixels[i + 1] as u32;
      let db = pixels[i + 2] as u32;
      let da = pixels[i + 3] as u32;
      pixels[i] = ((dr * a + sr * ma) / M >> 8) as u8;
      pixels[i + 1] = ((dg * a + sg * ma) / M >> 8) as u8;
      pixels[i + 2] = ((db * a + sb * ma) / M >> 8) as u8;
      pixels[i + 3] = ((da * a + sa * ma) / M >> 8) as u8;
      i += 4;
    }
  }
}

/// Copies the pixels under the given spans from `p_src` into `p_dst`.
/// Everything outside the spans is left untouched.
pub fn copy_spans(p_dst: &mut Image, p_src: &Image, p_spans: &[Span]) {
  for span in p_spans {
    let a = p_src.pix_offset(span.x1, span.y);
    let b = a + span.len() as usize * 4;
    p_dst.rgba_mut()[a..b].copy_from_slice(&p_src.rgba()[a..b]);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn opaque_full_coverage_replaces_pixels() {
    let mut img = Image::uniform(4, 1, Color::from_rgb(10, 20, 30));
    let spans = [Span::new(0, 1, 2, 0xFFFF)];
    draw_spans(&mut img, &Color::from_rgb(200, 150, 100), &spans);
    assert_eq!(img.pixel(0, 0), Color::from_rgb(10, 20, 30));
    assert_eq!(img.pixel(1, 0), Color::from_rgb(200, 150, 100));
    assert_eq!(img.pixel(2, 0), Color::from_rgb(200, 150, 100));
    assert_eq!(img.pixel(3, 0), Color::from_rgb(10, 20, 30));
  }

  #[test]
  fn half_alpha_blend_lands_between_source_and_destination() {
    let mut img = Image::uniform(1, 1, Color::from_rgb(0, 0, 0));
    draw_spans(&mut img, &Color::from_rgba(255, 255, 255, 128), &[Span::new(0, 0, 0, 0xFFFF)]);
    let px = img.pixel(0, 0);
    assert!((px.r as i32 - 128).abs() <= 1, "r {}", px.r);
    assert_eq!(px.r, px.g);
    assert_eq!(px.g, px.b);
  }

  #[test]
  fn span_coverage_scales_the_contribution() {
    let mut full = Image::uniform(1, 1, Color::from_rgb(0, 0, 0));
    let mut half = full.clone();
    let color = Color::from_rgba(255, 0, 0, 255);
    draw_spans(&mut full, &color, &[Span::new(0, 0, 0, 0xFFFF)]);
    draw_spans(&mut half, &color, &[Span::new(0, 0, 0, 0x8000)]);
    assert_eq!(full.pixel(0, 0).r, 255);
    assert!((half.pixel(0, 0).r as i32 - 128).abs() <= 1, "r {}", half.pixel(0, 0).r);
  }

  #[test]
  fn copy_spans_touches_only_covered_pixels() {
    let src = Image::uniform(4, 2, Color::from_rgb(1, 2, 3));
    let mut dst = Image::uniform(4, 2, Color::from_rgb(9, 9, 9));
    copy_spans(&mut dst, &src, &[Span::new(1, 1, 2, 0xFFFF)]);
    assert_eq!(dst.pixel(0, 1), Color::from_rgb(9, 9, 9));
    assert_eq!(dst.pixel(1, 1), Color::from_rgb(1, 2, 3));
    assert_eq!(dst.pixel(2, 1), Color::from_rgb(1, 2, 3));
    assert_eq!(dst.pixel(3, 1), Color::from_rgb(9, 9, 9));
    assert_eq!(dst.pixel(1, 0), Color::from_rgb(9, 9, 9));
  }
}
