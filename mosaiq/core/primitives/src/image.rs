use rayon::prelude::*;

use crate::Color;

#[derive(Clone, Debug)]
/// An RGBA8 raster with non-premultiplied samples in row-major order.
/// The pixel stride is 4 and the row stride is `4 * width`.
pub struct Image {
  width: u32,
  height: u32,
  pixels: Vec<u8>,
}

impl Image {
  /// Creates a new image filled with transparent black.
  pub fn new(p_width: u32, p_height: u32) -> Image {
    Image {
      width: p_width,
      height: p_height,
      pixels: vec![0; p_width as usize * p_height as usize * 4],
    }
  }
  /// Creates a new image filled with a uniform color.
  pub fn uniform(p_width: u32, p_height: u32, p_color: Color) -> Image {
    let mut image = Image::new(p_width, p_height);
    image.fill(p_color);
    image
  }
  /// Creates an image from an existing RGBA8 buffer.
  /// Returns `None` when the buffer length does not match the dimensions.
  pub fn from_rgba(p_width: u32, p_height: u32, p_pixels: Vec<u8>) -> Option<Image> {
    if p_pixels.len() != p_width as usize * p_height as usize * 4 {
      return None;
    }
    Some(Image {
      width: p_width,
      height: p_height,
      pixels: p_pixels,
    })
  }
  /// Returns the width of the image in pixels.
  pub fn width(&self) -> u32 {
    self.width
  }
  /// Returns the height of the image in pixels.
  pub fn height(&self) -> u32 {
    self.height
  }
  /// Returns the `(width, height)` of the image.
  pub fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }
  /// Returns the byte offset of the pixel at `(x, y)`.
  #[inline]
  pub fn pix_offset(&self, p_x: i32, p_y: i32) -> usize {
    (p_y as usize * self.width as usize + p_x as usize) * 4
  }
  /// Returns the raw RGBA bytes.
  pub fn rgba(&self) -> &[u8] {
    &self.pixels
  }
  /// Returns the raw RGBA bytes mutably.
  pub fn rgba_mut(&mut self) -> &mut [u8] {
    &mut self.pixels
  }
  /// Returns the color of the pixel at `(x, y)`.
  pub fn pixel(&self, p_x: i32, p_y: i32) -> Color {
    let i = self.pix_offset(p_x, p_y);
    Color::from_rgba(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3])
  }
  /// Sets the pixel at `(x, y)`.
  pub fn set_pixel(&mut self, p_x: i32, p_y: i32, p_color: Color) {
    let i = self.pix_offset(p_x, p_y);
    self.pixels[i] = p_color.r;
    self.pixels[i + 1] = p_color.g;
    self.pixels[i + 2] = p_color.b;
    self.pixels[i + 3] = p_color.a;
  }
  /// Fills the whole image with a uniform color.
  pub fn fill(&mut self, p_color: Color) {
    for px in self.pixels.chunks_exact_mut(4) {
      px[0] = p_color.r;
      px[1] = p_color.g;
      px[2] = p_color.b;
      px[3] = p_color.a;
    }
  }
  /// Computes the mean color of the image, ignoring alpha.
  /// Useful as a background heuristic before approximating an image.
  pub fn average_color(&self) -> Color {
    let count = (self.width as u64 * self.height as u64).max(1);
    let sums = self
      .pixels
      .par_chunks_exact(4)
      .fold(
        || [0u64; 3],
        |mut acc, px| {
          acc[0] += px[0] as u64;
          acc[1] += px[1] as u64;
          acc[2] += px[2] as u64;
          acc
        },
      )
      .reduce(|| [0u64; 3], |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]]);
    Color::from_rgb((sums[0] / count) as u8, (sums[1] / count) as u8, (sums[2] / count) as u8)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uniform_fill_sets_every_pixel() {
    let img = Image::uniform(3, 2, Color::from_rgba(9, 8, 7, 6));
    for px in img.rgba().chunks_exact(4) {
      assert_eq!(px, &[9, 8, 7, 6]);
    }
  }

  #[test]
  fn from_rgba_rejects_wrong_length() {
    assert!(Image::from_rgba(2, 2, vec![0; 15]).is_none());
    assert!(Image::from_rgba(2, 2, vec![0; 16]).is_some());
  }

  #[test]
  fn average_color_of_checkerboard() {
    let mut img = Image::new(2, 1);
    img.set_pixel(0, 0, Color::from_rgb(0, 0, 0));
    img.set_pixel(1, 0, Color::from_rgb(255, 255, 255));
    let avg = img.average_color();
    assert_eq!(avg, Color::from_rgb(127, 127, 127));
  }

  #[test]
  fn pix_offset_walks_rows() {
    let img = Image::new(4, 4);
    assert_eq!(img.pix_offset(0, 0), 0);
    assert_eq!(img.pix_offset(3, 0), 12);
    assert_eq!(img.pix_offset(0, 1), 16);
  }
}
