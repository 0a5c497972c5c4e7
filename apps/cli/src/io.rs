//! File adapters around the engine: target decoding and downscaling, plus
//! PNG/JPEG/SVG/GIF emission. The engine itself never touches a file.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::GenericImageView;
use mosaiq::prelude::{Engine, Image};

/// Delay between animation frames, in centiseconds.
const GIF_FRAME_DELAY: u16 = 50;
/// Delay on the final animation frame, in centiseconds.
const GIF_LAST_DELAY: u16 = 250;
/// Score improvement required to emit an animation frame.
const GIF_SCORE_DELTA: f64 = 0.001;

/// Decodes the target image and optionally downscales it so the larger
/// dimension is at most `p_resize`.
pub fn load_image(p_path: &Path, p_resize: u32) -> Result<Image> {
  let mut decoded = image::open(p_path).with_context(|| format!("failed to decode {}", p_path.display()))?;
  if p_resize > 0 && decoded.width().max(decoded.height()) > p_resize {
    decoded = decoded.thumbnail(p_resize, p_resize);
  }
  let rgba = decoded.to_rgba8();
  let (width, height) = rgba.dimensions();
  Image::from_rgba(width, height, rgba.into_raw()).context("decoded buffer has unexpected size")
}

/// Saves an engine output, dispatching on the path extension.
pub fn save(p_path: &str, p_engine: &Engine) -> Result<()> {
  let lower = p_path.to_lowercase();
  if lower.ends_with(".png") {
    save_png(p_path, &p_engine.render())
  } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
    save_jpg(p_path, &p_engine.render())
  } else if lower.ends_with(".svg") {
    std::fs::write(p_path, p_engine.svg()).with_context(|| format!("failed to write {p_path}"))
  } else if lower.ends_with(".gif") {
    save_gif(p_path, &p_engine.frames(GIF_SCORE_DELTA))
  } else {
    bail!("unsupported output format: {p_path}")
  }
}

/// Writes the raster as a PNG file.
pub fn save_png(p_path: &str, p_image: &Image) -> Result<()> {
  let file = File::create(p_path).with_context(|| format!("failed to create {p_path}"))?;
  let (width, height) = p_image.dimensions();
  let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
  encoder.set_color(png::ColorType::Rgba);
  encoder.set_depth(png::BitDepth::Eight);
  let mut writer = encoder.write_header().context("failed to write PNG header")?;
  writer.write_image_data(p_image.rgba()).context("failed to write PNG data")?;
  Ok(())
}

/// Writes the raster as a JPEG file at quality 95.
pub fn save_jpg(p_path: &str, p_image: &Image) -> Result<()> {
  let (width, height) = p_image.dimensions();
  let rgba = image::RgbaImage::from_raw(width, height, p_image.rgba().to_vec())
    .context("raster buffer has unexpected size")?;
  let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
  let file = File::create(p_path).with_context(|| format!("failed to create {p_path}"))?;
  let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(BufWriter::new(file), 95);
  encoder
    .encode(rgb.as_raw(), width, height, image::ColorType::Rgb8)
    .context("failed to encode JPEG")?;
  Ok(())
}

/// Writes the frames as an animated GIF with per-frame palettes.
pub fn save_gif(p_path: &str, p_frames: &[Image]) -> Result<()> {
  let Some(first) = p_frames.first() else {
    bail!("no frames to encode");
  };
  let (width, height) = first.dimensions();
  if width > u16::MAX as u32 || height > u16::MAX as u32 {
    bail!("image dimensions exceed the GIF maximum");
  }
  let file = File::create(p_path).with_context(|| format!("failed to create {p_path}"))?;
  let (global_palette, _) = quantize(first);
  let mut encoder =
    gif::Encoder::new(BufWriter::new(file), width as u16, height as u16, &global_palette).context("GIF encoder")?;
  encoder.set_repeat(gif::Repeat::Infinite).context("GIF repeat")?;
  for (i, frame_image) in p_frames.iter().enumerate() {
    let (palette, indexed) = quantize(frame_image);
    let frame = gif::Frame {
      width: width as u16,
      height: height as u16,
      delay: if i + 1 == p_frames.len() { GIF_LAST_DELAY } else { GIF_FRAME_DELAY },
      palette: Some(palette),
      buffer: std::borrow::Cow::Owned(indexed),
      ..Default::default()
    };
    encoder.write_frame(&frame).context("GIF frame write")?;
  }
  Ok(())
}

/// Quantizes a raster to a 256-color palette plus indices.
fn quantize(p_image: &Image) -> (Vec<u8>, Vec<u8>) {
  let pixels = p_image.rgba();
  let quantizer = color_quant::NeuQuant::new(10, 256, pixels);
  let palette = quantizer.color_map_rgb();
  let indexed = pixels.chunks_exact(4).map(|px| quantizer.index_of(px) as u8).collect();
  (palette, indexed)
}
