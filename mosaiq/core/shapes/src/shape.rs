use mosaiq_core::{RasterContext, Span};
use rand::Rng;

use crate::{Ellipse, Polygon, Quadratic, Rectangle, RotatedEllipse, RotatedRectangle, Triangle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Selects which primitive family a search samples from.
/// `Any` picks one of the concrete kinds uniformly per candidate.
pub enum ShapeKind {
  Any,
  Triangle,
  Rectangle,
  Ellipse,
  Circle,
  RotatedRectangle,
  Quadratic,
  RotatedEllipse,
  Polygon,
}

/// The concrete kinds `Any` dispatches over.
const CONCRETE_KINDS: [ShapeKind; 8] = [
  ShapeKind::Triangle,
  ShapeKind::Rectangle,
  ShapeKind::Ellipse,
  ShapeKind::Circle,
  ShapeKind::RotatedRectangle,
  ShapeKind::Quadratic,
  ShapeKind::RotatedEllipse,
  ShapeKind::Polygon,
];

impl ShapeKind {
  /// Maps the numeric mode used on the command line to a kind.
  pub fn from_index(p_index: u32) -> Option<ShapeKind> {
    match p_index {
      0 => Some(ShapeKind::Any),
      1 => Some(ShapeKind::Triangle),
      2 => Some(ShapeKind::Rectangle),
      3 => Some(ShapeKind::Ellipse),
      4 => Some(ShapeKind::Circle),
      5 => Some(ShapeKind::RotatedRectangle),
      6 => Some(ShapeKind::Quadratic),
      7 => Some(ShapeKind::RotatedEllipse),
      8 => Some(ShapeKind::Polygon),
      _ => None,
    }
  }
  /// Parses a kind from its lowercase name, as used by the REPL.
  pub fn from_name(p_name: &str) -> Option<ShapeKind> {
    match p_name {
      "any" | "combo" => Some(ShapeKind::Any),
      "triangle" => Some(ShapeKind::Triangle),
      "rect" | "rectangle" => Some(ShapeKind::Rectangle),
      "ellipse" => Some(ShapeKind::Ellipse),
      "circle" => Some(ShapeKind::Circle),
      "rotatedrect" | "rotated-rectangle" => Some(ShapeKind::RotatedRectangle),
      "beziers" | "quadratic" => Some(ShapeKind::Quadratic),
      "rotatedellipse" | "rotated-ellipse" => Some(ShapeKind::RotatedEllipse),
      "polygon" => Some(ShapeKind::Polygon),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
/// A geometric primitive. Values are plain data: cloning deep-copies the
/// parameters and nothing references canvas or worker state.
pub enum Shape {
  Triangle(Triangle),
  Rectangle(Rectangle),
  Ellipse(Ellipse),
  RotatedRectangle(RotatedRectangle),
  Quadratic(Quadratic),
  RotatedEllipse(RotatedEllipse),
  Polygon(Polygon),
}

impl Shape {
  /// Creates a random shape of the requested kind.
  pub fn random<R: Rng>(p_kind: ShapeKind, p_width: i32, p_height: i32, p_rng: &mut R) -> Shape {
    match p_kind {
      ShapeKind::Any => {
        let kind = CONCRETE_KINDS[p_rng.random_range(0..CONCRETE_KINDS.len())];
        Shape::random(kind, p_width, p_height, p_rng)
      }
      ShapeKind::Triangle => Shape::Triangle(Triangle::random(p_width, p_height, p_rng)),
      ShapeKind::Rectangle => Shape::Rectangle(Rectangle::random(p_width, p_height, p_rng)),
      ShapeKind::Ellipse => Shape::Ellipse(Ellipse::random(p_width, p_height, p_rng)),
      ShapeKind::Circle => Shape::Ellipse(Ellipse::random_circle(p_width, p_height, p_rng)),
      ShapeKind::RotatedRectangle => Shape::RotatedRectangle(RotatedRectangle::random(p_width, p_height, p_rng)),
      ShapeKind::Quadratic => Shape::Quadratic(Quadratic::random(p_width, p_height, p_rng)),
      ShapeKind::RotatedEllipse => Shape::RotatedEllipse(RotatedEllipse::random(p_width, p_height, p_rng)),
      ShapeKind::Polygon => Shape::Polygon(Polygon::random(p_width, p_height, p_rng)),
    }
  }

  /// Mutates the shape parameters in place; the result is always a valid
  /// instance of the same variant.
  pub fn mutate<R: Rng>(&mut self, p_width: i32, p_height: i32, p_rng: &mut R) {
    match self {
      Shape::Triangle(t) => t.mutate(p_width, p_height, p_rng),
      Shape::Rectangle(r) => r.mutate(p_width, p_height, p_rng),
      Shape::Ellipse(e) => e.mutate(p_width, p_height, p_rng),
      Shape::RotatedRectangle(r) => r.mutate(p_width, p_height, p_rng),
      Shape::Quadratic(q) => q.mutate(p_width, p_height, p_rng),
      Shape::RotatedEllipse(e) => e.mutate(p_width, p_height, p_rng),
      Shape::Polygon(p) => p.mutate(p_width, p_height, p_rng),
    }
  }

  /// Rasterizes the shape into the context's span arena and returns the
  /// clipped spans.
  pub fn rasterize<'a>(&self, p_ctx: &'a mut RasterContext) -> &'a [Span] {
    match self {
      Shape::Triangle(t) => t.rasterize(p_ctx),
      Shape::Rectangle(r) => r.rasterize(p_ctx),
      Shape::Ellipse(e) => e.rasterize(p_ctx),
      Shape::RotatedRectangle(r) => r.rasterize(p_ctx),
      Shape::Quadratic(q) => q.rasterize(p_ctx),
      Shape::RotatedEllipse(e) => e.rasterize(p_ctx),
      Shape::Polygon(p) => p.rasterize(p_ctx),
    }
  }

  /// Emits the shape as an SVG element carrying the given paint attributes.
  pub fn svg(&self, p_attrs: &str) -> String {
    match self {
      Shape::Triangle(t) => t.svg(p_attrs),
      Shape::Rectangle(r) => r.svg(p_attrs),
      Shape::Ellipse(e) => e.svg(p_attrs),
      Shape::RotatedRectangle(r) => r.svg(p_attrs),
      Shape::Quadratic(q) => q.svg(p_attrs),
      Shape::RotatedEllipse(e) => e.svg(p_attrs),
      Shape::Polygon(p) => p.svg(p_attrs),
    }
  }

  /// Returns the shape mapped to display space.
  pub fn scaled(&self, p_scale: f64) -> Shape {
    match self {
      Shape::Triangle(t) => Shape::Triangle(t.scaled(p_scale)),
      Shape::Rectangle(r) => Shape::Rectangle(r.scaled(p_scale)),
      Shape::Ellipse(e) => Shape::Ellipse(e.scaled(p_scale)),
      Shape::RotatedRectangle(r) => Shape::RotatedRectangle(r.scaled(p_scale)),
      Shape::Quadratic(q) => Shape::Quadratic(q.scaled(p_scale)),
      Shape::RotatedEllipse(e) => Shape::RotatedEllipse(e.scaled(p_scale)),
      Shape::Polygon(p) => Shape::Polygon(p.scaled(p_scale)),
    }
  }
}
