//! Core geometry and rasterization support for the mosaiq engine.
//! Holds the float point and path types, the stroke expansion, the span
//! type emitted by rasterizers, and the reusable rasterization context.

pub mod geometry;
pub mod math;
pub mod raster;
pub mod span;

pub use self::geometry::path::Path;
pub use self::geometry::pointf::PointF;
pub use self::geometry::stroke::stroke_round;
pub use self::raster::RasterContext;
pub use self::span::Span;
