//! Fieldmark Render Library
//!
//! Flattens a markup session into RGBA pixels and encodes the result.
//! Rasterization is done on the CPU with exact pixel-centre coverage, so
//! the same session always produces the same bytes.

mod export;
mod paint;
mod raster;
mod renderer;

pub use export::{EncodedRaster, ExportError, Exporter};
pub use raster::RasterRenderer;
pub use renderer::{RenderContext, RenderStyle, Renderer, RendererError};
