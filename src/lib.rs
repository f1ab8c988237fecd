pub mod background;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod surface;

pub use background::{BackgroundLoader, MemoryBackgroundLoader, RasterImage};
#[cfg(feature = "fs")]
pub use background::FsBackgroundLoader;
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RenderConfig, StyleConfig};
pub use error::{BackgroundLoadError, DecodeError, ElementGeometryError};
pub use ir::{Diagram, DrawingElement, ElementKind, Point, Shape};
pub use parser::{Decoded, SkipReason, SkippedElement, decode, encode};
pub use pipeline::Renderer;
pub use render::{RenderOutcome, arrowhead, render, render_serialized};
pub use surface::{Surface, SvgSurface};

/// Render a serialized diagram over `background` into a fresh SVG document of
/// the configured size.
pub fn render_svg(serialized: &str, background: &RasterImage, config: &Config) -> (String, RenderOutcome) {
    let mut surface = SvgSurface::new(config.render.width, config.render.height);
    let outcome = render_serialized(&mut surface, background, serialized, &config.style);
    (surface.to_svg(), outcome)
}
