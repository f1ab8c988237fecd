use crate::ir::ElementKind;
use thiserror::Error;

/// The serialized diagram is not well-formed. Renders fall back to the
/// background alone.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("diagram is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("diagram must be a sequence of elements, found {found}")]
    NotASequence { found: &'static str },
    #[error("element {element}: point {point} does not have numeric coordinates")]
    InvalidCoordinate { element: usize, point: usize },
}

/// An element whose points cannot be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementGeometryError {
    #[error("{kind} element needs at least {required} point(s), found {found}")]
    TooFewPoints {
        kind: ElementKind,
        required: usize,
        found: usize,
    },
    #[error("{kind} element: point {point} has a non-finite coordinate")]
    NonFiniteCoordinate { kind: ElementKind, point: usize },
}

#[derive(Debug, Error)]
pub enum BackgroundLoadError {
    #[error("background '{reference}' not found")]
    NotFound { reference: String },
    #[error("failed to read background '{reference}': {source}")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode background image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("unsupported background image format: {0}")]
    UnsupportedFormat(String),
    #[error("background load task failed: {0}")]
    Task(String),
}

/// Exporting a finished surface to pixels failed.
#[cfg(feature = "png")]
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("generated SVG could not be parsed: {0}")]
    Svg(#[from] usvg::Error),
    #[error("failed to allocate a {width}x{height} pixmap")]
    Allocation { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Png(String),
}
