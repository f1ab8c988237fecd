//! Background images: decoding, validation and the asynchronous loaders that
//! resolve a background reference into a ready [`RasterImage`].
//!
//! A loader is invoked at most once per render pass and does no caching;
//! callers that want to reuse a background keep the [`RasterImage`] itself,
//! which is cheap to clone.

use crate::error::BackgroundLoadError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// A fully decoded background image.
///
/// Holding one means the image has been read and checked end to end, so the
/// render routine never waits on or fails because of the background.
#[derive(Debug, Clone)]
pub struct RasterImage {
    data: Arc<[u8]>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl RasterImage {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self, BackgroundLoadError> {
        let data: Arc<[u8]> = bytes.into();
        let format = match image::guess_format(&data)? {
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            other => {
                return Err(BackgroundLoadError::UnsupportedFormat(format!("{other:?}")));
            }
        };
        let decoded = image::load_from_memory(&data)?;
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            data,
            format,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Intrinsic size in pixels; independent of the size it is drawn at.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn data_uri(&self) -> String {
        let encoded = BASE64_STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.format.mime_type(), encoded)
    }
}

/// Resolves a background reference into a decoded image.
#[async_trait]
pub trait BackgroundLoader: Send + Sync {
    async fn load(&self, reference: &str) -> Result<RasterImage, BackgroundLoadError>;
}

/// Serves backgrounds the caller already holds in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackgroundLoader {
    images: HashMap<String, Arc<[u8]>>,
}

impl MemoryBackgroundLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.images.insert(reference.into(), bytes.into());
    }

    pub fn with_image(mut self, reference: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(reference, bytes);
        self
    }
}

#[async_trait]
impl BackgroundLoader for MemoryBackgroundLoader {
    async fn load(&self, reference: &str) -> Result<RasterImage, BackgroundLoadError> {
        let bytes = self
            .images
            .get(reference)
            .ok_or_else(|| BackgroundLoadError::NotFound {
                reference: reference.to_string(),
            })?;
        RasterImage::from_bytes(Arc::clone(bytes))
    }
}

/// Reads backgrounds from disk, relative to `root` when one is set.
#[cfg(feature = "fs")]
#[derive(Debug, Clone, Default)]
pub struct FsBackgroundLoader {
    root: Option<std::path::PathBuf>,
}

#[cfg(feature = "fs")]
impl FsBackgroundLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, reference: &str) -> std::path::PathBuf {
        match &self.root {
            Some(root) => root.join(reference),
            None => std::path::PathBuf::from(reference),
        }
    }
}

#[cfg(feature = "fs")]
#[async_trait]
impl BackgroundLoader for FsBackgroundLoader {
    async fn load(&self, reference: &str) -> Result<RasterImage, BackgroundLoadError> {
        let path = self.resolve(reference);
        tracing::debug!(path = %path.display(), "loading background");
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BackgroundLoadError::NotFound {
                    reference: reference.to_string(),
                }
            } else {
                BackgroundLoadError::Io {
                    reference: reference.to_string(),
                    source,
                }
            }
        })?;
        tokio::task::spawn_blocking(move || RasterImage::from_bytes(bytes))
            .await
            .map_err(|err| BackgroundLoadError::Task(err.to_string()))?
    }
}
