//! The asynchronous front of the engine: wait once for the background, then
//! paint synchronously.
//!
//! Render requests are numbered. When a background finishes loading after a
//! newer request has started, the stale result is discarded and its surface is
//! left alone, so the last request always wins.

use crate::background::BackgroundLoader;
use crate::config::StyleConfig;
use crate::parser::decode;
use crate::render::{RenderOutcome, render_serialized};
use crate::surface::Surface;
use std::sync::atomic::{AtomicU64, Ordering};

/// Paints one target surface.
///
/// The request counter is shared by every call on the same `Renderer`, so a
/// render is superseded by any newer one it makes, whatever surface that one
/// targets. Create one `Renderer` per surface to paint several at once.
pub struct Renderer<L> {
    loader: L,
    style: StyleConfig,
    generation: AtomicU64,
}

impl<L: BackgroundLoader> Renderer<L> {
    pub fn new(loader: L, style: StyleConfig) -> Self {
        Self {
            loader,
            style,
            generation: AtomicU64::new(0),
        }
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load `reference`, then paint it and the decoded `serialized` diagram.
    ///
    /// Never fails: every problem is logged and reflected in the returned
    /// [`RenderOutcome`]. Without a background nothing is drawn and the
    /// surface is left cleared.
    pub async fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        reference: &str,
        serialized: &str,
    ) -> RenderOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(ticket, reference, "render requested");

        let loaded = self.loader.load(reference).await;

        let latest = self.generation.load(Ordering::SeqCst);
        if latest != ticket {
            tracing::debug!(ticket, latest, "discarding superseded render");
            return RenderOutcome::Superseded;
        }

        match loaded {
            Ok(background) => render_serialized(surface, &background, serialized, &self.style),
            Err(error) => {
                tracing::warn!(reference, %error, "background unavailable, skipping diagram");
                surface.clear();
                let decoded = decode(serialized).map(|decoded| decoded.diagram.len());
                RenderOutcome::BackgroundUnavailable { error, decoded }
            }
        }
    }
}
