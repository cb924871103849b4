// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for fragment loading, caching and rendering.

use crate::dom::NodeId;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Fragment source bytes were fetched.
///
/// # Log Level
/// `info!` - Happens once per identifier
///
/// # Example
/// ```
/// use soulbind::observability::messages::fragment::FragmentFetched;
///
/// let msg = FragmentFetched {
///     identifier: "templates/productTile.frag",
///     size_bytes: 512,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct FragmentFetched<'a> {
    pub identifier: &'a str,
    pub size_bytes: usize,
}

impl Display for FragmentFetched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fetched fragment '{}' ({} bytes)",
            self.identifier, self.size_bytes
        )
    }
}

impl StructuredLog for FragmentFetched<'_> {
    fn log(&self) {
        tracing::info!(
            identifier = self.identifier,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "fragment_fetched",
            span_name = name,
            identifier = self.identifier,
        )
    }
}

/// A fragment module was compiled and cached.
///
/// # Log Level
/// `info!` - Happens once per identifier
pub struct FragmentCompiled<'a> {
    pub identifier: &'a str,
    pub kind: &'a str,
}

impl Display for FragmentCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled {} fragment '{}'",
            self.kind, self.identifier
        )
    }
}

impl StructuredLog for FragmentCompiled<'_> {
    fn log(&self) {
        tracing::info!(
            identifier = self.identifier,
            kind = self.kind,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "fragment_compiled",
            span_name = name,
            identifier = self.identifier,
            kind = self.kind,
        )
    }
}

pub struct FragmentCacheHit<'a> {
    pub identifier: &'a str,
}

impl Display for FragmentCacheHit<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Fragment '{}' served from cache", self.identifier)
    }
}

impl StructuredLog for FragmentCacheHit<'_> {
    fn log(&self) {
        tracing::debug!(identifier = self.identifier, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "fragment_cache_hit",
            span_name = name,
            identifier = self.identifier,
        )
    }
}

/// Companion styles of a fragment were added to the document head.
///
/// # Log Level
/// `info!` - Happens once per identifier
pub struct StylesInjected<'a> {
    pub identifier: &'a str,
    pub style_id: &'a str,
    pub size_bytes: usize,
}

impl Display for StylesInjected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Injected styles '{}' for fragment '{}' ({} bytes)",
            self.style_id, self.identifier, self.size_bytes
        )
    }
}

impl StructuredLog for StylesInjected<'_> {
    fn log(&self) {
        tracing::info!(
            identifier = self.identifier,
            style_id = self.style_id,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "styles_injected",
            span_name = name,
            style_id = self.style_id,
        )
    }
}

/// A mounted fragment was rendered.
///
/// # Log Level
/// `debug!` - One per mount per change
pub struct FragmentRendered<'a> {
    pub identifier: &'a str,
    pub mount: NodeId,
    pub changed: bool,
    pub output_size: usize,
}

impl Display for FragmentRendered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rendered fragment '{}' at {}: {} bytes ({})",
            self.identifier,
            self.mount,
            self.output_size,
            if self.changed { "updated" } else { "unchanged" }
        )
    }
}

impl StructuredLog for FragmentRendered<'_> {
    fn log(&self) {
        tracing::debug!(
            identifier = self.identifier,
            mount = %self.mount,
            changed = self.changed,
            output_size = self.output_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "fragment_render",
            span_name = name,
            identifier = self.identifier,
            mount = %self.mount,
        )
    }
}

/// A fragment mount was dropped from the registry.
pub struct FragmentPruned<'a> {
    pub identifier: &'a str,
    pub mount: NodeId,
}

impl Display for FragmentPruned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pruned fragment '{}' mounted at {}",
            self.identifier, self.mount
        )
    }
}

impl StructuredLog for FragmentPruned<'_> {
    fn log(&self) {
        tracing::debug!(
            identifier = self.identifier,
            mount = %self.mount,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "fragment_pruned",
            span_name = name,
            mount = %self.mount,
        )
    }
}

/// Loading a fragment discovered in the tree failed. Nothing is mounted.
///
/// # Log Level
/// `warn!` - The failure is swallowed after logging
///
/// # Example
/// ```
/// use soulbind::observability::messages::fragment::FragmentLoadFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
/// let msg = FragmentLoadFailed {
///     identifier: "templates/missing.frag",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct FragmentLoadFailed<'a> {
    pub identifier: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for FragmentLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load fragment '{}': {}",
            self.identifier, self.error
        )
    }
}

impl StructuredLog for FragmentLoadFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            identifier = self.identifier,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "fragment_load_failed",
            span_name = name,
            identifier = self.identifier,
        )
    }
}
