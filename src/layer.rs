//! # Layer Trait
//!
//! Tower-style middleware composition for transports.
//!
//! ## How It Works
//!
//! ```text
//! Transport ──▶ Layer::layer() ──▶ Wrapped Transport
//! ```
//!
//! Each middleware provides:
//! 1. A wrapper struct that implements [`Transport`]
//! 2. A `Layer` implementation that creates the wrapper
//!
//! [`RetryLayer`](crate::RetryLayer) is the one this crate ships.
//!
//! ## Example
//!
//! ```rust
//! use mvsfs::{FsError, Layer, RemoteEntry, Transport};
//!
//! // Counts reads, forwards everything.
//! struct Counting<T> {
//!     inner: T,
//!     reads: std::sync::atomic::AtomicUsize,
//! }
//!
//! impl<T: Transport> Transport for Counting<T> {
//!     fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError> {
//!         self.reads.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         self.inner.read_bytes(path)
//!     }
//!     fn write_bytes(&self, path: &str, data: &[u8]) -> Result<(), FsError> {
//!         self.inner.write_bytes(path, data)
//!     }
//!     fn list(&self, query: &str) -> Result<Vec<RemoteEntry>, FsError> {
//!         self.inner.list(query)
//!     }
//! }
//!
//! struct CountingLayer;
//!
//! impl<T: Transport> Layer<T> for CountingLayer {
//!     type Transport = Counting<T>;
//!
//!     fn layer(self, inner: T) -> Self::Transport {
//!         Counting { inner, reads: Default::default() }
//!     }
//! }
//! ```

use crate::Transport;

/// A layer that wraps a transport to add functionality.
///
/// Inspired by Tower's `Layer` trait. `layer(self, transport)` consumes both
/// the configuration and the transport.
pub trait Layer<T> {
    /// The resulting transport type after applying this layer.
    type Transport;

    /// Wrap the given transport.
    fn layer(self, transport: T) -> Self::Transport;
}

/// Extension trait for fluent layer composition.
///
/// ```rust
/// use mvsfs::{LayerExt, MemoryHost, RetryLayer, RetryPolicy, Transport};
///
/// let transport = MemoryHost::new().layer(RetryLayer::new(RetryPolicy::none()));
/// assert!(transport.list("'NOBODY.*'").unwrap().is_empty());
/// ```
pub trait LayerExt: Transport + Sized {
    /// Apply a layer to this transport.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Transport {
        layer.layer(self)
    }
}

// Blanket implementation - any transport gets LayerExt for free
impl<T: Transport> LayerExt for T {}
