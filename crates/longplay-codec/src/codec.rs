//! Codec collaborator contract.

use async_trait::async_trait;
use longplay_core::{AudioSpec, Frame, Result};

/// Turns compressed segment bytes into frames and back.
///
/// `decode` may return several frames, in planar or interleaved layout;
/// callers normalize and concatenate them. `encode` receives exactly the
/// valid region of a segment.
#[async_trait]
pub trait Codec: Send + Sync {
    /// Short codec name for logs.
    fn name(&self) -> &str;

    /// Decode `bytes`, which were produced by `encode` for a stream of `spec`.
    async fn decode(&self, bytes: &[u8], spec: &AudioSpec) -> Result<Vec<Frame>>;

    async fn encode(&self, frame: &Frame) -> Result<Vec<u8>>;
}
