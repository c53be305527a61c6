//! Reference-counted access to decompressed segment buffers.
//!
//! Each segment carries a [`CacheEntry`]. Opening a segment increments its
//! reader count and materializes the raw buffer; concurrent openers share a
//! single in-flight decompression. The last closer of a modified segment
//! re-encodes it, renders its waveform, and persists both before the buffer
//! is dropped.
//!
//! ```text
//!            open            decode ok
//!   Empty ─────────▶ Decompressing ─────────▶ Loaded ──┐
//!     ▲                    │ decode err        │ open   │ close
//!     │                    ▼ (last waiter)     ◀────────┘
//!     └──────────────── Empty ◀──── close to 0 (flush if modified)
//! ```

use crate::segment::Segment;
use futures::future::{BoxFuture, FutureExt, Shared};
use longplay_analysis::{render_png, summarize_for_width};
use longplay_codec::Codec;
use longplay_core::{AudioSpec, Error, Frame, Result, SampleBuffer, SegmentId, StoreConfig};
use longplay_store::records::save_segment;
use longplay_store::{KvStore, SegmentRecord, StoreKey};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Decompressed samples of one segment, shared by all of its openers.
///
/// May be longer than the segment's `len` while it is being filled.
pub type RawBuffer = Arc<RwLock<SampleBuffer>>;

type PendingLoad = Shared<BoxFuture<'static, std::result::Result<RawBuffer, Arc<Error>>>>;

enum EntryState {
    Empty,
    Decompressing {
        readers: usize,
        modified: bool,
        pending: PendingLoad,
    },
    Loaded {
        buffer: RawBuffer,
        readers: usize,
        modified: bool,
    },
}

/// Per-segment cache state.
pub struct CacheEntry {
    state: Mutex<EntryState>,
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self {
            state: Mutex::new(EntryState::Empty),
        }
    }
}

impl CacheEntry {
    /// Current number of openers, including those awaiting decompression.
    pub fn readers(&self) -> usize {
        match &*self.state.lock() {
            EntryState::Empty => 0,
            EntryState::Decompressing { readers, .. } | EntryState::Loaded { readers, .. } => {
                *readers
            }
        }
    }

    /// True while a raw buffer is resident.
    pub fn is_loaded(&self) -> bool {
        matches!(&*self.state.lock(), EntryState::Loaded { .. })
    }

    /// The resident buffer, if any.
    pub fn buffer(&self) -> Option<RawBuffer> {
        match &*self.state.lock() {
            EntryState::Loaded { buffer, .. } => Some(buffer.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.state.lock() {
            EntryState::Empty => "empty",
            EntryState::Decompressing { .. } => "decompressing",
            EntryState::Loaded { .. } => "loaded",
        };
        f.debug_struct("CacheEntry")
            .field("state", &state)
            .field("readers", &self.readers())
            .finish()
    }
}

/// Opens and closes segment buffers against the store and codec.
///
/// One cache is shared by every track of a project; the per-segment state
/// lives on the segments themselves.
pub struct SegmentCache {
    store: Arc<dyn KvStore>,
    codec: Arc<dyn Codec>,
    config: StoreConfig,
}

impl SegmentCache {
    pub fn new(store: Arc<dyn KvStore>, codec: Arc<dyn Codec>, config: StoreConfig) -> Self {
        Self {
            store,
            codec,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open `segment` for reading or writing and return its raw buffer.
    ///
    /// Every successful open must be paired with a [`close_raw`](Self::close_raw).
    /// A failed open leaves the reader count unchanged.
    pub async fn open_raw(&self, segment: &Segment, spec: &AudioSpec) -> Result<RawBuffer> {
        let entry = &segment.entry;

        let pending = {
            let mut state = entry.state.lock();
            let in_flight = match &mut *state {
                EntryState::Loaded {
                    buffer, readers, ..
                } => {
                    *readers += 1;
                    trace!(segment = %segment.id, readers = *readers, "open (resident)");
                    return Ok(buffer.clone());
                }
                EntryState::Decompressing {
                    readers, pending, ..
                } => {
                    *readers += 1;
                    trace!(segment = %segment.id, readers = *readers, "open (awaiting decode)");
                    Some(pending.clone())
                }
                EntryState::Empty => None,
            };

            match in_flight {
                Some(pending) => pending,
                None => {
                    trace!(segment = %segment.id, len = segment.len, "open (decoding)");
                    let pending = load(
                        self.store.clone(),
                        self.codec.clone(),
                        segment.id,
                        segment.len,
                        *spec,
                        self.config.tolerate_missing_data,
                    )
                    .boxed()
                    .shared();
                    *state = EntryState::Decompressing {
                        readers: 1,
                        modified: false,
                        pending: pending.clone(),
                    };
                    pending
                }
            }
        };

        match pending.await {
            Ok(buffer) => {
                let mut state = entry.state.lock();
                let loaded = match &*state {
                    EntryState::Decompressing {
                        readers, modified, ..
                    } => Some(EntryState::Loaded {
                        buffer: buffer.clone(),
                        readers: *readers,
                        modified: *modified,
                    }),
                    _ => None,
                };
                if let Some(loaded) = loaded {
                    *state = loaded;
                }
                Ok(buffer)
            }
            Err(source) => {
                let mut state = entry.state.lock();
                let drained = match &mut *state {
                    EntryState::Decompressing { readers, .. } => {
                        *readers -= 1;
                        *readers == 0
                    }
                    _ => false,
                };
                if drained {
                    *state = EntryState::Empty;
                }
                Err(Error::Load {
                    segment: segment.id,
                    source,
                })
            }
        }
    }

    /// Release one open of `segment`, ORing in `modified`.
    ///
    /// The last closer of a modified, non-empty segment encodes `[0, len)`,
    /// renders its waveform and persists both, then drops the buffer.
    ///
    /// # Panics
    ///
    /// If the segment is closed more times than it was opened.
    pub async fn close_raw(&self, segment: &Segment, spec: &AudioSpec, modified: bool) -> Result<()> {
        let entry = &segment.entry;

        let flush = {
            let mut state = entry.state.lock();
            let (flush, drained) = match &mut *state {
                EntryState::Empty => {
                    panic!("segment {} closed more times than it was opened", segment.id)
                }
                EntryState::Decompressing {
                    readers,
                    modified: dirty,
                    ..
                } => {
                    assert!(*readers > 0, "segment {} reader count underflow", segment.id);
                    *readers -= 1;
                    *dirty |= modified;
                    (None, false)
                }
                EntryState::Loaded {
                    buffer,
                    readers,
                    modified: dirty,
                } => {
                    assert!(*readers > 0, "segment {} reader count underflow", segment.id);
                    *readers -= 1;
                    *dirty |= modified;
                    trace!(segment = %segment.id, readers = *readers, "close");

                    if *readers > 0 {
                        (None, false)
                    } else if *dirty && segment.len > 0 {
                        *dirty = false;
                        (Some(buffer.clone()), false)
                    } else {
                        (None, true)
                    }
                }
            };
            if drained {
                *state = EntryState::Empty;
            }
            flush
        };

        let Some(buffer) = flush else {
            return Ok(());
        };

        let result = self.flush(segment.id, segment.len, spec, &buffer).await;

        let mut state = entry.state.lock();
        if matches!(&*state, EntryState::Loaded { readers: 0, .. }) {
            *state = EntryState::Empty;
        }
        result
    }

    /// Open a brand-new segment with a silent buffer sized for filling.
    ///
    /// The buffer holds `segment_capacity` samples; the segment starts with
    /// one reader.
    pub fn init_raw(&self, segment: &Segment, spec: &AudioSpec) -> RawBuffer {
        let capacity = self.config.segment_capacity(spec).max(segment.len);
        let buffer: RawBuffer = Arc::new(RwLock::new(SampleBuffer::silence(spec.format, capacity)));
        *segment.entry.state.lock() = EntryState::Loaded {
            buffer: buffer.clone(),
            readers: 1,
            modified: false,
        };
        trace!(segment = %segment.id, capacity, "init");
        buffer
    }

    async fn flush(&self, id: SegmentId, len: usize, spec: &AudioSpec, buffer: &RawBuffer) -> Result<()> {
        let data = {
            let guard = buffer.read();
            guard.slice(0..len)?
        };
        let frame = Frame::interleaved(*spec, data);

        let bytes = self.codec.encode(&frame).await?;
        let compressed = bytes.len();
        self.store.put(&StoreKey::segment_data(id), bytes).await?;
        save_segment(self.store.as_ref(), id, SegmentRecord { len }).await?;

        let samples = frame.data.to_f32();
        let summary = summarize_for_width(&samples, spec.channels as usize, self.config.waveform_width);
        let image = render_png(&summary, self.config.waveform_width, self.config.waveform_height)
            .map_err(|e| Error::Render(e.to_string()))?;
        self.store.put(&StoreKey::segment_waveform(id), image).await?;

        debug!(segment = %id, len, compressed, codec = self.codec.name(), "flushed segment");
        Ok(())
    }
}

impl std::fmt::Debug for SegmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentCache")
            .field("codec", &self.codec.name())
            .field("config", &self.config)
            .finish()
    }
}

async fn load(
    store: Arc<dyn KvStore>,
    codec: Arc<dyn Codec>,
    id: SegmentId,
    len: usize,
    spec: AudioSpec,
    tolerate_missing: bool,
) -> std::result::Result<RawBuffer, Arc<Error>> {
    decode_segment(store.as_ref(), codec.as_ref(), id, len, spec, tolerate_missing)
        .await
        .map(|buffer| Arc::new(RwLock::new(buffer)))
        .map_err(Arc::new)
}

async fn decode_segment(
    store: &dyn KvStore,
    codec: &dyn Codec,
    id: SegmentId,
    len: usize,
    spec: AudioSpec,
    tolerate_missing: bool,
) -> Result<SampleBuffer> {
    if len == 0 {
        return Ok(SampleBuffer::new(spec.format));
    }

    let Some(bytes) = store.get(&StoreKey::segment_data(id)).await? else {
        if tolerate_missing {
            warn!(segment = %id, len, "compressed data missing, substituting silence");
            return Ok(SampleBuffer::silence(spec.format, len));
        }
        return Err(Error::MissingSegmentData(id));
    };

    let parts = codec
        .decode(&bytes, &spec)
        .await?
        .into_iter()
        .map(|frame| frame.into_interleaved().map(|frame| frame.data))
        .collect::<Result<Vec<_>>>()?;
    let mut buffer = SampleBuffer::concat(spec.format, &parts)?;

    if buffer.len() < len {
        warn!(segment = %id, len, decoded = buffer.len(), "decoded segment short, padding with silence");
        buffer.resize(len);
    }
    Ok(buffer)
}
