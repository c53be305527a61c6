//! Namespaced store keys.

use longplay_core::{Error, Result, SegmentId, TrackId};
use std::fmt;
use std::str::FromStr;

/// Kind of entry a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Track metadata record
    Track,
    /// Segment metadata record
    Segment,
    /// Compressed segment bytes
    SegmentData,
    /// Rendered segment waveform
    SegmentWaveform,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Track,
        Namespace::Segment,
        Namespace::SegmentData,
        Namespace::SegmentWaveform,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Track => "track",
            Namespace::Segment => "segment",
            Namespace::SegmentData => "segment-data",
            Namespace::SegmentWaveform => "segment-waveform",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.prefix() == prefix)
    }
}

/// A `namespace/id` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey {
    pub namespace: Namespace,
    pub id: String,
}

impl StoreKey {
    pub fn new(namespace: Namespace, id: impl Into<String>) -> Self {
        Self {
            namespace,
            id: id.into(),
        }
    }

    pub fn track(id: TrackId) -> Self {
        Self::new(Namespace::Track, id.to_string())
    }

    pub fn segment(id: SegmentId) -> Self {
        Self::new(Namespace::Segment, id.to_string())
    }

    pub fn segment_data(id: SegmentId) -> Self {
        Self::new(Namespace::SegmentData, id.to_string())
    }

    pub fn segment_waveform(id: SegmentId) -> Self {
        Self::new(Namespace::SegmentWaveform, id.to_string())
    }

    /// Every per-segment key, for bulk deletion.
    pub fn all_for_segment(id: SegmentId) -> [StoreKey; 3] {
        [
            Self::segment(id),
            Self::segment_data(id),
            Self::segment_waveform(id),
        ]
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace.prefix(), self.id)
    }
}

impl FromStr for StoreKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (prefix, id) = s
            .split_once('/')
            .ok_or_else(|| Error::Store(format!("malformed key: {s}")))?;
        let namespace = Namespace::from_prefix(prefix)
            .ok_or_else(|| Error::Store(format!("unknown namespace: {prefix}")))?;
        if id.is_empty() || id.contains('/') {
            return Err(Error::Store(format!("malformed key id: {s}")));
        }
        Ok(Self::new(namespace, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = SegmentId::new();
        let key = StoreKey::segment_data(id);
        assert_eq!(key.to_string(), format!("segment-data/{id}"));
        assert_eq!(key.to_string().parse::<StoreKey>().unwrap(), key);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("nope".parse::<StoreKey>().is_err());
        assert!("album/123".parse::<StoreKey>().is_err());
        assert!("track/".parse::<StoreKey>().is_err());
        assert!("track/a/b".parse::<StoreKey>().is_err());
    }

    #[test]
    fn test_all_for_segment_covers_segment_namespaces() {
        let keys = StoreKey::all_for_segment(SegmentId::new());
        let namespaces: Vec<_> = keys.iter().map(|k| k.namespace).collect();
        assert_eq!(
            namespaces,
            vec![Namespace::Segment, Namespace::SegmentData, Namespace::SegmentWaveform]
        );
    }
}
