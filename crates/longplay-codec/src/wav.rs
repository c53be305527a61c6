//! WAV codec using hound
//!
//! Stores each segment as an in-memory WAV file. Supports all four sample
//! formats: 8-bit unsigned, 16/32-bit integer and 32-bit float.

use crate::codec::Codec;
use async_trait::async_trait;
use hound::{WavReader, WavSpec, WavWriter};
use longplay_core::{AudioSpec, Error, Frame, Result, SampleBuffer, SampleFormat};
use std::io::{Cursor, Read, Seek, Write};

/// WAV codec configuration
#[derive(Debug, Clone)]
pub struct WavCodec {
    /// Maximum samples per decoded frame (default: 65536)
    pub frame_samples: usize,
}

impl Default for WavCodec {
    fn default() -> Self {
        Self {
            frame_samples: 1 << 16,
        }
    }
}

impl WavCodec {
    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_samples: frame_samples.max(1),
        }
    }
}

#[async_trait]
impl Codec for WavCodec {
    fn name(&self) -> &str {
        "wav"
    }

    async fn decode(&self, bytes: &[u8], spec: &AudioSpec) -> Result<Vec<Frame>> {
        decode_wav_memory(bytes, spec, self.frame_samples)
    }

    async fn encode(&self, frame: &Frame) -> Result<Vec<u8>> {
        let frame = frame.clone().into_interleaved()?;
        encode_wav_memory(&frame.data, &frame.spec)
    }
}

/// Encode interleaved samples to WAV bytes
pub fn encode_wav_memory(data: &SampleBuffer, spec: &AudioSpec) -> Result<Vec<u8>> {
    if data.format() != spec.format {
        return Err(Error::SampleTypeMismatch(format!(
            "{} buffer for {} stream",
            data.format(),
            spec.format
        )));
    }

    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let mut writer = WavWriter::new(cursor, create_wav_spec(spec)).map_err(codec_error)?;

        write_samples(&mut writer, data)?;

        // Finalize writes the header and flushes
        writer.finalize().map_err(codec_error)?;
    }

    Ok(buffer)
}

/// Decode WAV bytes into interleaved frames of at most `frame_samples` samples
pub fn decode_wav_memory(bytes: &[u8], spec: &AudioSpec, frame_samples: usize) -> Result<Vec<Frame>> {
    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(codec_error)?;
    let header = reader.spec();
    let found = spec_from_header(&header)?;
    if found != *spec {
        return Err(Error::FormatMismatch {
            expected: *spec,
            found,
        });
    }

    let data = read_samples(&mut reader, spec.format)?;
    let mut frames = Vec::with_capacity(data.len().div_ceil(frame_samples.max(1)));
    let mut rest = data;
    while !rest.is_empty() {
        let tail = rest.split_off(frame_samples.max(1));
        frames.push(Frame::interleaved(*spec, rest));
        rest = tail;
    }
    Ok(frames)
}

/// Create hound WavSpec from a stream spec
fn create_wav_spec(spec: &AudioSpec) -> WavSpec {
    let (bits_per_sample, sample_format) = match spec.format {
        SampleFormat::U8 => (8, hound::SampleFormat::Int),
        SampleFormat::S16 => (16, hound::SampleFormat::Int),
        SampleFormat::S32 => (32, hound::SampleFormat::Int),
        SampleFormat::F32 => (32, hound::SampleFormat::Float),
    };

    WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample,
        sample_format,
    }
}

fn spec_from_header(header: &WavSpec) -> Result<AudioSpec> {
    let format = match (header.sample_format, header.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => SampleFormat::U8,
        (hound::SampleFormat::Int, 16) => SampleFormat::S16,
        (hound::SampleFormat::Int, 32) => SampleFormat::S32,
        (hound::SampleFormat::Float, 32) => SampleFormat::F32,
        (format, bits) => {
            return Err(Error::Codec(format!(
                "unsupported WAV sample format {format:?}/{bits} bits"
            )))
        }
    };
    Ok(AudioSpec::new(format, header.sample_rate, header.channels))
}

fn write_samples<W: Write + Seek>(writer: &mut WavWriter<W>, data: &SampleBuffer) -> Result<()> {
    match data {
        // hound stores 8-bit WAV unsigned but speaks signed
        SampleBuffer::U8(v) => {
            for &s in v {
                writer
                    .write_sample((s as i16 - 128) as i8)
                    .map_err(codec_error)?;
            }
        }
        SampleBuffer::S16(v) => {
            for &s in v {
                writer.write_sample(s).map_err(codec_error)?;
            }
        }
        SampleBuffer::S32(v) => {
            for &s in v {
                writer.write_sample(s).map_err(codec_error)?;
            }
        }
        SampleBuffer::F32(v) => {
            for &s in v {
                writer.write_sample(s).map_err(codec_error)?;
            }
        }
    }
    Ok(())
}

fn read_samples<R: Read>(reader: &mut WavReader<R>, format: SampleFormat) -> Result<SampleBuffer> {
    Ok(match format {
        SampleFormat::U8 => SampleBuffer::U8(
            reader
                .samples::<i8>()
                .map(|s| s.map(|s| (s as i16 + 128) as u8))
                .collect::<std::result::Result<_, _>>()
                .map_err(codec_error)?,
        ),
        SampleFormat::S16 => SampleBuffer::S16(
            reader
                .samples::<i16>()
                .collect::<std::result::Result<_, _>>()
                .map_err(codec_error)?,
        ),
        SampleFormat::S32 => SampleBuffer::S32(
            reader
                .samples::<i32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(codec_error)?,
        ),
        SampleFormat::F32 => SampleBuffer::F32(
            reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(codec_error)?,
        ),
    })
}

fn codec_error(e: hound::Error) -> Error {
    Error::Codec(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn round_trip(data: SampleBuffer, channels: u16) -> SampleBuffer {
        let spec = AudioSpec::new(data.format(), 44100, channels);
        let codec = WavCodec::default();
        let bytes = codec
            .encode(&Frame::interleaved(spec, data))
            .await
            .unwrap();
        let frames = codec.decode(&bytes, &spec).await.unwrap();
        let parts: Vec<_> = frames.into_iter().map(|f| f.data).collect();
        SampleBuffer::concat(spec.format, &parts).unwrap()
    }

    #[tokio::test]
    async fn test_lossless_for_every_format() {
        let cases = vec![
            SampleBuffer::U8(vec![0, 1, 127, 128, 255, 200]),
            SampleBuffer::S16(vec![-32768, -1, 0, 1, 32767, 42]),
            SampleBuffer::S32(vec![i32::MIN, -7, 0, 7, i32::MAX, 99]),
            SampleBuffer::F32(vec![-1.0, -0.25, 0.0, 0.25, 1.0, 0.5]),
        ];
        for data in cases {
            assert_eq!(round_trip(data.clone(), 2).await, data);
        }
    }

    #[tokio::test]
    async fn test_decode_splits_into_frames() {
        let spec = AudioSpec::new(SampleFormat::S16, 8000, 1);
        let data = SampleBuffer::S16((0..10).collect());
        let bytes = encode_wav_memory(&data, &spec).unwrap();

        let frames = WavCodec::new(4).decode(&bytes, &spec).await.unwrap();
        let lens: Vec<_> = frames.iter().map(Frame::len).collect();
        assert_eq!(lens, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_decode_rejects_other_spec() {
        let spec = AudioSpec::new(SampleFormat::S16, 8000, 1);
        let bytes = encode_wav_memory(&SampleBuffer::S16(vec![1, 2]), &spec).unwrap();
        let other = AudioSpec::new(SampleFormat::S16, 16000, 1);
        assert!(matches!(
            WavCodec::default().decode(&bytes, &other).await,
            Err(Error::FormatMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_decode_garbage_fails() {
        let spec = AudioSpec::new(SampleFormat::S16, 8000, 1);
        assert!(matches!(
            WavCodec::default().decode(b"not a wav", &spec).await,
            Err(Error::Codec(_))
        ));
    }

    #[test]
    fn test_encode_rejects_mismatched_buffer() {
        let spec = AudioSpec::new(SampleFormat::S16, 8000, 1);
        assert!(encode_wav_memory(&SampleBuffer::F32(vec![0.0]), &spec).is_err());
    }
}
