//! Channel remixing and gain on interleaved `f32` samples.

/// Remix interleaved samples from `from` channels to `to` channels.
///
/// Mono fans out to every output channel. Wider layouts fold down by
/// averaging the input channels that map onto each output (`i % to`).
pub fn remix(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);

    for frame in samples.chunks_exact(from) {
        for c in 0..to {
            if from < to {
                out.push(frame[c % from]);
            } else {
                let mut sum = 0.0f32;
                let mut count = 0;
                for (i, &s) in frame.iter().enumerate() {
                    if i % to == c {
                        sum += s;
                        count += 1;
                    }
                }
                out.push(sum / count as f32);
            }
        }
    }

    out
}

/// Multiply every sample by `gain`.
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for s in samples.iter_mut() {
        *s *= gain;
    }
}
