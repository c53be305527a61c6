//! Tolerance constants for sample comparisons.

/// 16-bit quantization step size.
/// Use when a value passes through S16 storage.
pub const INT16_EPSILON: f32 = 1.0 / 32768.0;

/// Resampled signal tolerance, away from the edges.
pub const RESAMPLE_EPSILON: f32 = 0.02;
