//! Signal generation, shaping and effect primitives.
//!
//! Everything here works on whole buffers: each function takes its input by
//! value or by slice and hands back a freshly owned buffer. Nothing keeps
//! state between calls, so independent buffers can be rendered on separate
//! threads without coordination.

/// Single-tap echo with dry/wet balance.
pub mod delay;
/// Percentage-based ADSR envelope shaping.
pub mod envelope;
/// Butterworth design and zero-phase filtering.
pub mod filter;
/// Band-limited additive oscillators.
pub mod oscillator;
/// Convolution reverb.
pub mod reverb;

pub use envelope::{EnvelopeSegments, EnvelopeSpec};
pub use oscillator::Waveform;
