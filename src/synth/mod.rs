// Purpose: validated entry points that turn requests into buffers
// This layer sits above the dsp primitives and owns parameter checking

pub mod modulation;
pub mod waveform;
