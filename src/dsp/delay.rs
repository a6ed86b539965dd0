use crate::{
    error::{Result, SynthError},
    SampleBuffer,
};

/// Single-tap echo.
///
/// The input is first normalised to a peak of 1, then a copy delayed by
/// `delay_ms` and scaled by `dry_wet` is added on top. The output grows by
/// the delay length so the echo tail is never cut off:
///
/// ```text
/// dry:  [x0 x1 x2 x3  0  0]
/// wet:  [ 0  0 x0 x1 x2 x3] × dry_wet
/// ```
pub fn apply_delay(
    input: &[f64],
    delay_ms: f64,
    dry_wet: f64,
    sample_rate: f64,
) -> Result<SampleBuffer> {
    if !(delay_ms >= 0.0 && delay_ms.is_finite()) {
        return Err(SynthError::effect(format!(
            "delay time must be a finite value greater than or equal to 0, got {delay_ms}"
        )));
    }
    if !(0.0..=1.0).contains(&dry_wet) {
        return Err(SynthError::effect(format!(
            "dry/wet must be between 0 and 1, got {dry_wet}"
        )));
    }
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(SynthError::InvalidSampleRate(format!(
            "sample rate must be a finite value greater than 0, got {sample_rate}"
        )));
    }

    let delay_samples = (sample_rate / 1000.0 * delay_ms).floor() as usize;
    let peak = input.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    // silence stays silence instead of dividing by zero
    let scale = if peak > 0.0 { 1.0 / peak } else { 0.0 };

    let mut out = vec![0.0; input.len() + delay_samples];
    for (i, &x) in input.iter().enumerate() {
        let dry = x * scale;
        out[i] += dry;
        out[i + delay_samples] += dry_wet * dry;
    }
    Ok(out)
}
