//! The voice-transform pipeline.
//!
//! A linear, allocation-only pipeline: decode, resample at the combined
//! pitch/speed rate, low-pass, fit the output window, encode. It is a pure
//! function of its inputs — no shared state, so concurrent invocations are
//! independent. There is no cancellation and no internal retry; a caller
//! that stops caring simply drops the result.
//!
//! Two deliberate contracts worth restating here:
//!
//! - Pitch and tempo are coupled through one resampling rate
//!   (`speed * 2^(semitones/12)`). This is not a pitch-preserving
//!   time-stretch and must not be "fixed" into one.
//! - The output window length is `round(input_frames / speed_factor)` —
//!   the speed factor alone, never the combined rate. The combined rate
//!   only sets how fast the source is consumed inside that window, which is
//!   how a pitch shift lands without changing duration.

use tracing::debug;

use crate::filter::Biquad;
use crate::resample::{fit_window, rate_render};
use crate::wav::{EncodedWav, decode_wav, encode_wav};
use crate::{AudioClip, TransformError, TransformParams, TransformResult};

/// Renders the transformed signal as raw samples, without the container.
///
/// The result keeps the input's channel count and sample rate; its length
/// is the output window. If the rate-adjusted source runs out before the
/// window fills, the tail is exact silence; if it overruns, it is
/// truncated. The fixed low-pass runs over the rendered content only, so
/// padded tails stay exactly zero.
///
/// # Errors
/// Fails when the fixed filter cannot be designed for the clip's sample
/// rate (Nyquist at or below the 3000 Hz corner).
pub fn render(clip: &AudioClip, params: &TransformParams) -> TransformResult<AudioClip> {
    let combined = params.combined_rate();
    let frames = clip.samples_per_channel();
    let out_len = (frames as f64 / params.speed_factor).round() as usize;

    let mut filter = Biquad::speech_lowpass(f64::from(clip.sample_rate()))
        .map_err(|e| TransformError::Render(e.to_string()))?;

    debug!(
        channels = clip.num_channels(),
        frames,
        out_len,
        combined_rate = combined,
        "rendering transform window"
    );

    clip.map_channels(|channel| {
        let source = channel.to_vec();
        let mut content = rate_render(&source, combined);
        filter.reset();
        filter.process_in_place(&mut content);
        fit_window(content, out_len)
    })
}

/// Transforms an encoded recording end to end:
/// decode → render → encode.
///
/// Channel count and sample rate are preserved from decode. The returned
/// container is produced exactly once per invocation and handed to the
/// caller.
///
/// # Errors
/// [`TransformError::Decode`] for corrupt or unsupported input — fatal for
/// this call, no partial output — and [`TransformError::Render`] when the
/// render step fails.
pub fn transform(input: &[u8], params: &TransformParams) -> TransformResult<EncodedWav> {
    let clip = decode_wav(input)?;
    let rendered = render(&clip, params)?;
    encode_wav(&rendered)
}
