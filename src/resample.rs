//! Playback-rate resampling into a fixed output window.
//!
//! The transform does not time-stretch: it reads the source at a uniform
//! rate multiplier with linear interpolation, the way a sampler's playback
//! rate control does. A rate above 1.0 consumes the source faster (shorter,
//! higher output); below 1.0, slower (longer, lower output).
//!
//! Window fitting is separate and lossy by design: a source longer than the
//! window is truncated, a shorter one is padded with exact silence. Both are
//! ordinary outcomes, not errors.

/// Reads `source` at the uniform `rate` multiplier with linear
/// interpolation.
///
/// Output position `n` samples source position `n * rate`; the output holds
/// every such position that lands strictly inside the source, so its length
/// is `ceil(source_len / rate)`. An empty source or a non-positive rate
/// yields an empty vector.
pub fn rate_render(source: &[f32], rate: f64) -> Vec<f32> {
    if source.is_empty() || !(rate > 0.0) || !rate.is_finite() {
        return Vec::new();
    }

    let out_len = (source.len() as f64 / rate).ceil() as usize;
    let mut output = Vec::with_capacity(out_len);

    for n in 0..out_len {
        let pos = n as f64 * rate;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;

        let s0 = source[idx.min(source.len() - 1)];
        let s1 = source[(idx + 1).min(source.len() - 1)];
        output.push(s0 + frac * (s1 - s0));
    }

    output
}

/// Fits `signal` into a window of exactly `out_len` frames.
///
/// Frames past the window are dropped; missing trailing frames are zero.
pub fn fit_window(mut signal: Vec<f32>, out_len: usize) -> Vec<f32> {
    signal.truncate(out_len);
    signal.resize(out_len, 0.0);
    signal
}
