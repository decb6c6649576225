//! The fixed second-order low-pass filter applied after resampling.
//!
//! The corner frequency is a constant, 3000 Hz, chosen to suppress
//! resampling artifacts above the typical speech-intelligibility range. It
//! is intentionally not configurable.

use std::f64::consts::PI;

use crate::{SPEECH_LOWPASS_HZ, TransformError, TransformResult};

/// A biquad (direct form I) filter with internal state.
#[derive(Debug, Clone)]
pub struct Biquad {
    /// Feed-forward coefficients b0, b1, b2.
    b: [f64; 3],
    /// Feed-back coefficients a1, a2 (a0 normalized to 1).
    a: [f64; 2],
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Designs a second-order Butterworth low-pass via bilinear transform.
    ///
    /// # Errors
    /// Returns an error when the cutoff is not strictly between 0 and the
    /// Nyquist frequency.
    pub fn lowpass(cutoff_hz: f64, sample_rate: f64) -> TransformResult<Self> {
        let nyquist = sample_rate / 2.0;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
            return Err(TransformError::InvalidParameter(format!(
                "cutoff {cutoff_hz} Hz must be between 0 and Nyquist ({nyquist} Hz)"
            )));
        }

        // Pre-warped analog prototype mapped with Q = 1/sqrt(2).
        let k = (PI * cutoff_hz / sample_rate).tan();
        let k2 = k * k;
        let sqrt2 = 2.0_f64.sqrt();
        let norm = 1.0 + sqrt2 * k + k2;

        Ok(Self {
            b: [k2 / norm, 2.0 * k2 / norm, k2 / norm],
            a: [(2.0 * k2 - 2.0) / norm, (1.0 - sqrt2 * k + k2) / norm],
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        })
    }

    /// The fixed speech low-pass used by the transform pipeline.
    pub fn speech_lowpass(sample_rate: f64) -> TransformResult<Self> {
        Self::lowpass(SPEECH_LOWPASS_HZ, sample_rate)
    }

    /// Processes a single sample through the difference equation
    /// `y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]`.
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let output = self.b[0] * input + self.b[1] * self.x1 + self.b[2] * self.x2
            - self.a[0] * self.y1
            - self.a[1] * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filters a channel in place.
    pub fn process_in_place(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(f64::from(*sample)) as f32;
        }
    }

    /// Clears the delay lines. Call between channels so state never leaks
    /// from one channel into the next.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Magnitude response at `freq_hz` for a filter designed at
    /// `sample_rate`.
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / sample_rate;
        // Evaluate |B(e^jw) / A(e^jw)| without a complex-number dependency.
        let (b_re, b_im) = [self.b[0], self.b[1], self.b[2]]
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(re, im), (i, &c)| {
                let phase = omega * i as f64;
                (re + c * phase.cos(), im - c * phase.sin())
            });
        let (a_re, a_im) = [1.0, self.a[0], self.a[1]]
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(re, im), (i, &c)| {
                let phase = omega * i as f64;
                (re + c * phase.cos(), im - c * phase.sin())
            });

        (b_re * b_re + b_im * b_im).sqrt() / (a_re * a_re + a_im * a_im).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_cutoff_at_or_above_nyquist() {
        assert!(Biquad::lowpass(4_000.0, 8_000.0).is_err());
        assert!(Biquad::lowpass(0.0, 8_000.0).is_err());
        assert!(Biquad::lowpass(3_000.0, 8_000.0).is_ok());
    }

    #[test]
    fn dc_passes_at_unity_gain() {
        let mut filter = Biquad::speech_lowpass(44_100.0).unwrap();
        let mut last = 0.0;
        for _ in 0..5_000 {
            last = filter.process_sample(1.0);
        }
        assert!((last - 1.0).abs() < 1e-6);
    }

    #[test]
    fn corner_sits_near_minus_three_db() {
        let filter = Biquad::speech_lowpass(44_100.0).unwrap();
        let corner = filter.magnitude_at(SPEECH_LOWPASS_HZ, 44_100.0);
        assert!((corner - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn high_frequencies_are_attenuated() {
        let filter = Biquad::speech_lowpass(44_100.0).unwrap();
        let passband = filter.magnitude_at(500.0, 44_100.0);
        let stopband = filter.magnitude_at(12_000.0, 44_100.0);
        assert!(passband > 0.99);
        assert!(stopband < 0.1);
    }

    #[test]
    fn reset_clears_filter_state() {
        let mut filter = Biquad::speech_lowpass(44_100.0).unwrap();
        for _ in 0..64 {
            filter.process_sample(1.0);
        }
        filter.reset();
        let fresh = Biquad::speech_lowpass(44_100.0).unwrap().process_sample(0.25);
        assert_eq!(filter.process_sample(0.25), fresh);
    }
}
