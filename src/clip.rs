//! Core audio buffer representation.
//!
//! [`AudioClip`] pairs raw amplitude data with the metadata the pipeline
//! needs: sample rate and channel layout. Mono clips are stored as a 1-D
//! `ndarray` array; multi-channel clips as a 2-D array with shape
//! `(channels, frames)`, one row per channel. All channels are equal length
//! by construction.
//!
//! Clips are produced by the decode step and treated as immutable from then
//! on; every pipeline stage allocates a new clip rather than mutating its
//! input.

use ndarray::{Array1, Array2, ArrayView1};

use crate::{TransformError, TransformResult};

/// Internal storage for mono vs. multi-channel audio data.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipData {
    /// Single channel, one amplitude per frame.
    Mono(Array1<f32>),
    /// `(channels, frames)`; each row is one channel.
    MultiChannel(Array2<f32>),
}

/// An ordered sequence of floating-point amplitudes per channel, with the
/// sample rate they were captured at.
///
/// # Examples
///
/// ```
/// use voicedrop::AudioClip;
/// use ndarray::array;
///
/// let clip = AudioClip::new_mono(array![0.1f32, 0.5, -0.3], 44_100);
/// assert_eq!(clip.num_channels(), 1);
/// assert_eq!(clip.samples_per_channel(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    data: ClipData,
    sample_rate: u32,
}

impl AudioClip {
    /// Creates a mono clip from a 1-D array of amplitudes.
    pub const fn new_mono(data: Array1<f32>, sample_rate: u32) -> Self {
        Self {
            data: ClipData::Mono(data),
            sample_rate,
        }
    }

    /// Creates a multi-channel clip from a `(channels, frames)` array.
    pub const fn new_multi_channel(data: Array2<f32>, sample_rate: u32) -> Self {
        Self {
            data: ClipData::MultiChannel(data),
            sample_rate,
        }
    }

    /// Builds a clip from per-channel sample vectors.
    ///
    /// A single vector produces a mono clip. All vectors must share one
    /// length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> TransformResult<Self> {
        match channels.len() {
            0 => Err(TransformError::InvalidParameter(
                "at least one channel is required".to_string(),
            )),
            1 => {
                let data = channels.into_iter().next().unwrap_or_default();
                Ok(Self::new_mono(Array1::from_vec(data), sample_rate))
            }
            n => {
                let frames = channels[0].len();
                if channels.iter().any(|c| c.len() != frames) {
                    return Err(TransformError::DimensionMismatch(format!(
                        "all {n} channels must have equal length"
                    )));
                }
                let flat: Vec<f32> = channels.into_iter().flatten().collect();
                let data = Array2::from_shape_vec((n, frames), flat).map_err(|e| {
                    TransformError::DimensionMismatch(e.to_string())
                })?;
                Ok(Self::new_multi_channel(data, sample_rate))
            }
        }
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        match &self.data {
            ClipData::Mono(_) => 1,
            ClipData::MultiChannel(arr) => arr.nrows(),
        }
    }

    /// Frames per channel.
    pub fn samples_per_channel(&self) -> usize {
        match &self.data {
            ClipData::Mono(arr) => arr.len(),
            ClipData::MultiChannel(arr) => arr.ncols(),
        }
    }

    /// Total samples across all channels.
    pub fn total_samples(&self) -> usize {
        self.num_channels() * self.samples_per_channel()
    }

    /// Returns true when the clip has exactly one channel.
    pub const fn is_mono(&self) -> bool {
        matches!(self.data, ClipData::Mono(_))
    }

    /// Clip duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples_per_channel() as f64 / self.sample_rate as f64
    }

    /// View of one channel's samples.
    ///
    /// # Panics
    /// Panics if `index >= num_channels()`.
    pub fn channel(&self, index: usize) -> ArrayView1<'_, f32> {
        match &self.data {
            ClipData::Mono(arr) => {
                assert_eq!(index, 0, "mono clip has a single channel");
                arr.view()
            }
            ClipData::MultiChannel(arr) => arr.row(index),
        }
    }

    /// Iterator over per-channel views.
    pub fn channels(&self) -> impl Iterator<Item = ArrayView1<'_, f32>> {
        (0..self.num_channels()).map(|ch| self.channel(ch))
    }

    /// Access to the underlying storage.
    pub const fn data(&self) -> &ClipData {
        &self.data
    }

    /// Copies the clip into channel-interleaved frame order (LRLR...),
    /// the layout the WAV `data` chunk uses.
    pub fn to_interleaved(&self) -> Vec<f32> {
        match &self.data {
            ClipData::Mono(arr) => arr.to_vec(),
            ClipData::MultiChannel(arr) => {
                let channels = arr.nrows();
                let frames = arr.ncols();
                let mut out = Vec::with_capacity(channels * frames);
                for frame in 0..frames {
                    for ch in 0..channels {
                        out.push(arr[[ch, frame]]);
                    }
                }
                out
            }
        }
    }

    /// Builds a clip from channel-interleaved samples.
    pub fn from_interleaved(
        samples: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> TransformResult<Self> {
        if channels == 0 {
            return Err(TransformError::InvalidParameter(
                "channel count must be non-zero".to_string(),
            ));
        }
        if samples.len() % channels != 0 {
            return Err(TransformError::DimensionMismatch(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        let frames = samples.len() / channels;
        if channels == 1 {
            return Ok(Self::new_mono(
                Array1::from_vec(samples.to_vec()),
                sample_rate,
            ));
        }
        let mut data = Array2::zeros((channels, frames));
        for frame in 0..frames {
            for ch in 0..channels {
                data[[ch, frame]] = samples[frame * channels + ch];
            }
        }
        Ok(Self::new_multi_channel(data, sample_rate))
    }

    /// Applies `f` to every channel independently, producing a new clip at
    /// the same sample rate. All produced channels must be equal length.
    pub fn map_channels<F>(&self, mut f: F) -> TransformResult<Self>
    where
        F: FnMut(ArrayView1<'_, f32>) -> Vec<f32>,
    {
        let mapped: Vec<Vec<f32>> = self.channels().map(|ch| f(ch)).collect();
        Self::from_channels(mapped, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn mono_clip_metadata() {
        let clip = AudioClip::new_mono(array![0.1f32, 0.2, 0.3, 0.4], 8_000);
        assert_eq!(clip.num_channels(), 1);
        assert_eq!(clip.samples_per_channel(), 4);
        assert_eq!(clip.total_samples(), 4);
        assert!(clip.is_mono());
        assert!((clip.duration_seconds() - 0.0005).abs() < 1e-9);
    }

    #[test]
    fn stereo_interleave_round_trip() {
        let clip = AudioClip::new_multi_channel(
            array![[0.1f32, 0.2, 0.3], [-0.1, -0.2, -0.3]],
            44_100,
        );
        let interleaved = clip.to_interleaved();
        assert_eq!(interleaved, vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);

        let back = AudioClip::from_interleaved(&interleaved, 2, 44_100).unwrap();
        assert_eq!(back, clip);
    }

    #[test]
    fn from_channels_rejects_ragged_input() {
        let err = AudioClip::from_channels(vec![vec![0.0; 3], vec![0.0; 4]], 44_100);
        assert!(matches!(err, Err(TransformError::DimensionMismatch(_))));
    }

    #[test]
    fn from_interleaved_rejects_partial_frames() {
        let err = AudioClip::from_interleaved(&[0.0; 5], 2, 44_100);
        assert!(matches!(err, Err(TransformError::DimensionMismatch(_))));
    }

    #[test]
    fn map_channels_preserves_shape_metadata() {
        let clip = AudioClip::new_multi_channel(array![[1.0f32, -1.0], [0.5, -0.5]], 22_050);
        let halved = clip.map_channels(|ch| ch.iter().map(|s| s * 0.5).collect()).unwrap();
        assert_eq!(halved.num_channels(), 2);
        assert_eq!(halved.sample_rate(), 22_050);
        assert_eq!(halved.channel(0)[0], 0.5);
    }
}
