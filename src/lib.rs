//! # voicedrop
//!
//! The voice-transform pipeline behind an anonymous voice-messaging
//! service, plus (behind the `server` feature) the message server itself.
//!
//! A visitor records a short clip, picks a voice preset, and the pipeline
//! turns it into a 16-bit linear-PCM WAV ready to upload:
//!
//! ```
//! use voicedrop::{AudioClip, VoicePreset, pipeline};
//! use ndarray::Array1;
//!
//! # fn example() -> voicedrop::TransformResult<()> {
//! let clip = AudioClip::new_mono(Array1::zeros(44_100), 44_100);
//! let input = voicedrop::wav::encode_wav(&clip)?;
//!
//! let message = pipeline::transform(input.as_bytes(), &VoicePreset::DeepMale.params())?;
//! assert_eq!(message.sample_rate(), 44_100);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline shape
//!
//! `decode → resample at speed * 2^(semitones/12) → fixed 3000 Hz low-pass
//! → fit output window → encode`. Pitch and tempo are intentionally coupled
//! through the single resample rate; the output duration follows the speed
//! factor alone. See [`pipeline`] for the precise contracts.
//!
//! ## Error Handling
//!
//! Fallible operations return [`TransformResult`]; decode and render
//! failures are fatal for the invocation that hit them, with no partial
//! output and no built-in retry.
//!
//! ## Server
//!
//! With the `server` feature enabled, [`server`] adds the HTTP API and
//! SQLite-backed persistence for inboxes: session-token auth, anonymous
//! uploads keyed by a recipient's profile link, and per-message
//! read/favorite/delete state. The `voicedrop-server` binary wires it up.

mod error;

pub mod clip;
pub mod filter;
pub mod pipeline;
pub mod presets;
pub mod resample;
pub mod sample;
pub mod wav;

#[cfg(feature = "server")]
pub mod server;

pub use crate::clip::{AudioClip, ClipData};
pub use crate::error::{TransformError, TransformResult};
pub use crate::pipeline::{render, transform};
pub use crate::presets::{
    PITCH_SEMITONES_RANGE, SPEED_FACTOR_RANGE, TransformParams, VoicePreset,
};
pub use crate::sample::{ConvertTo, Sample};
pub use crate::wav::{EncodedWav, decode_wav, encode_wav};

/// Corner frequency of the fixed post-resample low-pass, in Hz.
///
/// A constant by design: it exists to suppress resampling artifacts above
/// the speech-intelligibility range, not to be tuned per message.
pub const SPEECH_LOWPASS_HZ: f64 = 3_000.0;

/// Left channel index.
pub const LEFT: usize = 0;
/// Right channel index.
pub const RIGHT: usize = 1;
