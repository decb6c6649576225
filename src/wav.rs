//! Linear-PCM RIFF/WAVE container encoding and decoding.
//!
//! The encoded layout is the one bit-exact contract of the pipeline:
//! a canonical 44-byte header (RIFF chunk, `fmt ` subchunk of 16 bytes,
//! `data` subchunk) followed by channel-interleaved 16-bit little-endian
//! frames. Total length is always `frames * channels * 2 + 44`.
//!
//! Decoding is more permissive than encoding: it walks the subchunk list
//! (players and editors routinely insert `LIST` or `fact` chunks before
//! `data`) and accepts 16-bit PCM or 32-bit IEEE float input. Anything else
//! is a decode error — fatal for the call, with no partial output.

use crate::sample::ConvertTo;
use crate::{AudioClip, TransformError, TransformResult};

/// Size of the canonical header this module writes.
pub const HEADER_LEN: usize = 44;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;

/// An encoded voice message: the container bytes plus the header fields
/// they declare.
///
/// Produced exactly once per transform invocation; ownership passes to the
/// caller for playback, storage, or transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedWav {
    bytes: Vec<u8>,
    sample_rate: u32,
    channels: u16,
}

impl EncodedWav {
    /// The declared sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The declared channel count.
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Frames per channel carried by the data chunk.
    pub fn frame_count(&self) -> usize {
        (self.bytes.len() - HEADER_LEN) / (self.channels as usize * 2)
    }

    /// Borrow the container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the container bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Serializes a clip into the canonical 16-bit PCM container.
///
/// Amplitudes are hard-clamped to `[-1.0, 1.0]` before quantization; see
/// [`crate::sample`] for the exact scaling.
///
/// # Errors
/// Returns an error for a zero sample rate or a channel count above
/// `u16::MAX`.
pub fn encode_wav(clip: &AudioClip) -> TransformResult<EncodedWav> {
    if clip.sample_rate() == 0 {
        return Err(TransformError::InvalidParameter(
            "sample rate must be non-zero".to_string(),
        ));
    }
    let channels = u16::try_from(clip.num_channels()).map_err(|_| {
        TransformError::InvalidParameter(format!(
            "channel count {} exceeds the container limit",
            clip.num_channels()
        ))
    })?;

    let interleaved = clip.to_interleaved();
    let data_size = (interleaved.len() * 2) as u32;
    let total_len = HEADER_LEN as u32 + data_size;
    let byte_rate = clip.sample_rate() * 2 * u32::from(channels);
    let block_align = channels * 2;

    let mut bytes = Vec::with_capacity(total_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(total_len - 8).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&clip.sample_rate().to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_size.to_le_bytes());
    for sample in &interleaved {
        let quantized: i16 = sample.convert_to();
        bytes.extend_from_slice(&quantized.to_le_bytes());
    }

    Ok(EncodedWav {
        bytes,
        sample_rate: clip.sample_rate(),
        channels,
    })
}

/// Header fields recovered from a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// `fmt ` audio format tag.
    pub audio_format: u16,
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per encoded sample.
    pub bits_per_sample: u16,
    /// Offset of the data chunk payload within the container.
    pub data_offset: usize,
    /// Size of the data chunk payload in bytes.
    pub data_size: usize,
}

/// Parses the RIFF structure and locates the `fmt ` and `data` chunks
/// without touching the sample payload.
pub fn parse_header(bytes: &[u8]) -> TransformResult<WavHeader> {
    let decode_err = |msg: &str| TransformError::Decode(msg.to_string());

    if bytes.len() < 12 {
        return Err(decode_err("container shorter than the RIFF preamble"));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(decode_err("missing RIFF/WAVE magic"));
    }

    let mut fmt: Option<(u16, u16, u32, u16)> = None;
    let mut data: Option<(usize, usize)> = None;

    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes(
            bytes[offset + 4..offset + 8]
                .try_into()
                .map_err(|_| decode_err("malformed chunk size"))?,
        ) as usize;
        let body = offset + 8;

        match id {
            b"fmt " => {
                if size < 16 || body + 16 > bytes.len() {
                    return Err(decode_err("fmt chunk truncated"));
                }
                let read_u16 = |at: usize| {
                    u16::from_le_bytes([bytes[at], bytes[at + 1]])
                };
                let read_u32 = |at: usize| {
                    u32::from_le_bytes([
                        bytes[at],
                        bytes[at + 1],
                        bytes[at + 2],
                        bytes[at + 3],
                    ])
                };
                fmt = Some((
                    read_u16(body),
                    read_u16(body + 2),
                    read_u32(body + 4),
                    read_u16(body + 14),
                ));
            }
            b"data" => {
                if body + size > bytes.len() {
                    return Err(decode_err("data chunk truncated"));
                }
                data = Some((body, size));
            }
            _ => {}
        }

        // Chunks are word-aligned; odd sizes carry a pad byte.
        offset = body + size + (size & 1);
    }

    let (audio_format, channels, sample_rate, bits_per_sample) =
        fmt.ok_or_else(|| decode_err("no fmt chunk"))?;
    let (data_offset, data_size) = data.ok_or_else(|| decode_err("no data chunk"))?;

    if channels == 0 {
        return Err(decode_err("zero channel count"));
    }
    if sample_rate == 0 {
        return Err(decode_err("zero sample rate"));
    }

    Ok(WavHeader {
        audio_format,
        channels,
        sample_rate,
        bits_per_sample,
        data_offset,
        data_size,
    })
}

/// Decodes a container into an [`AudioClip`] of float amplitudes.
///
/// Accepts 16-bit PCM and 32-bit IEEE float payloads.
///
/// # Errors
/// Any structural problem — bad magic, truncated chunks, unsupported
/// format/bit depth, a payload that does not divide into whole frames — is
/// a [`TransformError::Decode`].
pub fn decode_wav(bytes: &[u8]) -> TransformResult<AudioClip> {
    let header = parse_header(bytes)?;
    let payload = &bytes[header.data_offset..header.data_offset + header.data_size];
    let channels = header.channels as usize;

    let interleaved: Vec<f32> = match (header.audio_format, header.bits_per_sample) {
        (FORMAT_PCM, 16) => payload
            .chunks_exact(2)
            .map(|pair| {
                let raw = i16::from_le_bytes([pair[0], pair[1]]);
                raw.convert_to()
            })
            .collect(),
        (FORMAT_IEEE_FLOAT, 32) => payload
            .chunks_exact(4)
            .map(|quad| f32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]))
            .collect(),
        (format, bits) => {
            return Err(TransformError::Decode(format!(
                "unsupported format tag {format} at {bits} bits per sample"
            )));
        }
    };

    AudioClip::from_interleaved(&interleaved, channels, header.sample_rate)
        .map_err(|e| TransformError::Decode(e.to_string()))
}
