//! Audio interchange helpers: base64 PCM payloads and WAV containers.
//!
//! Speech APIs typically return raw signed 16-bit little-endian PCM as a
//! base64 string with a MIME type such as `audio/L16;codec=pcm;rate=24000`.
//! Browsers and players need a container, so [`pcm_to_wav`] prepends the
//! standard 44-byte RIFF/WAVE header (mono, 16-bit).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Size of the canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

const NUM_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Encoded audio plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioBytes {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioBytes {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "audio/wav".to_string(),
        }
    }
}

/// Wrap mono 16-bit PCM samples in a RIFF/WAVE container.
pub fn pcm_to_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let block_align = NUM_CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * u32::from(block_align);
    let data_size = (samples.len() * 2) as u32;

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);
    // "RIFF" chunk descriptor
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    // "fmt " sub-chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    // "data" sub-chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    debug!("WAV: {} samples @ {} Hz → {} bytes", samples.len(), sample_rate, buf.len());
    buf
}

/// Decode a base64 little-endian PCM16 payload into samples.
///
/// A trailing odd byte is ignored.
pub fn decode_pcm16_base64(b64: &str) -> Result<Vec<i16>, base64::DecodeError> {
    let bytes = STANDARD.decode(b64.trim())?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Read the `rate=` parameter from an `audio/L16` style MIME type.
pub fn pcm_sample_rate(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("rate="))
        .find_map(|rate| rate.trim().parse().ok())
}

/// Convert a base64 PCM16 payload straight to WAV bytes.
pub fn wav_from_base64_pcm(b64: &str, sample_rate: u32) -> Result<AudioBytes, base64::DecodeError> {
    let samples = decode_pcm16_base64(b64)?;
    Ok(AudioBytes::wav(pcm_to_wav(&samples, sample_rate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([buf[at], buf[at + 1]])
    }

    #[test]
    fn header_fields() {
        let wav = pcm_to_wav(&[0, 1, -1], 24_000);
        assert_eq!(wav.len(), WAV_HEADER_LEN + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 6);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 24_000);
        assert_eq!(u32_at(&wav, 28), 48_000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 6);
        assert_eq!(&wav[44..], &[0, 0, 1, 0, 0xff, 0xff]);
    }

    #[test]
    fn empty_pcm_is_header_only() {
        let wav = pcm_to_wav(&[], 16_000);
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn decode_base64_samples() {
        let b64 = STANDARD.encode([0x01u8, 0x00, 0xff, 0x7f, 0x09]);
        assert_eq!(decode_pcm16_base64(&b64).unwrap(), vec![1, i16::MAX]);
        assert!(decode_pcm16_base64("***").is_err());
    }

    #[test]
    fn sample_rate_from_mime() {
        assert_eq!(pcm_sample_rate("audio/L16;codec=pcm;rate=24000"), Some(24_000));
        assert_eq!(pcm_sample_rate("audio/L16; rate=16000"), Some(16_000));
        assert_eq!(pcm_sample_rate("audio/wav"), None);
    }

    #[test]
    fn wav_from_payload() {
        let b64 = STANDARD.encode([0u8; 8]);
        let audio = wav_from_base64_pcm(&b64, 8_000).unwrap();
        assert_eq!(audio.mime_type, "audio/wav");
        assert_eq!(audio.bytes.len(), WAV_HEADER_LEN + 8);
    }
}
