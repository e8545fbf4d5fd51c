//! WAV packaging for voice-activity segments.
//!
//! The VAD hands over mono `f32` samples in `[-1.0, 1.0]`; transcription
//! endpoints want an audio *file*.  [`encode_wav`] writes a canonical
//! 44-byte RIFF header followed by 16-bit little-endian PCM.
//!
//! ```rust
//! use voice_code_editor::audio::encode_wav;
//!
//! let wav = encode_wav(&[0.0, 0.5, -0.5], 16_000);
//! assert_eq!(&wav[..4], b"RIFF");
//! assert_eq!(wav.len(), 44 + 3 * 2);
//! ```

const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

/// Encode mono `samples` at `sample_rate` Hz as a 16-bit PCM WAV file.
///
/// Samples are clamped to `[-1.0, 1.0]`; NaN becomes silence.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = (samples.len() * usize::from(block_align)) as u32;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);

    // RIFF chunk
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt sub-chunk (PCM)
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        out.extend_from_slice(&to_pcm16(s).to_le_bytes());
    }

    log::debug!(
        "wav: {} sample(s) @ {sample_rate} Hz → {} byte(s)",
        samples.len(),
        out.len()
    );
    out
}

fn to_pcm16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

/// Duration in seconds of `sample_count` mono samples.
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f32 / sample_rate as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
    }

    fn sample_at(buf: &[u8], i: usize) -> i16 {
        i16::from_le_bytes(buf[HEADER_LEN + 2 * i..HEADER_LEN + 2 * i + 2].try_into().unwrap())
    }

    #[test]
    fn header_fields() {
        let wav = encode_wav(&[0.0; 100], 16_000);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 200);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1, "PCM format");
        assert_eq!(u16_at(&wav, 22), 1, "mono");
        assert_eq!(u32_at(&wav, 24), 16_000);
        assert_eq!(u32_at(&wav, 28), 32_000, "byte rate");
        assert_eq!(u16_at(&wav, 32), 2, "block align");
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 200);
        assert_eq!(wav.len(), 44 + 200);
    }

    #[test]
    fn samples_are_scaled_and_clamped() {
        let wav = encode_wav(&[1.0, -1.0, 2.5, -7.0, 0.0, f32::NAN], 8_000);
        assert_eq!(sample_at(&wav, 0), i16::MAX);
        assert_eq!(sample_at(&wav, 1), -i16::MAX);
        assert_eq!(sample_at(&wav, 2), i16::MAX);
        assert_eq!(sample_at(&wav, 3), -i16::MAX);
        assert_eq!(sample_at(&wav, 4), 0);
        assert_eq!(sample_at(&wav, 5), 0);
    }

    #[test]
    fn empty_segment_is_header_only() {
        let wav = encode_wav(&[], 16_000);
        assert_eq!(wav.len(), HEADER_LEN);
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn duration() {
        assert!((duration_secs(24_000, 16_000) - 1.5).abs() < f32::EPSILON);
        assert_eq!(duration_secs(10, 0), 0.0);
    }
}
