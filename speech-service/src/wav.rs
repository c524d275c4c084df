//! WAV helpers.
//!
//! Clients may send either a complete WAV file or raw little-endian PCM16
//! mono at 16 kHz. Recognition always receives a WAV.

use std::io::Cursor;

use crate::errors::SpeechError;

pub const PCM_SAMPLE_RATE: u32 = 16_000;

/// `true` when `bytes` starts with a RIFF/WAVE header.
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Returns `bytes` unchanged if it is already a WAV, otherwise wraps it as
/// PCM16 mono 16 kHz.
pub fn ensure_wav(bytes: Vec<u8>) -> Result<Vec<u8>, SpeechError> {
    if is_wav(&bytes) {
        return Ok(bytes);
    }
    pcm16_to_wav(&bytes, PCM_SAMPLE_RATE)
}

/// Wraps raw little-endian PCM16 mono samples in a WAV container.
pub fn pcm16_to_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, SpeechError> {
    if pcm.is_empty() {
        return Err(SpeechError::InvalidAudio("empty audio payload".into()));
    }
    if pcm.len() % 2 != 0 {
        return Err(SpeechError::InvalidAudio(format!(
            "PCM16 payload has odd length {}",
            pcm.len()
        )));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut out = Vec::with_capacity(pcm.len() + 44);
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec)
            .map_err(|e| SpeechError::InvalidAudio(format!("WAV header: {e}")))?;
        for frame in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([frame[0], frame[1]]))
                .map_err(|e| SpeechError::InvalidAudio(format!("WAV write: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| SpeechError::InvalidAudio(format!("WAV finalize: {e}")))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_pcm_gets_header_and_keeps_samples() {
        let samples: [i16; 4] = [0, 1000, -1000, i16::MAX];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = ensure_wav(pcm).unwrap();
        assert!(is_wav(&wav));

        let mut reader = hound::WavReader::new(Cursor::new(&wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn wav_passes_through_untouched() {
        let wav = pcm16_to_wav(&[0, 0, 1, 0], 8_000).unwrap();
        assert_eq!(ensure_wav(wav.clone()).unwrap(), wav);
    }

    #[test]
    fn odd_and_empty_payloads_are_rejected() {
        assert!(matches!(ensure_wav(vec![1, 2, 3]), Err(SpeechError::InvalidAudio(_))));
        assert!(matches!(ensure_wav(Vec::new()), Err(SpeechError::InvalidAudio(_))));
    }
}
