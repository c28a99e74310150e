use crate::error::PlaybackError;
use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, Source};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Fully decoded reply audio (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as f64 / self.channels.max(1) as f64;
        Duration::from_secs_f64(frames / self.sample_rate.max(1) as f64)
    }

    /// Playable source for a rodio sink
    pub fn source(&self) -> SamplesBuffer<i16> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.clone())
    }

    /// Write the audio to a 16-bit WAV file
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .context("Failed to write sample to WAV")?;
        }

        writer.finalize().context("Failed to finalize WAV file")?;
        Ok(())
    }
}

/// Decode an encoded audio asset (MP3, WAV, OGG, FLAC, M4A); the container is probed
pub fn decode(bytes: Vec<u8>) -> Result<DecodedAudio, PlaybackError> {
    let decoder =
        Decoder::new(Cursor::new(bytes)).map_err(|e| PlaybackError::Decode(e.to_string()))?;

    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<i16> = decoder.collect();

    if samples.is_empty() || sample_rate == 0 || channels == 0 {
        return Err(PlaybackError::Decode("asset contains no audio".to_string()));
    }

    debug!(
        "Decoded {} samples, {}Hz, {} channels",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_wav() {
        let samples: Vec<i16> = (0..2400).map(|i| (i % 100) as i16).collect();
        let audio = decode(wav_bytes(&samples, 24000, 1)).unwrap();

        assert_eq!(audio.sample_rate, 24000);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples, samples);
        assert!((audio.duration().as_secs_f64() - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result = decode(b"definitely not audio".to_vec());
        assert!(matches!(result, Err(PlaybackError::Decode(_))));
    }

    #[test]
    fn test_source_matches_decoded_format() {
        let audio = DecodedAudio {
            samples: vec![0; 3200],
            sample_rate: 16000,
            channels: 2,
        };

        let source = audio.source();
        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 16000);
        assert_eq!(source.total_duration(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_write_wav_copy() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reply.wav");
        let audio = DecodedAudio {
            samples: vec![1, -1, 2, -2],
            sample_rate: 16000,
            channels: 2,
        };

        audio.write_wav(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 16000);
        let written: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(written, audio.samples);
    }
}
