/// Audio clips
///
/// A clip is encoded audio held in memory plus its playback length. Clips are
/// shared between registry entries, descriptors and live emitters.
use std::f32::consts::PI;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, Source};

use crate::error::{MixerError, MixerResult};

/// Shared reference to a loaded clip
pub type ClipHandle = Arc<Clip>;

pub struct Clip {
    name: String,
    duration: Duration,
    data: Option<Arc<[u8]>>,
}

impl Clip {
    /// Decode encoded audio (WAV, MP3, OGG, FLAC) and measure its length
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> MixerResult<Self> {
        let name = name.into();
        let data: Arc<[u8]> = bytes.into();

        let decoder = Decoder::new(Cursor::new(Arc::clone(&data))).map_err(|e| {
            MixerError::Decode {
                name: name.clone(),
                source: Box::new(e),
            }
        })?;

        let duration = match decoder.total_duration() {
            Some(duration) => duration,
            None => {
                // Compressed streams rarely report a length; count the samples
                let channels = u64::from(decoder.channels().max(1));
                let rate = u64::from(decoder.sample_rate().max(1));
                let samples = decoder.count() as u64;
                Duration::from_secs_f64(samples as f64 / (channels * rate) as f64)
            }
        };

        tracing::debug!("Decoded clip {} ({:.2}s)", name, duration.as_secs_f32());

        Ok(Self {
            name,
            duration,
            data: Some(data),
        })
    }

    /// Read and decode a clip file, named after its file stem
    pub fn load(path: &Path) -> MixerResult<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("clip")
            .to_string();
        let bytes = std::fs::read(path).map_err(|e| MixerError::Decode {
            name: path.display().to_string(),
            source: Box::new(e),
        })?;
        Self::from_bytes(name, bytes)
    }

    /// A clip with a known length and no audio data.
    ///
    /// Backends that render audio treat it as silence.
    pub fn silent(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            data: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration.as_secs_f32()
    }

    /// Reader over the encoded bytes, if the clip carries audio
    pub fn reader(&self) -> Option<Cursor<Arc<[u8]>>> {
        self.data.as_ref().map(|data| Cursor::new(Arc::clone(data)))
    }

    pub fn into_handle(self) -> ClipHandle {
        Arc::new(self)
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("bytes", &self.data.as_ref().map(|d| d.len()))
            .finish()
    }
}

/// Encode a mono sine tone as 16-bit WAV
pub fn tone_wav(frequency: f32, seconds: f32, sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        let total = (seconds.max(0.0) * sample_rate as f32) as u32;
        for n in 0..total {
            let t = n as f32 / sample_rate as f32;
            let sample = (t * frequency * 2.0 * PI).sin() * 0.3;
            writer.write_sample((sample * f32::from(i16::MAX)) as i16)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wav_duration() {
        let bytes = tone_wav(440.0, 0.5, 8_000).unwrap();
        let clip = Clip::from_bytes("beep", bytes).unwrap();

        assert_eq!(clip.name(), "beep");
        assert!((clip.duration_secs() - 0.5).abs() < 0.01);
        assert!(clip.reader().is_some());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = Clip::from_bytes("noise", vec![1, 2, 3, 4, 5]);
        assert!(matches!(result, Err(MixerError::Decode { .. })));
    }

    #[test]
    fn test_silent_clip() {
        let clip = Clip::silent("pad", Duration::from_secs(3));
        assert_eq!(clip.duration(), Duration::from_secs(3));
        assert!(clip.reader().is_none());
    }

    #[test]
    fn test_load_names_clip_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("door_creak.wav");
        std::fs::write(&path, tone_wav(220.0, 0.25, 8_000).unwrap()).unwrap();

        let clip = Clip::load(&path).unwrap();
        assert_eq!(clip.name(), "door_creak");
    }
}
