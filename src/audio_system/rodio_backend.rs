/// rodio output backend
///
/// Every emitter owns one `Sink` on the shared default output stream.
use glam::Vec3;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::backend::{AudioBackend, Emitter};
use crate::error::{MixerError, MixerResult};
use crate::sound::ClipHandle;

pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioBackend {
    /// Open the default output device
    pub fn try_default() -> MixerResult<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| MixerError::Backend(Box::new(e)))?;
        tracing::info!("Opened default audio output");
        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }
}

impl AudioBackend for RodioBackend {
    fn create_emitter(&mut self) -> MixerResult<Box<dyn Emitter>> {
        let sink = Sink::try_new(&self.stream_handle).map_err(|e| MixerError::Backend(Box::new(e)))?;
        Ok(Box::new(RodioEmitter {
            stream_handle: self.stream_handle.clone(),
            sink,
        }))
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

struct RodioEmitter {
    stream_handle: OutputStreamHandle,
    sink: Sink,
}

impl RodioEmitter {
    /// A stopped sink cannot be reused, so swap in a fresh one
    fn reset_sink(&mut self) {
        self.sink.stop();
        match Sink::try_new(&self.stream_handle) {
            Ok(sink) => self.sink = sink,
            Err(e) => tracing::warn!("Failed to recreate audio sink: {}", e),
        }
    }
}

impl Emitter for RodioEmitter {
    fn play(&mut self, clip: &ClipHandle, looping: bool, gain: f32, pitch: f32) {
        self.reset_sink();

        let Some(reader) = clip.reader() else {
            tracing::trace!("Clip {} carries no audio, playing silence", clip.name());
            return;
        };

        let source: Result<Box<dyn Source<Item = i16> + Send>, _> = if looping {
            Decoder::new_looped(reader).map(|d| Box::new(d) as Box<dyn Source<Item = i16> + Send>)
        } else {
            Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Source<Item = i16> + Send>)
        };

        match source {
            Ok(source) => {
                self.sink.set_volume(gain);
                self.sink.set_speed(pitch);
                self.sink.append(source);
                self.sink.play();
            }
            Err(e) => tracing::warn!("Failed to decode clip {}: {}", clip.name(), e),
        }
    }

    fn stop(&mut self) {
        self.reset_sink();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn set_gain(&mut self, gain: f32) {
        self.sink.set_volume(gain.max(0.0));
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.sink.set_speed(pitch);
    }

    fn set_position(&mut self, _position: Vec3) {
        // Distance is folded into the gain; the sink itself is not positional
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty()
    }

    fn set_active(&mut self, active: bool) {
        if !active {
            self.sink.pause();
        }
    }
}
