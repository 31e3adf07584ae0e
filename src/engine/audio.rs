use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Source};

use super::resources::AssetError;

type Clip = Buffered<Decoder<Cursor<Vec<u8>>>>;

pub const DECODERS: &[&str] = &["WAV", "VORBIS"];

pub struct AudioEngine {
    // Dropping the stream closes the device.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clip: Option<Clip>,
}

impl AudioEngine {
    pub fn new() -> Result<Self> {
        let host = rodio::cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no default audio output device"))?;
        match device.default_output_config() {
            Ok(format) => tracing::info!(
                target: "audio",
                format = ?format.sample_format(),
                channels = format.channels(),
                frequency = format.sample_rate().0,
                "mixer opened"
            ),
            Err(err) => tracing::warn!(target: "audio", %err, "mixer format unavailable"),
        }

        let (stream, handle) =
            OutputStream::try_from_device(&device).context("couldn't create mixer")?;

        tracing::info!(target: "audio", "available decoders:");
        for decoder in DECODERS {
            tracing::info!(target: "audio", " - {decoder}");
        }

        Ok(Self {
            _stream: stream,
            handle,
            clip: None,
        })
    }

    pub fn load_clip(&mut self, path: &Path, bytes: Vec<u8>) -> Result<(), AssetError> {
        let decoder = Decoder::new(Cursor::new(bytes)).map_err(|source| AssetError::Audio {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            target: "audio",
            path = %path.display(),
            channels = decoder.channels(),
            frequency = decoder.sample_rate(),
            "clip loaded"
        );
        self.clip = Some(decoder.buffered());
        Ok(())
    }

    pub fn play(&self) {
        let Some(clip) = self.clip.as_ref() else {
            return;
        };
        if let Err(err) = self.handle.play_raw(clip.clone().convert_samples()) {
            tracing::error!(target: "audio", %err, "failed to play audio");
        }
    }
}
