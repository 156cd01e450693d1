use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::{media_path, AudioDeck};
use crate::events::{AudioChannel, TrackToken};
use crate::log_debug;

/// One rodio sink per channel on the default output device.
pub struct RodioDeck {
    // Dropping the stream silences every sink.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    audio_dir: PathBuf,
    sinks: [Option<(Sink, TrackToken)>; 3],
    /// Tracks that could not be started; reported finished on the next poll.
    failed: Vec<(AudioChannel, TrackToken)>,
}

impl RodioDeck {
    pub fn open(audio_dir: &Path) -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("failed to open default audio output")?;
        log_debug("audio output stream opened");
        Ok(Self {
            _stream: stream,
            handle,
            audio_dir: audio_dir.to_path_buf(),
            sinks: [None, None, None],
            failed: Vec::new(),
        })
    }

    fn start(&self, media: &str) -> Result<Sink> {
        let path = media_path(&self.audio_dir, media);
        let file =
            File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("failed to decode {}", path.display()))?;
        let sink = Sink::try_new(&self.handle).context("failed to create sink")?;
        sink.append(source);
        Ok(sink)
    }
}

impl AudioDeck for RodioDeck {
    fn play(&mut self, channel: AudioChannel, media: &str, token: TrackToken, _now: Instant) {
        self.stop(channel);
        match self.start(media) {
            Ok(sink) => self.sinks[channel.slot()] = Some((sink, token)),
            Err(err) => {
                // Report it as finished so the call does not stall on a missing file.
                log_debug(&format!("{} channel: {err:#}", channel.label()));
                self.failed.push((channel, token));
            }
        }
    }

    fn stop(&mut self, channel: AudioChannel) {
        if let Some((sink, _)) = self.sinks[channel.slot()].take() {
            sink.stop();
        }
        self.failed.retain(|(failed, _)| *failed != channel);
    }

    fn poll_finished(&mut self, _now: Instant) -> Vec<(AudioChannel, TrackToken)> {
        let mut finished = std::mem::take(&mut self.failed);
        for channel in AudioChannel::ALL {
            let slot = &mut self.sinks[channel.slot()];
            if slot.as_ref().is_some_and(|(sink, _)| sink.empty()) {
                if let Some((_, token)) = slot.take() {
                    finished.push((channel, token));
                }
            }
        }
        finished
    }
}
