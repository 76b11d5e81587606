//! Sound effects for game cues

use crate::game::{Cue, CueSink};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Sound file played for a cue
fn filename(cue: Cue) -> &'static str {
    match cue {
        Cue::Lock => "drop.wav",
        Cue::LineClear => "clear.wav",
        Cue::Pause | Cue::Resume => "pause.wav",
        Cue::GameOver => "gameover.wav",
        Cue::HighScore => "hiscore.wav",
    }
}

/// Audio manager handles sound effect playback
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sounds_path: PathBuf,
    sfx_volume: f32,
}

impl AudioManager {
    /// Open the default output device. None when there is no device or no
    /// sounds directory.
    pub fn new() -> Option<Self> {
        let (stream, stream_handle) = OutputStream::try_default().ok()?;
        let sounds_path = Self::find_sounds_path()?;
        tracing::debug!("Loading sounds from {}", sounds_path.display());

        Some(Self {
            _stream: stream,
            stream_handle,
            sounds_path,
            sfx_volume: 0.5,
        })
    }

    fn find_sounds_path() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("sounds"),
            PathBuf::from("assets/sounds"),
            std::env::current_exe().ok()?.parent()?.join("sounds"),
        ];

        paths.into_iter().find(|p| p.is_dir())
    }

    /// Set SFX volume (0.0 to 1.0)
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    /// Play the sound for a cue without blocking
    pub fn play(&self, cue: Cue) {
        if self.sfx_volume <= 0.0 {
            return;
        }

        let path = self.sounds_path.join(filename(cue));
        let Ok(file) = File::open(&path) else {
            tracing::warn!("Missing sound {}", path.display());
            return;
        };
        let Ok(decoder) = Decoder::new(BufReader::new(file)) else {
            tracing::warn!("Could not decode {}", path.display());
            return;
        };
        let Ok(sink) = Sink::try_new(&self.stream_handle) else {
            return;
        };

        sink.set_volume(self.sfx_volume);
        sink.append(decoder);
        sink.detach();
    }
}

impl CueSink for AudioManager {
    fn cue(&mut self, cue: Cue) {
        self.play(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_and_resume_share_a_sound() {
        assert_eq!(filename(Cue::Pause), filename(Cue::Resume));
    }

    #[test]
    fn test_every_cue_has_a_wav() {
        for cue in [
            Cue::Lock,
            Cue::LineClear,
            Cue::Pause,
            Cue::Resume,
            Cue::GameOver,
            Cue::HighScore,
        ] {
            assert!(filename(cue).ends_with(".wav"));
        }
    }
}
