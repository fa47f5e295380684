//! Background music toggle.
//!
//! [`PlaybackToggle`] is the single owner of the play/pause state; the
//! sink only performs the transition and may refuse to start.

use std::path::PathBuf;

use crate::error::AudioError;

pub const PLAYING_GLYPH: &str = "⏸";
pub const PAUSED_GLYPH: &str = "▶";

pub trait AudioSink {
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);

    /// True once the track has run to its end since the last `play`.
    fn finished(&mut self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

pub struct PlaybackToggle<S: AudioSink> {
    sink: S,
    state: PlaybackState,
}

impl<S: AudioSink> PlaybackToggle<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: PlaybackState::Paused,
        }
    }

    /// Flips between playing and paused. A refused `play` leaves the state
    /// paused and hands the error back.
    pub fn toggle(&mut self) -> Result<PlaybackState, AudioError> {
        match self.state {
            PlaybackState::Paused => {
                self.sink.play()?;
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Playing => {
                self.sink.pause();
                self.state = PlaybackState::Paused;
            }
        }
        Ok(self.state)
    }

    /// The track finished on its own.
    pub fn on_ended(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Called once per frame; picks up a track that ended by itself.
    pub fn poll(&mut self) {
        if self.is_playing() && self.sink.finished() {
            tracing::debug!("music ended");
            self.on_ended();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn glyph(&self) -> &'static str {
        match self.state {
            PlaybackState::Playing => PLAYING_GLYPH,
            PlaybackState::Paused => PAUSED_GLYPH,
        }
    }
}

/// Sink without an output device. It accepts `play` only when a track is
/// configured and present on disk, then just logs the transitions.
#[derive(Debug, Default)]
pub struct DetachedSink {
    track: Option<PathBuf>,
}

impl DetachedSink {
    pub fn new(track: Option<PathBuf>) -> Self {
        Self { track }
    }
}

impl AudioSink for DetachedSink {
    fn play(&mut self) -> Result<(), AudioError> {
        let track = self.track.as_ref().ok_or(AudioError::NoDevice)?;
        if !track.is_file() {
            return Err(AudioError::Blocked(format!(
                "{} is not a readable file",
                track.display()
            )));
        }
        tracing::info!(track = %track.display(), "music playing");
        Ok(())
    }

    fn pause(&mut self) {
        tracing::info!("music paused");
    }
}
