//! Audio cues
//!
//! The simulation never plays sound. It records `GameEvent`s; the driver maps
//! them to fire-and-forget cues here and hands them to whatever backend it has.

use crate::sim::state::GameEvent;

/// Sound cue identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Weapon fired
    Shot,
    /// Something got hurt (enemy or player)
    Hit,
    /// Pickup collected or box opened
    Pickup,
    /// Enemy killed
    Death,
    Win,
    Lose,
}

impl AudioCue {
    /// Cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ShotFired { .. } => Some(AudioCue::Shot),
            GameEvent::EnemyHit { .. } | GameEvent::PlayerDamaged { .. } => Some(AudioCue::Hit),
            GameEvent::EnemyKilled { .. } => Some(AudioCue::Death),
            GameEvent::PickupCollected { .. } | GameEvent::BoxOpened { .. } => Some(AudioCue::Pickup),
            GameEvent::Won { .. } => Some(AudioCue::Win),
            GameEvent::Lost { .. } => Some(AudioCue::Lose),
            GameEvent::Started | GameEvent::Restarted => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::Shot => "shot",
            AudioCue::Hit => "hit",
            AudioCue::Pickup => "pickup",
            AudioCue::Death => "death",
            AudioCue::Win => "win",
            AudioCue::Lose => "lose",
        }
    }
}

/// Playback backend
pub trait CueSink {
    fn play(&mut self, cue: AudioCue, volume: f32);
}

/// Backend for headless runs: every cue becomes a log line
#[derive(Debug, Default)]
pub struct LogCueSink {
    pub played: u64,
}

impl CueSink for LogCueSink {
    fn play(&mut self, cue: AudioCue, volume: f32) {
        self.played += 1;
        log::debug!("cue {} (volume {volume:.2})", cue.as_str());
    }
}

/// Audio manager for the game
pub struct AudioManager<S: CueSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: CueSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, cue: AudioCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(cue, vol);
    }

    /// Play the cue for every event that has one, in order
    pub fn dispatch(&mut self, events: &[GameEvent]) {
        for cue in events.iter().filter_map(AudioCue::for_event) {
            self.play(cue);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ai::EnemyKind;
    use crate::sim::session::LoseReason;

    #[derive(Default)]
    struct Recorder(Vec<(AudioCue, f32)>);

    impl CueSink for Recorder {
        fn play(&mut self, cue: AudioCue, volume: f32) {
            self.0.push((cue, volume));
        }
    }

    #[test]
    fn test_events_map_to_cues_in_order() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_master_volume(1.0);
        audio.dispatch(&[
            GameEvent::Started,
            GameEvent::ShotFired { hit: Some(0) },
            GameEvent::EnemyHit { enemy: 0, damage: 34 },
            GameEvent::EnemyKilled {
                enemy: 0,
                kind: EnemyKind::Grunt,
            },
            GameEvent::Lost {
                reason: LoseReason::TimeOut,
            },
        ]);
        let cues: Vec<AudioCue> = audio.sink().0.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            cues,
            vec![AudioCue::Shot, AudioCue::Hit, AudioCue::Death, AudioCue::Lose]
        );
        assert!(audio.sink().0.iter().all(|(_, v)| *v == 1.0));
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_muted(true);
        audio.play(AudioCue::Win);
        assert!(audio.sink().0.is_empty());
    }

    #[test]
    fn test_volume_clamps() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_master_volume(3.0);
        audio.set_sfx_volume(0.5);
        audio.play(AudioCue::Pickup);
        assert_eq!(audio.sink().0, vec![(AudioCue::Pickup, 0.5)]);
    }
}
