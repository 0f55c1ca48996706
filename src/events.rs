//! Events emitted by the audio engine.

/// Notifications surfaced from the audio callback to game logic.
///
/// Events are delivered on a bounded channel drained via
/// [`AuricleEngine::poll_events`](crate::engine::AuricleEngine::poll_events);
/// if nobody polls, further notifications are dropped rather than letting
/// the queue grow on the real-time path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuricleEvent {
    /// A one-shot voice played to the end of its region and stopped.
    VoiceFinished { voice: usize },
    /// A looping voice wrapped around its loop region.
    VoiceLooped { voice: usize },
    EngineStarted,
    EngineStopped,
}

impl AuricleEvent {
    /// The voice slot this event concerns, if any.
    pub fn voice(&self) -> Option<usize> {
        match self {
            Self::VoiceFinished { voice } | Self::VoiceLooped { voice } => Some(*voice),
            _ => None,
        }
    }
}
