// Pause while the tab is hidden, resume only if it was playing before.
// Never touches progress accounting.

/// What the host should do with the media after a visibility change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityAction {
    Pause,
    Resume,
    Nothing,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityPause {
    hidden: bool,
    was_playing: bool,
}

impl VisibilityPause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only a visible→hidden transition captures the playing state. A repeated hide
    /// reports the media as paused by us and must not overwrite it.
    pub fn on_change(&mut self, hidden: bool, playing: bool) -> VisibilityAction {
        if hidden == self.hidden {
            return VisibilityAction::Nothing;
        }
        self.hidden = hidden;
        if hidden {
            self.was_playing = playing;
            if playing {
                VisibilityAction::Pause
            } else {
                VisibilityAction::Nothing
            }
        } else if std::mem::take(&mut self.was_playing) {
            VisibilityAction::Resume
        } else {
            VisibilityAction::Nothing
        }
    }
}
