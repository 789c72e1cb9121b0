/// Players tab: list → player → hand/note
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlayersView {
    #[default]
    List,
    Player { player_id: String },
    HandNote {
        player_id: String,
        hand_id: String,
        note_id: String,
    },
}

impl PlayersView {
    /// Open a player's hands, dropping any selected hand/note
    pub fn select_player(&mut self, player_id: impl Into<String>) {
        *self = PlayersView::Player {
            player_id: player_id.into(),
        };
    }

    /// Open a hand/note of the current player. Ignored from the list.
    pub fn select_hand_note(&mut self, hand_id: impl Into<String>, note_id: impl Into<String>) {
        if let Some(player_id) = self.player_id().map(str::to_owned) {
            *self = PlayersView::HandNote {
                player_id,
                hand_id: hand_id.into(),
                note_id: note_id.into(),
            };
        }
    }

    /// One level up; the list stays the list
    pub fn back(&mut self) {
        *self = match std::mem::take(self) {
            PlayersView::HandNote { player_id, .. } => PlayersView::Player { player_id },
            PlayersView::Player { .. } | PlayersView::List => PlayersView::List,
        };
    }

    pub fn player_id(&self) -> Option<&str> {
        match self {
            PlayersView::List => None,
            PlayersView::Player { player_id } | PlayersView::HandNote { player_id, .. } => {
                Some(player_id)
            }
        }
    }
}

/// Logs tab: transcript list → transcript detail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogsView {
    #[default]
    List,
    Transcript { transcript_id: String },
}

impl LogsView {
    pub fn open(&mut self, transcript_id: impl Into<String>) {
        *self = LogsView::Transcript {
            transcript_id: transcript_id.into(),
        };
    }

    pub fn back(&mut self) {
        *self = LogsView::List;
    }
}
