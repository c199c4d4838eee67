//! Per-tile reveal/match state machine.
//!
//! ```text
//! Hidden --request_reveal--> Flipping --finish_flip--> Revealed
//! Revealed --mark_matched--> Matched (terminal)
//! Revealed --begin_conceal--> Flipping --finish_flip--> Hidden
//! ```
//!
//! Every other request is a no-op that reports [`Transition::NoChange`].

use serde::{Deserialize, Serialize};

use crate::id::SymbolId;

/// Lifecycle state of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Hidden,
    Flipping,
    Revealed,
    Matched,
}

impl TileState {
    /// Whether a snapshot may capture this state.
    pub const fn is_persistable(self) -> bool {
        matches!(self, Self::Hidden | Self::Matched)
    }

    pub const fn is_matched(self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// Result of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NoChange,
    Changed,
}

impl Transition {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Which face the tile shows once the current flip completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flip {
    FaceUp,
    FaceDown,
}

/// A single cell of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    position: u16,
    symbol: SymbolId,
    state: TileState,
    flip: Option<Flip>,
}

impl Tile {
    /// A fresh, face-down tile.
    pub fn new(position: u16, symbol: SymbolId) -> Self {
        Self {
            position,
            symbol,
            state: TileState::Hidden,
            flip: None,
        }
    }

    /// A tile restored in a persisted state. Transient states are coerced to
    /// Hidden; callers validate before restoring.
    pub(crate) fn restored(position: u16, symbol: SymbolId, state: TileState) -> Self {
        let state = if state.is_persistable() {
            state
        } else {
            TileState::Hidden
        };
        Self {
            position,
            symbol,
            state,
            flip: None,
        }
    }

    pub fn position(&self) -> u16 {
        self.position
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn is_matched(&self) -> bool {
        self.state.is_matched()
    }

    /// Whether a reveal request would be accepted.
    pub fn can_reveal(&self, accepting_input: bool) -> bool {
        accepting_input && self.state == TileState::Hidden
    }

    /// Hidden -> Flipping (face up). Rejected requests are silent.
    pub fn request_reveal(&mut self, accepting_input: bool) -> Transition {
        if !self.can_reveal(accepting_input) {
            return Transition::NoChange;
        }
        self.state = TileState::Flipping;
        self.flip = Some(Flip::FaceUp);
        Transition::Changed
    }

    /// Completes the flip in progress: Revealed after a reveal, Hidden after
    /// a flip-back. Returns the state reached, or `None` if no flip was in
    /// progress.
    pub fn finish_flip(&mut self) -> Option<TileState> {
        if self.state != TileState::Flipping {
            return None;
        }
        self.state = match self.flip.take()? {
            Flip::FaceUp => TileState::Revealed,
            Flip::FaceDown => TileState::Hidden,
        };
        Some(self.state)
    }

    /// Revealed -> Matched.
    pub fn mark_matched(&mut self) -> Transition {
        if self.state != TileState::Revealed {
            return Transition::NoChange;
        }
        self.state = TileState::Matched;
        Transition::Changed
    }

    /// Revealed -> Flipping (face down).
    pub fn begin_conceal(&mut self) -> Transition {
        if self.state != TileState::Revealed {
            return Transition::NoChange;
        }
        self.state = TileState::Flipping;
        self.flip = Some(Flip::FaceDown);
        Transition::Changed
    }
}
