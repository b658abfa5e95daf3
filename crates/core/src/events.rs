//! Events module - synchronous observer dispatch
//!
//! Every observable change in a game (queue, stats, cleared lines, timer
//! restarts, game over) is published as a [`GameEvent`]. Listeners are plain
//! closures registered on an [`EventBus`] and called synchronously, in
//! registration order, from inside the mutating operation.

use std::fmt;

use serde::Serialize;

use crate::pieces::Piece;
use crate::snapshot::GameSnapshot;
use crate::types::Coord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// The lookahead queue advanced or its empty slot was filled
    NextPiece {
        current: Option<Piece>,
        following: Option<Piece>,
    },
    PieceRotated {
        current: Piece,
    },
    PiecesSwapped {
        current: Option<Piece>,
        following: Option<Piece>,
    },
    /// Full lines were removed; `blocks` is row-major
    LineCleared {
        lines: u32,
        blocks: Vec<Coord>,
        points: u32,
    },
    ScoreChanged {
        score: u32,
    },
    LevelChanged {
        from: u32,
        to: u32,
    },
    LivesChanged {
        lives: u32,
    },
    MultiplierChanged {
        multiplier: u32,
    },
    /// The life-loss countdown was (re)started
    GameLoop {
        delay_ms: u64,
    },
    GameOver {
        snapshot: GameSnapshot,
    },
}

/// Boxed listener callback
pub type Listener = Box<dyn FnMut(&GameEvent) + Send>;

/// Registered listeners of one game
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: GameEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_listeners_called_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| {
                if let GameEvent::ScoreChanged { score } = event {
                    seen.lock().unwrap().push((tag, *score));
                }
            });
        }
        assert_eq!(bus.len(), 2);

        bus.emit(GameEvent::ScoreChanged { score: 40 });
        assert_eq!(*seen.lock().unwrap(), vec![("first", 40), ("second", 40)]);
    }
}
