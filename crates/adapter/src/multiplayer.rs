//! Multiplayer game - a game whose pieces come from the server
//!
//! The server hands out pieces one `PIECE` request at a time. Every time the
//! game pulls a replacement piece it owes the server one request, whether or
//! not a piece was waiting. After each operation [`MultiplayerGame`] flushes
//! what the server needs to hear, in this order:
//!
//! 1. one `PIECE` per piece pulled since the last flush
//! 2. `SCORE n` if the score moved
//! 3. `BOARD ...` after a committed placement, once line clearing is done

use std::collections::VecDeque;

use gridlock_core::pieces::create;
use gridlock_core::rng::PieceSource;
use gridlock_core::{Game, GameEvent, Piece, Placement};
use gridlock_types::PREFETCH_REQUESTS;

use crate::communicator::Communicator;
use crate::protocol::{InboundMessage, OutboundMessage};

/// Pieces received from the server but not yet in the queue
#[derive(Debug, Clone, Default)]
pub struct PendingPieces {
    pieces: VecDeque<Piece>,
    requests: usize,
}

impl PendingPieces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, piece: Piece) {
        self.pieces.push_back(piece);
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Requests owed to the server since the last call
    pub fn take_requests(&mut self) -> usize {
        std::mem::take(&mut self.requests)
    }
}

impl PieceSource for PendingPieces {
    fn draw(&mut self) -> Option<Piece> {
        self.requests += 1;
        self.pieces.pop_front()
    }

    fn seeds_on_start(&self) -> bool {
        false
    }
}

/// Game kept in sync with the server through `C`
pub struct MultiplayerGame<C> {
    game: Game<PendingPieces>,
    comms: C,
    reported_score: u32,
}

impl<C: Communicator> MultiplayerGame<C> {
    pub fn new(cols: usize, rows: usize, comms: C) -> Self {
        Self {
            game: Game::new(cols, rows, PendingPieces::new()),
            comms,
            reported_score: 0,
        }
    }

    pub fn game(&self) -> &Game<PendingPieces> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game<PendingPieces> {
        &mut self.game
    }

    pub fn pending(&self) -> &PendingPieces {
        self.game.source()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.game.subscribe(listener);
    }

    pub fn send(&self, message: &OutboundMessage) {
        self.comms.send(&message.to_string());
    }

    pub fn start(&mut self) {
        self.game.start();
        self.flush(false);
    }

    /// A piece arrived from the server
    pub fn on_piece_received(&mut self, piece: Piece) {
        if let Err(piece) = self.game.offer_piece(piece) {
            self.game.source_mut().push(piece);
        }
    }

    /// Apply a server message addressed to the game; other messages are ignored
    pub fn handle(&mut self, message: &InboundMessage) {
        match message {
            InboundMessage::Piece(id) => match create(*id) {
                Some(piece) => self.on_piece_received(piece),
                None => log::warn!("ignoring unknown piece id {}", id),
            },
            other => log::debug!("not a game message: {:?}", other),
        }
    }

    pub fn block_clicked(&mut self, x: i32, y: i32) -> Placement {
        let placement = self.game.block_clicked(x, y);
        self.flush(placement.is_placed());
        placement
    }

    pub fn rotate(&mut self, times: i32) -> bool {
        self.game.rotate(times)
    }

    pub fn swap(&mut self) -> bool {
        self.game.swap()
    }

    pub fn life_tick(&mut self) {
        self.game.life_tick();
        self.flush(false);
    }

    pub fn prefetch_requests(&self) -> usize {
        PREFETCH_REQUESTS
    }

    /// Ask for one piece ahead of need
    pub fn prefetch(&mut self) {
        self.send(&OutboundMessage::PieceRequest);
    }

    pub fn stop(&mut self) {
        self.game.stop();
    }

    fn flush(&mut self, placed: bool) {
        for _ in 0..self.game.source_mut().take_requests() {
            self.send(&OutboundMessage::PieceRequest);
        }
        if self.game.score() != self.reported_score {
            self.reported_score = self.game.score();
            self.send(&OutboundMessage::Score(self.reported_score));
        }
        if placed {
            self.send(&OutboundMessage::board(self.game.grid()));
        }
    }
}
