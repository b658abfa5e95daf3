//! Multiplayer session - our game plus what we know about the other players
//!
//! The session is what the engine drives in networked play. It asks for the
//! leaderboard on start, tracks the other players' boards and scores from
//! server messages, and tells the server once when we are out.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use gridlock_core::{GameEvent, GameSnapshot, Grid, GridError, TimerRequest};
use gridlock_engine::Playable;
use gridlock_types::Cell;

use crate::communicator::Communicator;
use crate::multiplayer::MultiplayerGame;
use crate::protocol::{InboundMessage, OutboundMessage};

/// Scores of every player, best first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<(String, u32)>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one player's score
    pub fn update(&mut self, name: &str, score: u32) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((name.to_string(), score)),
        }
        self.sort();
    }

    /// Replace the whole table with a fresh server listing
    pub fn replace(&mut self, entries: Vec<(String, u32)>) {
        self.entries.clear();
        for (name, score) in entries {
            self.update(&name, score);
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)));
    }
}

/// Latest known board of each other player
#[derive(Debug, Clone)]
pub struct PlayerBoards {
    cols: usize,
    rows: usize,
    boards: BTreeMap<String, Grid>,
}

impl PlayerBoards {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            boards: BTreeMap::new(),
        }
    }

    /// Store `name`'s board from row-major values
    pub fn apply(&mut self, name: &str, values: Vec<u32>) -> Result<&Grid, GridError> {
        let grid = Grid::from_values(self.cols, self.rows, values)?;
        let slot = match self.boards.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(grid);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(grid),
        };
        Ok(slot)
    }

    pub fn get(&self, name: &str) -> Option<&Grid> {
        self.boards.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Grid> {
        self.boards.remove(name)
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.boards.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

/// Things the session learned about other players
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    LeaderboardChanged { entries: Vec<(String, u32)> },
    BoardUpdated { player: String, cells: Vec<Cell> },
    PlayerDied { player: String },
    Chat { from: String, text: String },
}

pub type SessionListener = Box<dyn FnMut(&SessionEvent) + Send>;

/// Networked game driven by the engine
pub struct MultiplayerSession<C> {
    game: MultiplayerGame<C>,
    player: String,
    leaderboard: Leaderboard,
    boards: PlayerBoards,
    listeners: Vec<SessionListener>,
    announced_death: bool,
}

impl<C: Communicator> MultiplayerSession<C> {
    pub fn new(game: MultiplayerGame<C>, player: impl Into<String>) -> Self {
        let grid = game.game().grid();
        let boards = PlayerBoards::new(grid.cols(), grid.rows());
        Self {
            game,
            player: player.into(),
            leaderboard: Leaderboard::new(),
            boards,
            listeners: Vec::new(),
            announced_death: false,
        }
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn game(&self) -> &MultiplayerGame<C> {
        &self.game
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn boards(&self) -> &PlayerBoards {
        &self.boards
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Listen to our own game's events
    pub fn subscribe_game<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.game.subscribe(listener);
    }

    /// Send a chat line to the other players
    pub fn chat(&self, text: &str) {
        self.game.send(&OutboundMessage::Msg(text.to_string()));
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn announce_death(&mut self) {
        if self.announced_death || !self.game.game().game_over() {
            return;
        }
        self.announced_death = true;
        log::info!("{} is out with {} points", self.player, self.game.game().score());
        self.game.send(&OutboundMessage::Die);
    }

    fn handle_board(&mut self, player: String, values: Vec<u32>) {
        if player == self.player {
            return;
        }
        match self.boards.apply(&player, values) {
            Ok(grid) => {
                let cells = grid.cells().to_vec();
                self.emit(SessionEvent::BoardUpdated { player, cells });
            }
            Err(err) => log::warn!("dropping board from {}: {}", player, err),
        }
    }
}

impl<C> fmt::Debug for MultiplayerSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiplayerSession")
            .field("player", &self.player)
            .field("leaderboard", &self.leaderboard)
            .field("boards", &self.boards.len())
            .field("announced_death", &self.announced_death)
            .finish()
    }
}

impl<C: Communicator> Playable for MultiplayerSession<C> {
    type Inbound = InboundMessage;

    fn start(&mut self) {
        self.game.send(&OutboundMessage::ScoresRequest);
        self.game.start();
    }

    fn block_clicked(&mut self, x: i32, y: i32) -> bool {
        self.game.block_clicked(x, y).is_placed()
    }

    fn rotate(&mut self, times: i32) {
        self.game.rotate(times);
    }

    fn swap(&mut self) {
        self.game.swap();
    }

    fn life_tick(&mut self) {
        self.game.life_tick();
        self.announce_death();
    }

    fn handle_inbound(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::Piece(id) => self.game.handle(&InboundMessage::Piece(id)),
            InboundMessage::Board { player, values } => self.handle_board(player, values),
            InboundMessage::Scores(entries) => {
                self.leaderboard.replace(entries);
                let entries = self.leaderboard.entries().to_vec();
                self.emit(SessionEvent::LeaderboardChanged { entries });
            }
            InboundMessage::Die(player) => {
                log::info!("{} is out", player);
                self.leaderboard.remove(&player);
                self.boards.remove(&player);
                self.emit(SessionEvent::PlayerDied { player });
            }
            InboundMessage::Chat { from, text } => {
                self.emit(SessionEvent::Chat { from, text });
            }
        }
    }

    fn prefetch_requests(&self) -> usize {
        self.game.prefetch_requests()
    }

    fn prefetch(&mut self) {
        self.game.prefetch();
    }

    fn take_timer_request(&mut self) -> Option<TimerRequest> {
        self.game.game_mut().take_timer_request()
    }

    fn stop(&mut self) {
        self.game.stop();
        self.announce_death();
    }

    fn snapshot(&self) -> GameSnapshot {
        self.game.game().snapshot()
    }

    fn is_over(&self) -> bool {
        self.game.game().game_over()
    }
}
