//! Game state module - manages the complete game state
//!
//! This module ties together the grid, the piece queue, the piece source and
//! scoring. It owns the `Ready -> Running -> GameOver` lifecycle and decides
//! when the life-loss countdown has to be restarted or cancelled.
//!
//! The game itself never sleeps or spawns anything: it records the timer
//! change it wants in a [`TimerRequest`], and whoever drives the game (see the
//! engine crate) applies it after each operation with
//! [`Game::take_timer_request`].

use std::time::Duration;

use crate::events::{EventBus, GameEvent};
use crate::grid::Grid;
use crate::pieces::Piece;
use crate::rng::{PieceSource, RandomSource};
use crate::scoring::{level_for_score, line_clear_points, timer_delay, timer_delay_ms};
use crate::snapshot::GameSnapshot;
use crate::types::*;

/// Change to the life-loss countdown requested by the last operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    /// Cancel any pending tick and schedule one after this delay
    Schedule(Duration),
    /// Cancel any pending tick
    Cancel,
}

/// Result of one line-clear pass that removed at least one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    pub lines: u32,
    pub blocks: Vec<Coord>,
    pub points: u32,
}

/// Outcome of [`Game::block_clicked`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The game is not running
    Ignored,
    /// The current piece does not fit there
    Rejected,
    /// The piece was placed; carries the line clear it caused, if any
    Placed(Option<LineClear>),
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed(_))
    }
}

/// Complete game state
#[derive(Debug)]
pub struct Game<S = RandomSource> {
    grid: Grid,
    current: Option<Piece>,
    following: Option<Piece>,
    source: S,
    phase: Phase,
    score: u32,
    level: u32,
    lives: u32,
    multiplier: u32,
    timer_request: Option<TimerRequest>,
    events: EventBus,
}

impl Game<RandomSource> {
    /// Create a local game drawing random pieces from `seed`
    pub fn local(cols: usize, rows: usize, seed: u32) -> Self {
        Self::new(cols, rows, RandomSource::new(seed))
    }
}

impl<S: PieceSource> Game<S> {
    pub fn new(cols: usize, rows: usize, source: S) -> Self {
        Self {
            grid: Grid::new(cols, rows),
            current: None,
            following: None,
            source,
            phase: Phase::Ready,
            score: 0,
            level: 0,
            lives: START_LIVES,
            multiplier: BASE_MULTIPLIER,
            timer_request: None,
            events: EventBus::new(),
        }
    }

    /// Register a listener for every event this game emits
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.events.subscribe(listener);
    }

    /// Start the game: fill the queue and start the countdown
    pub fn start(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        log::info!(
            "starting game on a {}x{} grid",
            self.grid.cols(),
            self.grid.rows()
        );
        self.phase = Phase::Running;
        if self.source.seeds_on_start() {
            self.following = self.source.draw();
            self.advance();
        }
        self.restart_countdown();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn current(&self) -> Option<Piece> {
        self.current
    }

    pub fn following(&self) -> Option<Piece> {
        self.following
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access, for setting up positions
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Countdown length at the current level
    pub fn timer_delay(&self) -> Duration {
        timer_delay(self.level)
    }

    /// Take the timer change requested since the last call
    pub fn take_timer_request(&mut self) -> Option<TimerRequest> {
        self.timer_request.take()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            cells: self.grid.cells().to_vec(),
            current: self.current.map(Into::into),
            following: self.following.map(Into::into),
            phase: self.phase,
            score: self.score,
            level: self.level,
            lives: self.lives,
            multiplier: self.multiplier,
        }
    }

    /// Handle a click on grid cell `(x, y)` with the current piece.
    ///
    /// The piece is centred on the clicked cell. A successful placement
    /// restarts the countdown, advances the queue and runs line clearing. A
    /// rejected one only resets the multiplier.
    pub fn block_clicked(&mut self, x: i32, y: i32) -> Placement {
        if self.phase != Phase::Running {
            return Placement::Ignored;
        }

        let Some(piece) = self.current else {
            self.update_multiplier(BASE_MULTIPLIER);
            return Placement::Rejected;
        };

        if !self.grid.can_place(&piece, x.saturating_sub(1), y.saturating_sub(1)) {
            log::debug!("{:?} does not fit at ({}, {})", piece.kind(), x, y);
            self.update_multiplier(BASE_MULTIPLIER);
            return Placement::Rejected;
        }

        self.grid.place(&piece, x, y);
        self.advance();
        let cleared = self.clear_full_lines();
        self.restart_countdown();

        Placement::Placed(cleared)
    }

    /// Turn the current piece clockwise `times` quarter turns
    pub fn rotate(&mut self, times: i32) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };
        let rotated = piece.rotated(times);
        self.current = Some(rotated);
        self.events
            .emit(GameEvent::PieceRotated { current: rotated });
        true
    }

    /// Exchange the current and following pieces
    pub fn swap(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        std::mem::swap(&mut self.current, &mut self.following);
        self.events.emit(GameEvent::PiecesSwapped {
            current: self.current,
            following: self.following,
        });
        true
    }

    /// One expiry of the life-loss countdown.
    ///
    /// With lives left, costs a life, resets the multiplier, skips to the
    /// next piece and restarts the countdown. A tick that finds no lives
    /// left ends the game.
    pub fn life_tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        if self.lives == 0 {
            self.end();
            return;
        }

        self.lives -= 1;
        log::info!("life lost, {} remaining", self.lives);
        self.events
            .emit(GameEvent::LivesChanged { lives: self.lives });
        self.update_multiplier(BASE_MULTIPLIER);
        self.advance();
        self.restart_countdown();
    }

    /// Hand an externally delivered piece to the queue.
    ///
    /// Fills `current` first (silently), then `following` (with a
    /// `NextPiece` event). When both are taken the piece is handed back.
    pub fn offer_piece(&mut self, piece: Piece) -> Result<(), Piece> {
        if self.current.is_none() {
            self.current = Some(piece);
            Ok(())
        } else if self.following.is_none() {
            self.following = Some(piece);
            self.emit_next_piece();
            Ok(())
        } else {
            Err(piece)
        }
    }

    /// Stop the countdown for good; later ticks are ignored
    pub fn stop(&mut self) {
        self.timer_request = Some(TimerRequest::Cancel);
        if self.phase == Phase::Running {
            self.end();
        }
    }

    fn end(&mut self) {
        self.phase = Phase::GameOver;
        self.timer_request = Some(TimerRequest::Cancel);
        log::info!("game over with score {}", self.score);
        let snapshot = self.snapshot();
        self.events.emit(GameEvent::GameOver { snapshot });
    }

    /// Shift `following` into `current` and draw a replacement
    fn advance(&mut self) {
        self.current = self.following.take();
        self.following = self.source.draw();
        self.emit_next_piece();
    }

    fn emit_next_piece(&mut self) {
        self.events.emit(GameEvent::NextPiece {
            current: self.current,
            following: self.following,
        });
    }

    fn restart_countdown(&mut self) {
        self.timer_request = Some(TimerRequest::Schedule(self.timer_delay()));
        self.events.emit(GameEvent::GameLoop {
            delay_ms: timer_delay_ms(self.level),
        });
    }

    /// Remove every full row and column and score them
    fn clear_full_lines(&mut self) -> Option<LineClear> {
        let scan = self.grid.scan_full_lines();
        if scan.is_empty() {
            self.update_multiplier(BASE_MULTIPLIER);
            return None;
        }

        let lines = scan.lines() as u32;
        let blocks: Vec<Coord> = scan.blocks.iter().copied().collect();
        self.grid.clear(&blocks);

        let points = self.add_score(lines, blocks.len() as u32);
        self.update_multiplier(self.multiplier.saturating_add(1));
        log::debug!("cleared {} lines ({} blocks) for {}", lines, blocks.len(), points);

        self.events.emit(GameEvent::LineCleared {
            lines,
            blocks: blocks.clone(),
            points,
        });

        Some(LineClear {
            lines,
            blocks,
            points,
        })
    }

    /// Add points for a clear at the current multiplier and update the level
    fn add_score(&mut self, lines: u32, blocks: u32) -> u32 {
        let points = line_clear_points(lines, blocks, self.multiplier);
        if points == 0 {
            return 0;
        }
        self.score = self.score.saturating_add(points);
        self.events
            .emit(GameEvent::ScoreChanged { score: self.score });

        let level = level_for_score(self.score);
        if level != self.level {
            let from = self.level;
            self.level = level;
            log::info!("level {} -> {}", from, level);
            self.events.emit(GameEvent::LevelChanged { from, to: level });
        }
        points
    }

    fn update_multiplier(&mut self, multiplier: u32) {
        if self.multiplier != multiplier {
            self.multiplier = multiplier;
            self.events
                .emit(GameEvent::MultiplierChanged { multiplier });
        }
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
        self.level = level_for_score(score);
    }

    #[cfg(test)]
    pub(crate) fn set_multiplier(&mut self, multiplier: u32) {
        self.multiplier = multiplier.max(BASE_MULTIPLIER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;
    use std::sync::{Arc, Mutex};

    fn recorded<S: PieceSource>(game: &mut Game<S>) -> Arc<Mutex<Vec<GameEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        game.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    fn scripted(kinds: &[PieceKind]) -> Game<ScriptedSource> {
        Game::new(5, 5, ScriptedSource::new(kinds.iter().copied()))
    }

    #[test]
    fn test_new_game_state() {
        let game = Game::local(5, 5, 12345);

        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 0);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.multiplier(), 1);
        assert!(game.current().is_none());
        assert!(game.following().is_none());
    }

    #[test]
    fn test_game_start() {
        let mut game = scripted(&[PieceKind::Dot, PieceKind::Line, PieceKind::Plus]);
        let events = recorded(&mut game);

        game.start();
        assert!(game.is_running());
        assert_eq!(game.current().map(|p| p.kind()), Some(PieceKind::Dot));
        assert_eq!(game.following().map(|p| p.kind()), Some(PieceKind::Line));
        assert_eq!(
            game.take_timer_request(),
            Some(TimerRequest::Schedule(Duration::from_millis(12_000)))
        );

        let events = events.lock().unwrap();
        assert!(matches!(events[0], GameEvent::NextPiece { .. }));
        assert_eq!(events[1], GameEvent::GameLoop { delay_ms: 12_000 });
    }

    #[test]
    fn test_start_only_once() {
        let mut game = scripted(&[PieceKind::Dot, PieceKind::Line, PieceKind::Plus]);
        game.start();
        game.take_timer_request();
        game.start();
        assert_eq!(game.take_timer_request(), None);
        assert_eq!(game.source().remaining(), 1);
    }

    #[test]
    fn test_actions_ignored_before_start() {
        let mut game = Game::local(5, 5, 1);
        assert_eq!(game.block_clicked(2, 2), Placement::Ignored);
        assert!(!game.rotate(1));
        assert!(!game.swap());
        game.life_tick();
        assert_eq!(game.lives(), 3);
    }

    #[test]
    fn test_successful_placement() {
        let mut game = scripted(&[PieceKind::Dot, PieceKind::Line, PieceKind::Plus]);
        game.start();
        game.take_timer_request();

        let outcome = game.block_clicked(2, 2);
        assert_eq!(outcome, Placement::Placed(None));
        assert_eq!(game.grid().cell(2, 2), PieceKind::Dot.color());
        assert_eq!(game.current().map(|p| p.kind()), Some(PieceKind::Line));
        assert_eq!(game.following().map(|p| p.kind()), Some(PieceKind::Plus));
        assert!(matches!(
            game.take_timer_request(),
            Some(TimerRequest::Schedule(_))
        ));
    }

    #[test]
    fn test_failed_placement_only_resets_multiplier() {
        let mut game = scripted(&[PieceKind::Plus, PieceKind::Line, PieceKind::Dot]);
        game.start();
        game.take_timer_request();
        game.set_score(420);
        game.set_multiplier(4);

        // Plus centred on a corner hangs off the grid.
        let outcome = game.block_clicked(0, 0);
        assert_eq!(outcome, Placement::Rejected);
        assert_eq!(game.multiplier(), 1);
        assert_eq!(game.score(), 420);
        assert_eq!(game.level(), 0);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.grid().filled_count(), 0);
        assert_eq!(game.current().map(|p| p.kind()), Some(PieceKind::Plus));
        assert_eq!(game.take_timer_request(), None);
    }

    #[test]
    fn test_row_completed_by_click() {
        let mut game = scripted(&[PieceKind::Dot, PieceKind::Line, PieceKind::Plus]);
        for x in [0, 1, 3, 4] {
            game.grid_mut().set(x, 2, 9);
        }
        game.grid_mut().set(0, 0, 4);
        game.start();
        let events = recorded(&mut game);

        let outcome = game.block_clicked(2, 2);
        let Placement::Placed(Some(clear)) = outcome else {
            panic!("expected a line clear, got {:?}", outcome);
        };
        assert_eq!(clear.lines, 1);
        assert_eq!(clear.blocks.len(), 5);
        assert_eq!(clear.points, 10 * 5);

        assert!((0..5).all(|x| game.grid().cell(x, 2) == EMPTY));
        assert_eq!(game.grid().cell(0, 0), 4);
        assert_eq!(game.score(), 50);
        assert_eq!(game.multiplier(), 2);

        let events = events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::LineCleared { lines: 1, .. })));
        assert!(events.contains(&GameEvent::ScoreChanged { score: 50 }));
    }

    #[test]
    fn test_no_clear_resets_multiplier() {
        let mut game = scripted(&[PieceKind::Dot, PieceKind::Dot, PieceKind::Dot]);
        game.start();
        game.set_multiplier(3);
        assert_eq!(game.block_clicked(1, 1), Placement::Placed(None));
        assert_eq!(game.multiplier(), 1);
    }

    #[test]
    fn test_score_uses_multiplier_and_bumps_it() {
        let mut game = Game::local(5, 5, 1);
        game.set_multiplier(2);
        let points = game.add_score(1, 5);
        assert_eq!(points, 100);
        assert_eq!(game.score(), 100);
    }

    #[test]
    fn test_level_change_fires_once() {
        let mut game = Game::local(5, 5, 1);
        game.set_score(950);
        let events = recorded(&mut game);

        game.add_score(1, 10);
        assert_eq!(game.score(), 1050);
        assert_eq!(game.level(), 1);

        let level_events: Vec<_> = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelChanged { .. }))
            .cloned()
            .collect();
        assert_eq!(level_events, vec![GameEvent::LevelChanged { from: 0, to: 1 }]);
    }

    #[test]
    fn test_level_shortens_countdown() {
        let mut game = scripted(&[PieceKind::Dot; 4]);
        game.start();
        game.set_score(3000);
        game.life_tick();
        assert_eq!(
            game.take_timer_request(),
            Some(TimerRequest::Schedule(Duration::from_millis(10_500)))
        );
    }

    #[test]
    fn test_life_tick_costs_life_and_advances() {
        let mut game = scripted(&[PieceKind::Dot, PieceKind::Line, PieceKind::Plus]);
        game.start();
        game.set_multiplier(5);

        game.life_tick();
        assert_eq!(game.lives(), 2);
        assert_eq!(game.multiplier(), 1);
        assert_eq!(game.current().map(|p| p.kind()), Some(PieceKind::Line));
        assert_eq!(game.following().map(|p| p.kind()), Some(PieceKind::Plus));
    }

    #[test]
    fn test_fourth_tick_ends_game() {
        let mut game = Game::local(5, 5, 3);
        game.start();
        let events = recorded(&mut game);

        for expected in [2, 1, 0] {
            game.life_tick();
            assert_eq!(game.lives(), expected);
            assert!(game.is_running());
        }

        game.life_tick();
        assert!(game.game_over());
        assert_eq!(game.lives(), 0);
        assert_eq!(game.take_timer_request(), Some(TimerRequest::Cancel));

        let over = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(over, 1);

        // Terminal: nothing moves any more.
        game.life_tick();
        assert_eq!(game.block_clicked(2, 2), Placement::Ignored);
        game.start();
        assert!(game.game_over());
    }

    #[test]
    fn test_rotate_and_swap() {
        let mut game = scripted(&[PieceKind::Line, PieceKind::Dot, PieceKind::Plus]);
        game.start();
        let line = game.current().unwrap();

        assert!(game.rotate(1));
        assert_eq!(game.current(), Some(line.rotated(1)));
        assert!(game.rotate(3));
        assert_eq!(game.current(), Some(line));

        assert!(game.swap());
        assert_eq!(game.current().map(|p| p.kind()), Some(PieceKind::Dot));
        assert_eq!(game.following(), Some(line));
        assert_eq!(game.grid().filled_count(), 0);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_offer_piece_fills_slots_in_order() {
        let mut game = scripted(&[]);
        let events = recorded(&mut game);

        assert_eq!(game.offer_piece(Piece::new(PieceKind::Dot)), Ok(()));
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(game.offer_piece(Piece::new(PieceKind::Line)), Ok(()));
        assert_eq!(events.lock().unwrap().len(), 1);

        let third = Piece::new(PieceKind::Plus);
        assert_eq!(game.offer_piece(third), Err(third));
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_crossing_clear_counts_both_lines() {
        let mut game = scripted(&[PieceKind::Dot, PieceKind::Dot, PieceKind::Dot]);
        for i in 0..5 {
            if i != 2 {
                game.grid_mut().set(i, 2, 1);
                game.grid_mut().set(2, i, 1);
            }
        }
        game.start();
        let outcome = game.block_clicked(2, 2);
        let Placement::Placed(Some(clear)) = outcome else {
            panic!("expected a line clear, got {:?}", outcome);
        };
        assert_eq!(clear.lines, 2);
        assert_eq!(clear.blocks.len(), 9);
        assert_eq!(game.score(), 2 * 9 * 10);
        assert_eq!(game.grid().filled_count(), 0);
    }

    #[test]
    fn test_extreme_click_coordinates_are_rejected() {
        let mut game = scripted(&[PieceKind::Plus, PieceKind::Dot, PieceKind::Dot]);
        game.start();

        for (x, y) in [
            (i32::MIN, 0),
            (0, i32::MIN),
            (i32::MAX, 2),
            (2, i32::MAX),
            (i32::MIN, i32::MAX),
        ] {
            assert_eq!(game.block_clicked(x, y), Placement::Rejected, "({}, {})", x, y);
        }
        assert_eq!(game.grid().filled_count(), 0);
        assert_eq!(game.current().map(|p| p.kind()), Some(PieceKind::Plus));
        assert!(game.is_running());
    }

    #[test]
    fn test_stop_cancels_countdown() {
        let mut game = Game::local(5, 5, 1);
        game.start();
        game.take_timer_request();
        game.stop();
        assert_eq!(game.take_timer_request(), Some(TimerRequest::Cancel));
        assert!(game.game_over());
    }
}
