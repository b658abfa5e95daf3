//! Engine runtime.
//!
//! Bridges a synchronous game with its asynchronous surroundings. One tokio
//! task owns the game; callers, the network reader and the timers all reach
//! it through a single command channel, so every mutation happens on that
//! task and in receipt order.

use std::convert::Infallible;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use gridlock_core::{Game, GameSnapshot, PieceSource, TimerRequest};

use crate::config::EngineConfig;

/// A game the engine can drive
pub trait Playable: Send + 'static {
    /// Messages delivered from outside (e.g. parsed network lines)
    type Inbound: Send + 'static;

    fn start(&mut self);
    fn block_clicked(&mut self, x: i32, y: i32) -> bool;
    fn rotate(&mut self, times: i32);
    fn swap(&mut self);
    fn life_tick(&mut self);
    fn handle_inbound(&mut self, message: Self::Inbound);

    /// Number of piece requests to send, one per interval, after start
    fn prefetch_requests(&self) -> usize {
        0
    }

    fn prefetch(&mut self) {}

    fn take_timer_request(&mut self) -> Option<TimerRequest>;
    fn stop(&mut self);
    fn snapshot(&self) -> GameSnapshot;
    fn is_over(&self) -> bool;
}

impl<S: PieceSource + Send + 'static> Playable for Game<S> {
    type Inbound = Infallible;

    fn start(&mut self) {
        Game::start(self);
    }

    fn block_clicked(&mut self, x: i32, y: i32) -> bool {
        Game::block_clicked(self, x, y).is_placed()
    }

    fn rotate(&mut self, times: i32) {
        Game::rotate(self, times);
    }

    fn swap(&mut self) {
        Game::swap(self);
    }

    fn life_tick(&mut self) {
        Game::life_tick(self);
    }

    fn handle_inbound(&mut self, message: Infallible) {
        match message {}
    }

    fn take_timer_request(&mut self) -> Option<TimerRequest> {
        Game::take_timer_request(self)
    }

    fn stop(&mut self) {
        Game::stop(self);
    }

    fn snapshot(&self) -> GameSnapshot {
        Game::snapshot(self)
    }

    fn is_over(&self) -> bool {
        self.game_over()
    }
}

/// Command delivered to the engine task.
#[derive(Debug)]
pub enum EngineCommand<I> {
    BlockClicked { x: i32, y: i32 },
    Rotate(i32),
    Swap,
    Inbound(I),
    Snapshot(oneshot::Sender<GameSnapshot>),
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("engine task is no longer running")]
    Closed,
}

/// Sending side of a running engine.
#[derive(Debug)]
pub struct EngineHandle<I = Infallible> {
    tx: mpsc::UnboundedSender<EngineCommand<I>>,
}

impl<I> Clone for EngineHandle<I> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<I> EngineHandle<I> {
    fn send(&self, command: EngineCommand<I>) -> Result<(), EngineError> {
        self.tx.send(command).map_err(|_| EngineError::Closed)
    }

    pub fn block_clicked(&self, x: i32, y: i32) -> Result<(), EngineError> {
        self.send(EngineCommand::BlockClicked { x, y })
    }

    pub fn rotate(&self, times: i32) -> Result<(), EngineError> {
        self.send(EngineCommand::Rotate(times))
    }

    pub fn swap(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Swap)
    }

    /// Queue an inbound message behind everything sent so far
    pub fn deliver(&self, message: I) -> Result<(), EngineError> {
        self.send(EngineCommand::Inbound(message))
    }

    pub fn stop(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Stop)
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot(reply_tx))?;
        reply_rx.await.map_err(|_| EngineError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start `playable` on its own task.
///
/// Must be called from inside a tokio runtime. The join handle resolves to
/// the final snapshot once the engine is stopped or every handle is dropped.
pub fn spawn<P: Playable>(
    playable: P,
    config: &EngineConfig,
) -> (EngineHandle<P::Inbound>, JoinHandle<GameSnapshot>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let interval = config.prefetch_interval;
    let task = tokio::spawn(run(playable, rx, interval));
    (EngineHandle { tx }, task)
}

async fn run<P: Playable>(
    mut playable: P,
    mut rx: mpsc::UnboundedReceiver<EngineCommand<P::Inbound>>,
    interval: Duration,
) -> GameSnapshot {
    playable.start();
    let started = Instant::now();
    let mut deadline = None;
    apply_timer(&mut playable, &mut deadline);

    let prefetch_total = playable.prefetch_requests();
    let mut prefetch_sent = 0usize;
    let mut next_prefetch = (prefetch_total > 0).then(|| started + interval);
    log::debug!("engine started, {} piece requests scheduled", prefetch_total);

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                None | Some(EngineCommand::Stop) => break,
                Some(command) => apply_command(&mut playable, command),
            },
            _ = sleep_until(deadline) => {
                deadline = None;
                playable.life_tick();
            }
            _ = sleep_until(next_prefetch) => {
                playable.prefetch();
                prefetch_sent += 1;
                next_prefetch = (prefetch_sent < prefetch_total && !playable.is_over())
                    .then(|| started + interval * (prefetch_sent as u32 + 1));
            }
        }
        apply_timer(&mut playable, &mut deadline);
        if playable.is_over() {
            next_prefetch = None;
        }
    }

    playable.stop();
    let snapshot = playable.snapshot();
    log::info!("engine stopped with score {}", snapshot.score);
    snapshot
}

fn apply_command<P: Playable>(playable: &mut P, command: EngineCommand<P::Inbound>) {
    match command {
        EngineCommand::BlockClicked { x, y } => {
            playable.block_clicked(x, y);
        }
        EngineCommand::Rotate(times) => playable.rotate(times),
        EngineCommand::Swap => playable.swap(),
        EngineCommand::Inbound(message) => playable.handle_inbound(message),
        EngineCommand::Snapshot(reply) => {
            let _ = reply.send(playable.snapshot());
        }
        EngineCommand::Stop => {}
    }
}

fn apply_timer<P: Playable>(playable: &mut P, deadline: &mut Option<Instant>) {
    match playable.take_timer_request() {
        Some(TimerRequest::Schedule(delay)) => *deadline = Some(Instant::now() + delay),
        Some(TimerRequest::Cancel) => *deadline = None,
        None => {}
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_core::ScriptedSource;
    use gridlock_types::{Phase, PieceKind};
    use std::sync::{Arc, Mutex};

    fn dots(n: usize) -> Game<ScriptedSource> {
        Game::new(5, 5, ScriptedSource::new(std::iter::repeat(PieceKind::Dot).take(n)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_costs_a_life() {
        let (handle, _task) = spawn(Game::local(5, 5, 7), &EngineConfig::default());

        tokio::time::sleep(Duration::from_millis(11_900)).await;
        assert_eq!(handle.snapshot().await.unwrap().lives, 3);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(handle.snapshot().await.unwrap().lives, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_placement_restarts_countdown() {
        let (handle, _task) = spawn(dots(20), &EngineConfig::default());

        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.block_clicked(0, 0).unwrap();

        // The first deadline at 12s must not fire.
        tokio::time::sleep(Duration::from_secs(11)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.lives, 3);
        assert_eq!(snapshot.cell(0, 0), Some(PieceKind::Dot.color()));

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(handle.snapshot().await.unwrap().lives, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_after_fourth_tick() {
        let (handle, task) = spawn(Game::local(5, 5, 3), &EngineConfig::default());

        tokio::time::sleep(Duration::from_millis(4 * 12_000 + 100)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, Phase::GameOver);
        assert_eq!(snapshot.lives, 0);

        handle.stop().unwrap();
        let last = task.await.unwrap();
        assert!(last.game_over());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_engine_rejects_commands() {
        let (handle, task) = spawn(Game::local(5, 5, 1), &EngineConfig::default());
        handle.stop().unwrap();
        let snapshot = task.await.unwrap();
        assert_eq!(snapshot.phase, Phase::GameOver);

        assert_eq!(handle.swap(), Err(EngineError::Closed));
        assert_eq!(handle.snapshot().await, Err(EngineError::Closed));
        assert!(handle.is_closed());
    }

    #[derive(Default)]
    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
        started: Option<Instant>,
    }

    impl Playable for Recorder {
        type Inbound = u32;

        fn start(&mut self) {
            self.started = Some(Instant::now());
        }
        fn block_clicked(&mut self, _x: i32, _y: i32) -> bool {
            false
        }
        fn rotate(&mut self, _times: i32) {}
        fn swap(&mut self) {}
        fn life_tick(&mut self) {}
        fn handle_inbound(&mut self, message: u32) {
            self.log.lock().unwrap().push(format!("in {}", message));
        }
        fn prefetch_requests(&self) -> usize {
            5
        }
        fn prefetch(&mut self) {
            let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
            self.log
                .lock()
                .unwrap()
                .push(format!("prefetch {}", elapsed.as_secs()));
        }
        fn take_timer_request(&mut self) -> Option<TimerRequest> {
            None
        }
        fn stop(&mut self) {}
        fn snapshot(&self) -> GameSnapshot {
            Game::local(5, 5, 1).snapshot()
        }
        fn is_over(&self) -> bool {
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_cadence() {
        let recorder = Recorder::default();
        let log = Arc::clone(&recorder.log);
        let (handle, _task) = spawn(recorder, &EngineConfig::default());

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(log.lock().unwrap().len(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.snapshot().await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["prefetch 1", "prefetch 2", "prefetch 3", "prefetch 4", "prefetch 5"]
        );
    }

    #[tokio::test]
    async fn test_inbound_in_receipt_order() {
        let recorder = Recorder::default();
        let log = Arc::clone(&recorder.log);
        let config = EngineConfig {
            prefetch_interval: Duration::from_secs(3600),
            ..EngineConfig::default()
        };
        let (handle, _task) = spawn(recorder, &config);

        for n in 1..=3 {
            handle.deliver(n).unwrap();
        }
        handle.snapshot().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["in 1", "in 2", "in 3"]);
    }
}
