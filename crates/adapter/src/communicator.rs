//! Server connection
//!
//! Outbound lines go through a [`Communicator`], which never blocks the game.
//! Inbound lines are parsed on the transport side and queued into the engine
//! handle, so game state is only ever touched by the engine task.

use std::net::SocketAddr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use gridlock_engine::EngineHandle;

use crate::protocol::{parse_line, InboundMessage};

/// Fire-and-forget sender of protocol lines
pub trait Communicator: Send + 'static {
    fn send(&self, line: &str);
}

impl Communicator for mpsc::UnboundedSender<String> {
    fn send(&self, line: &str) {
        if mpsc::UnboundedSender::send(self, line.to_string()).is_err() {
            log::debug!("connection closed, dropping `{}`", line);
        }
    }
}

/// Server connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    pub host: String,
    pub port: u16,
    /// Our name as the server knows it
    pub player: String,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9700,
            player: "player".to_string(),
        }
    }
}

impl ConnectConfig {
    /// Create from environment variables.
    ///
    /// Returns None unless `GRIDLOCK_SERVER_HOST` is set.
    pub fn from_env() -> Option<Self> {
        use std::env;

        let host = env::var("GRIDLOCK_SERVER_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())?;
        let defaults = Self::default();
        let port = env::var("GRIDLOCK_SERVER_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let player = env::var("GRIDLOCK_PLAYER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.player);

        Some(Self { host, port, player })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Line-delimited TCP connection to the game server
pub struct TcpTransport {
    peer: SocketAddr,
    outbound: mpsc::UnboundedSender<String>,
    reader: BufReader<OwnedReadHalf>,
}

impl TcpTransport {
    pub async fn connect(config: &ConnectConfig) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(config.address()).await?;
        Self::from_stream(stream)
    }

    pub fn from_stream(stream: TcpStream) -> anyhow::Result<Self> {
        let peer = stream.peer_addr()?;
        let (reader, mut writer) = stream.into_split();
        let (outbound, mut rx) = mpsc::unbounded_channel::<String>();

        // Spawn task to write lines to the server
        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if writer.write_all(line.as_bytes()).await.is_err()
                    || writer.write_all(b"\n").await.is_err()
                {
                    log::warn!("write to {} failed, closing", peer);
                    break;
                }
            }
        });

        log::info!("connected to {}", peer);
        Ok(Self {
            peer,
            outbound,
            reader: BufReader::new(reader),
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Sender for outbound lines; usable as a [`Communicator`]
    pub fn communicator(&self) -> mpsc::UnboundedSender<String> {
        self.outbound.clone()
    }

    /// Feed inbound lines to `handle` until the server hangs up
    pub fn spawn_reader(
        self,
        handle: EngineHandle<InboundMessage>,
    ) -> JoinHandle<anyhow::Result<usize>> {
        tokio::spawn(pump_inbound(self.reader, handle))
    }
}

/// Parse each line from `reader` and queue it into the engine.
///
/// Malformed lines, including ones that are not UTF-8, are logged and
/// dropped. Returns the number of messages delivered once the reader is
/// exhausted or the engine has stopped; only I/O errors end it early.
pub async fn pump_inbound<R>(mut reader: R, handle: EngineHandle<InboundMessage>) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(256);
    let mut delivered = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            log::warn!("dropping line that is not UTF-8 ({} bytes)", buf.len());
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(message) => {
                if handle.deliver(message).is_err() {
                    log::debug!("engine stopped, no longer reading");
                    break;
                }
                delivered += 1;
            }
            Err(err) => log::warn!("dropping malformed line `{}`: {}", line, err),
        }
    }

    Ok(delivered)
}
