//! JsonLinesOutbound - one JSON document per line to an async writer
//!
//! The dispatch loop only ever replaces the latest pending pan or zoom; a
//! writer task drains them. When the writer fails (broken pipe on stdout)
//! the task exits, the receiver closes and the next send ends the session.

use contracts::{ContractError, GestureMessage, OutboundChannel};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{ChannelOutbound, GestureReceiver};

/// Outbound writing `{"gesture":..,"vector":..}` lines
pub struct JsonLinesOutbound {
    channel: ChannelOutbound,
    writer: JoinHandle<u64>,
}

impl JsonLinesOutbound {
    /// Spawn the writer task on the current runtime
    pub fn spawn<W>(name: impl Into<String>, writer: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let name = name.into();
        let (channel, rx) = ChannelOutbound::new(name.clone());
        let writer = tokio::spawn(write_lines(name, writer, rx));
        Self { channel, writer }
    }

    /// JSON lines on process stdout
    pub fn stdout() -> Self {
        Self::spawn("stdout", tokio::io::stdout())
    }

    /// Gestures replaced by a newer one before the writer got to them
    pub fn superseded(&self) -> u64 {
        self.channel.superseded()
    }

    pub fn is_writer_finished(&self) -> bool {
        self.writer.is_finished()
    }
}

impl OutboundChannel for JsonLinesOutbound {
    fn name(&self) -> &str {
        self.channel.name()
    }

    fn send(&mut self, message: GestureMessage) -> Result<(), ContractError> {
        self.channel.send(message)
    }
}

/// Drain pending gestures into `writer`; returns the number of lines written
async fn write_lines<W>(name: String, mut writer: W, mut rx: GestureReceiver) -> u64
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(message) = rx.recv().await {
        let mut line = match serde_json::to_vec(&message) {
            Ok(line) => line,
            Err(e) => {
                warn!(outbound = %name, error = %e, "gesture serialization failed");
                continue;
            }
        };
        line.push(b'\n');

        let result = async {
            writer.write_all(&line).await?;
            writer.flush().await
        }
        .await;
        if let Err(e) = result {
            warn!(outbound = %name, error = %e, "writer failed, closing outbound");
            return written;
        }
        written += 1;
    }
    debug!(outbound = %name, written, "writer stopped");
    written
}
