//! Outbound channel implementations
//!
//! Contains LogOutbound, ChannelOutbound and JsonLinesOutbound.

mod channel;
mod json_lines;
mod log;

pub use self::channel::{ChannelOutbound, GestureReceiver};
pub use self::json_lines::JsonLinesOutbound;
pub use self::log::LogOutbound;

use contracts::{OutboundChannel, OutboundConfig, OutboundKind};
use tracing::instrument;

/// Create the configured outbound channel
///
/// Must be called inside a tokio runtime: `stdout` spawns its writer task.
#[instrument(name = "dispatcher_create_outbound", skip(config), fields(kind = ?config.kind))]
pub fn create_outbound(config: &OutboundConfig) -> Box<dyn OutboundChannel> {
    match config.kind {
        OutboundKind::Log => Box::new(LogOutbound::new("log")),
        OutboundKind::Stdout => Box::new(JsonLinesOutbound::stdout()),
    }
}
