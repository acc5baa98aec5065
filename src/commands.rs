//! Async command pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Services return commands from `update()` and the App spawns them.

use async_trait::async_trait;

/// Async command that performs side effects.
///
/// Commands typically send their results back to the service via a channel.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logs.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> color_eyre::Result<()>;
}
