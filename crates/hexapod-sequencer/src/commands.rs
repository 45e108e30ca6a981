//! Cross-thread mode command queue
//!
//! Mode selection may come from another thread (a serial reader, a network
//! bridge, a test harness). The queue keeps the single-writer discipline:
//! senders only enqueue; the sequencer drains the queue at tick boundaries,
//! so a command can never tear an in-flight tick.

use crate::sequencer::{Mode, Sequencer};
use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::warn;

/// Sender half handed to command sources. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandSender(Sender<Mode>);

impl CommandSender {
    /// Enqueues a mode request.
    ///
    /// Returns `false` when the sequencer side is gone.
    pub fn select(&self, mode: Mode) -> bool {
        self.0.send(mode).is_ok()
    }

    /// Convenience for the universal stop request.
    pub fn stop(&self) -> bool {
        self.select(Mode::Standby)
    }
}

/// Receiver half owned by the tick loop.
#[derive(Debug)]
pub struct CommandReceiver(pub(crate) Receiver<Mode>);

/// Creates a connected command queue.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = unbounded();
    (CommandSender(tx), CommandReceiver(rx))
}

impl Sequencer {
    /// Applies every pending mode command, in arrival order.
    ///
    /// Rejected commands (unregistered gaits) are logged and counted but do
    /// not interrupt draining; a bad command must not cost the robot its
    /// posture.
    pub fn drain_commands(&mut self, commands: &CommandReceiver) {
        while let Ok(mode) = commands.0.try_recv() {
            if let Err(err) = self.select_mode(mode) {
                warn!(%err, "dropping rejected mode command");
            }
        }
    }
}
