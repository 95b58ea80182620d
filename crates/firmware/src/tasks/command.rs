//! Status characteristic command handler
//!
//! Called from the BLE stack's write and disconnect callbacks. All state
//! changes go through `NodeState::on`; this handler only performs the
//! resulting action on the shared context.

use super::context::NodeContext;
use embassy_sync::blocking_mutex::raw::RawMutex;
use smartpt_core::protocol::Command;
use smartpt_core::session::{NodeAction, NodeEvent};

pub struct CommandHandler<'a, M: RawMutex> {
    ctx: &'a NodeContext<M>,
}

impl<'a, M: RawMutex> CommandHandler<'a, M> {
    pub fn new(ctx: &'a NodeContext<M>) -> Self {
        Self { ctx }
    }

    /// Handle a write to the Status characteristic
    ///
    /// `now_us` is the node's monotonic time at receipt; a Start anchors
    /// the session clock to it. Unrecognized payloads are ignored.
    pub fn on_status_write(&self, payload: &[u8], now_us: u64) -> Option<NodeAction> {
        let event = match Command::parse(payload) {
            Some(Command::Start) => NodeEvent::Start,
            Some(Command::Stop) => NodeEvent::Stop,
            None => {
                crate::log_warn!("Ignoring status write of {} bytes", payload.len());
                return None;
            }
        };
        self.apply(event, now_us)
    }

    /// Handle loss of the central
    pub fn on_disconnect(&self) -> Option<NodeAction> {
        self.apply(NodeEvent::Disconnect, 0)
    }

    fn apply(&self, event: NodeEvent, now_us: u64) -> Option<NodeAction> {
        let action = self.ctx.transition(event);
        match action {
            Some(NodeAction::BeginSession) => {
                self.ctx.begin_session(now_us);
                crate::log_info!("Session started at {} us", now_us);
            }
            Some(NodeAction::EndSession) => {
                self.ctx.end_session();
                crate::log_info!("Session ended ({:?})", event);
            }
            None => {
                crate::log_debug!("{:?} ignored while idle", event);
            }
        }
        action
    }
}
