//! Sensor node session state machine
//!
//! The node is either idle or streaming. All transitions go through
//! [`NodeState::on`], which also reports the side effect the caller must
//! perform (anchor a new session clock, or close the run gate).

/// Node sampling state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeState {
    #[default]
    Idle,
    Running,
}

/// Inputs that can change the node state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeEvent {
    /// `"Start"` written to the Status characteristic
    Start,
    /// `"Stop"` written to the Status characteristic
    Stop,
    /// Central disconnected
    Disconnect,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeAction {
    /// Anchor the session clock, acknowledge, open the run gate
    BeginSession,
    /// Close the run gate; the sampler discards or flushes its partial batch
    EndSession,
}

impl NodeState {
    /// Apply an event, returning the next state and the action to perform
    ///
    /// A Start while already running begins a fresh session (new anchor,
    /// new ACK, sequence ids restart). Stop or Disconnect while idle does
    /// nothing.
    pub fn on(self, event: NodeEvent) -> (NodeState, Option<NodeAction>) {
        match (self, event) {
            (_, NodeEvent::Start) => (NodeState::Running, Some(NodeAction::BeginSession)),
            (NodeState::Running, NodeEvent::Stop | NodeEvent::Disconnect) => {
                (NodeState::Idle, Some(NodeAction::EndSession))
            }
            (NodeState::Idle, NodeEvent::Stop | NodeEvent::Disconnect) => (NodeState::Idle, None),
        }
    }

    pub fn is_running(self) -> bool {
        self == NodeState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_stop_cycle() {
        let (state, action) = NodeState::Idle.on(NodeEvent::Start);
        assert_eq!(state, NodeState::Running);
        assert_eq!(action, Some(NodeAction::BeginSession));

        let (state, action) = state.on(NodeEvent::Stop);
        assert_eq!(state, NodeState::Idle);
        assert_eq!(action, Some(NodeAction::EndSession));
    }

    #[test]
    fn disconnect_ends_running_session() {
        let (state, action) = NodeState::Running.on(NodeEvent::Disconnect);
        assert!(!state.is_running());
        assert_eq!(action, Some(NodeAction::EndSession));
    }

    #[test]
    fn idle_ignores_stop_and_disconnect() {
        assert_eq!(NodeState::Idle.on(NodeEvent::Stop), (NodeState::Idle, None));
        assert_eq!(
            NodeState::Idle.on(NodeEvent::Disconnect),
            (NodeState::Idle, None)
        );
    }

    #[test]
    fn restart_while_running_begins_new_session() {
        let (state, action) = NodeState::Running.on(NodeEvent::Start);
        assert_eq!(state, NodeState::Running);
        assert_eq!(action, Some(NodeAction::BeginSession));
    }
}
