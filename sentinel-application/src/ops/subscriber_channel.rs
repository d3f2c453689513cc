// Lifecycle of one live-feed connection
//
// Connected --handshake--> Subscribed --transport closed--> Closed
// Connected --transport closed--> Closed

use std::sync::Arc;

use sentinel_domain::EventEnvelope;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Connected,
    Subscribed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelInput {
    Handshake,
    TransportClosed,
}

/// What the hub must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEffect {
    None,
    ConfirmSubscription,
    Deregister,
}

impl ChannelState {
    pub fn next(self, input: ChannelInput) -> (ChannelState, ChannelEffect) {
        match (self, input) {
            (ChannelState::Closed, _) => (ChannelState::Closed, ChannelEffect::None),
            (_, ChannelInput::TransportClosed) => (ChannelState::Closed, ChannelEffect::Deregister),
            (_, ChannelInput::Handshake) => {
                (ChannelState::Subscribed, ChannelEffect::ConfirmSubscription)
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self, ChannelState::Subscribed)
    }
}

/// Hub-side half of a connection: the state tag plus the bounded outbound queue.
#[derive(Debug)]
pub struct SubscriberChannel {
    state: ChannelState,
    outbound: mpsc::Sender<Arc<EventEnvelope>>,
}

impl SubscriberChannel {
    pub fn new(outbound: mpsc::Sender<Arc<EventEnvelope>>) -> Self {
        Self {
            state: ChannelState::Connected,
            outbound,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Open while the connection task still holds the receiving end.
    pub fn is_open(&self) -> bool {
        self.state != ChannelState::Closed && !self.outbound.is_closed()
    }

    pub fn apply(&mut self, input: ChannelInput) -> ChannelEffect {
        let (state, effect) = self.state.next(input);
        self.state = state;
        effect
    }

    pub fn try_send(
        &self,
        envelope: Arc<EventEnvelope>,
    ) -> Result<(), mpsc::error::TrySendError<Arc<EventEnvelope>>> {
        self.outbound.try_send(envelope)
    }
}
