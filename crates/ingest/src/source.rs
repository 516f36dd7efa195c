//! The inbound message source abstraction.
//!
//! The listener only needs "wait for the next message"; any publish/subscribe
//! client can provide that. [`MqttSource`](crate::client::MqttSource) is the
//! production implementation, [`ChannelSource`] feeds messages from inside
//! the process.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// A single message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Something that yields inbound messages one at a time, in arrival order.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message. `None` means the source is exhausted and
    /// will never yield again.
    async fn next_message(&mut self) -> Option<InboundMessage>;
}

/// A [`MessageSource`] backed by a bounded tokio channel.
pub struct ChannelSource {
    rx: mpsc::Receiver<InboundMessage>,
}

/// Create a channel-backed source and the sender that publishes into it.
///
/// The source is exhausted once every sender has been dropped.
pub fn channel(capacity: usize) -> (mpsc::Sender<InboundMessage>, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelSource { rx })
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn next_message(&mut self) -> Option<InboundMessage> {
        self.rx.recv().await
    }
}

/// MQTT topic filter matching (`+` matches one level, a trailing `#` matches
/// any remaining levels).
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
