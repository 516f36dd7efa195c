//! MQTT client for the sensor telemetry topic.
//!
//! [`MqttConfig`] holds the broker coordinates. Call
//! [`MqttSource::connect`] to establish a live, subscribed connection that
//! implements [`MessageSource`].

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS, SubAck,
    SubscribeReasonCode,
};

use crate::reconnect::Backoff;
use crate::source::{InboundMessage, MessageSource};
use crate::status::{ListenerHandle, ListenerState};

/// Capacity of rumqttc's outgoing request queue.
const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Smallest keep-alive interval accepted by the broker-facing options.
const MIN_KEEP_ALIVE_SECS: u64 = 5;

/// Broker coordinates and subscription settings.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker host name or address.
    pub broker: String,
    /// Broker TCP port.
    pub port: u16,
    /// Topic (or topic filter) carrying sensor readings.
    pub topic: String,
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u64,
}

/// A live, subscribed MQTT connection.
///
/// Owns the rumqttc event loop; every call to
/// [`next_message`](MessageSource::next_message) drives it until a publish
/// arrives. Connection loss is handled by polling again (rumqttc reconnects
/// on the next poll), paced by [`Backoff`], and the topic is re-subscribed on
/// every new CONNACK.
pub struct MqttSource {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
    backoff: Backoff,
    status: ListenerHandle,
}

impl MqttSource {
    /// Connect to the broker, wait for its CONNACK and subscribe.
    ///
    /// Any failure before the broker accepts the connection is returned; the
    /// caller decides whether to retry. On success `status` is moved to
    /// [`ListenerState::Connected`].
    pub async fn connect(
        config: &MqttConfig,
        status: ListenerHandle,
    ) -> Result<Self, MqttClientError> {
        let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
        options.set_keep_alive(Duration::from_secs(
            config.keep_alive_secs.max(MIN_KEEP_ALIVE_SECS),
        ));

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code != ConnectReturnCode::Success {
                        return Err(MqttClientError::Refused(format!("{:?}", ack.code)));
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(MqttClientError::Connection(format!(
                        "Failed to connect to MQTT broker at {}:{}: {e}",
                        config.broker, config.port
                    )));
                }
            }
        }

        client
            .subscribe(config.topic.as_str(), QoS::AtMostOnce)
            .await
            .map_err(|e| MqttClientError::Subscribe(e.to_string()))?;

        status.set_state(ListenerState::Connected);
        tracing::info!(
            broker = %config.broker,
            port = config.port,
            topic = %config.topic,
            client_id = %config.client_id,
            "Connected to MQTT broker",
        );

        Ok(Self {
            client,
            eventloop,
            topic: config.topic.clone(),
            backoff: Backoff::default(),
            status,
        })
    }
}

#[async_trait]
impl MessageSource for MqttSource {
    async fn next_message(&mut self) -> Option<InboundMessage> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.backoff.reset();
                    return Some(InboundMessage::new(publish.topic, publish.payload.to_vec()));
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    apply_suback(&ack, &self.topic, &self.status);
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    self.backoff.reset();
                    self.status.set_state(ListenerState::Connected);
                    tracing::info!(topic = %self.topic, "Reconnected to MQTT broker, resubscribing");
                    // The event loop is not being polled while we wait here,
                    // so only a non-blocking enqueue is safe.
                    if let Err(e) = self.client.try_subscribe(self.topic.as_str(), QoS::AtMostOnce) {
                        tracing::error!(error = %e, "Failed to resubscribe");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    self.status.set_state(ListenerState::Disconnected);
                    let wait = self.backoff.next_wait();
                    tracing::warn!(
                        error = %e,
                        retry_in_ms = wait.as_millis() as u64,
                        "MQTT connection error",
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

/// Update `status` from the broker's answer to a subscription request.
///
/// A refused subscription leaves the listener disconnected until the next
/// CONNACK resubscribes.
fn apply_suback(ack: &SubAck, topic: &str, status: &ListenerHandle) {
    let granted = ack
        .return_codes
        .iter()
        .all(|code| matches!(code, SubscribeReasonCode::Success(_)));

    if granted {
        tracing::debug!(topic = %topic, pkid = ack.pkid, "Subscription granted");
        status.set_state(ListenerState::Connected);
    } else {
        tracing::error!(topic = %topic, pkid = ack.pkid, "Broker refused subscription");
        status.set_state(ListenerState::Disconnected);
    }
}

/// Errors that can occur while establishing the MQTT connection.
#[derive(Debug, thiserror::Error)]
pub enum MqttClientError {
    /// The broker could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The broker answered CONNACK with a failure code.
    #[error("Connection refused by broker: {0}")]
    Refused(String),

    /// The subscription request could not be queued.
    #[error("Subscribe error: {0}")]
    Subscribe(String),
}
