//! Ingestion listener lifecycle.
//!
//! [`IngestListener`] owns the long-lived background task that drains a
//! [`MessageSource`] into the Reading Store. It is created once at
//! application startup; its [`ListenerHandle`] can be cheaply cloned into
//! request handlers for health reporting.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vitals_db::DbPool;

use crate::client::{MqttClientError, MqttConfig, MqttSource};
use crate::processor::process_messages;
use crate::source::MessageSource;
use crate::status::{ListenerHandle, ListenerState};

/// Shutdown wait for the receive loop before the task is abandoned.
const SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// A running ingestion task.
pub struct IngestListener {
    status: ListenerHandle,
    cancel: CancellationToken,
    task_handle: JoinHandle<()>,
}

impl IngestListener {
    /// Connect to the MQTT broker and start consuming the configured topic.
    ///
    /// A connection failure is logged and returned; the listener is not
    /// started and `status` stays `disconnected`. No retry is attempted here.
    pub async fn start_mqtt(
        config: &MqttConfig,
        pool: DbPool,
        status: ListenerHandle,
    ) -> Result<Self, ListenerError> {
        let source = match MqttSource::connect(config, status.clone()).await {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(error = %e, "MQTT listener failed to start");
                return Err(ListenerError::Connect(e));
            }
        };
        Ok(Self::spawn(source, config.topic.clone(), pool, status))
    }

    /// Start consuming an already-connected source.
    ///
    /// `topic_filter` selects which messages are ingested; use `#` to accept
    /// everything the source yields.
    pub fn spawn<S>(source: S, topic_filter: String, pool: DbPool, status: ListenerHandle) -> Self
    where
        S: MessageSource + 'static,
    {
        let cancel = CancellationToken::new();
        status.set_state(ListenerState::Connected);

        let task_status = status.clone();
        let task_cancel = cancel.clone();
        let task_handle = tokio::spawn(async move {
            let mut source = source;
            tracing::info!(topic = %topic_filter, "Ingestion listener started");
            process_messages(&mut source, &topic_filter, &pool, &task_status, &task_cancel).await;
            task_status.set_state(ListenerState::Disconnected);
            tracing::info!("Ingestion listener stopped");
        });

        Self {
            status,
            cancel,
            task_handle,
        }
    }

    /// Shared status handle of this listener.
    pub fn status(&self) -> &ListenerHandle {
        &self.status
    }

    /// Whether the receive loop has exited (source exhausted or shut down).
    pub fn is_finished(&self) -> bool {
        self.task_handle.is_finished()
    }

    /// Wait for the receive loop to exit on its own.
    pub async fn join(self) {
        if let Err(e) = self.task_handle.await {
            tracing::error!(error = %e, "Ingestion task panicked");
        }
    }

    /// Stop the receive loop between messages and wait for it to exit.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down ingestion listener");
        self.cancel.cancel();
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.task_handle)
            .await
            .is_err()
        {
            tracing::warn!("Ingestion listener did not stop in time");
        }
    }
}

/// Errors that can occur when starting the listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The initial broker connection or subscription failed.
    #[error("Failed to connect listener: {0}")]
    Connect(#[from] MqttClientError),
}
