//! Message processing loop.
//!
//! Reads messages from a [`MessageSource`] one at a time, decodes each
//! payload, runs the plausibility check and appends valid readings to the
//! store. A bad message is logged and dropped; it never stops the loop.

use tokio_util::sync::CancellationToken;
use vitals_core::payload::{decode_message, DecodeError};
use vitals_core::types::DbId;
use vitals_core::validation::{self, Rejection};
use vitals_db::models::reading::CreateReading;
use vitals_db::repositories::ReadingRepo;
use vitals_db::DbPool;

use crate::source::{topic_matches, MessageSource};
use crate::status::ListenerHandle;

/// Longest payload excerpt written to the log for an undecodable message.
const MAX_LOGGED_PAYLOAD: usize = 256;

/// What happened to one inbound message.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Stored under the given reading id.
    Stored(DbId),
    /// Decoded but outside physiological bounds; dropped.
    Rejected(Rejection),
    /// Could not be decoded; dropped.
    Malformed(DecodeError),
    /// Valid but the store returned an error; dropped.
    StoreFailed(String),
}

/// Process messages until the source is exhausted or `cancel` fires.
///
/// Messages are handled strictly in arrival order. Cancellation is only
/// observed while waiting for the next message, so an insert that has
/// started always runs to completion. Messages whose topic does not match
/// `topic_filter` are skipped.
pub async fn process_messages<S>(
    source: &mut S,
    topic_filter: &str,
    pool: &DbPool,
    status: &ListenerHandle,
    cancel: &CancellationToken,
) where
    S: MessageSource + ?Sized,
{
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Ingestion cancelled");
                break;
            }
            message = source.next_message() => message,
        };

        let Some(message) = message else {
            tracing::info!("Message source exhausted");
            break;
        };

        if !topic_matches(topic_filter, &message.topic) {
            tracing::debug!(topic = %message.topic, "Ignoring message on unrelated topic");
            continue;
        }

        let outcome = handle_message(&message.payload, pool).await;
        status.record(&outcome);
    }
}

/// Decode, validate and store a single payload.
pub async fn handle_message(payload: &[u8], pool: &DbPool) -> IngestOutcome {
    let input = match decode_message(payload) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(
                error = %e,
                payload = %excerpt(payload),
                "Discarding undecodable message",
            );
            return IngestOutcome::Malformed(e);
        }
    };

    if let Err(reason) = validation::check(input.heart_rate, input.spo2) {
        tracing::warn!(
            heart_rate = input.heart_rate,
            spo2 = input.spo2,
            %reason,
            "Discarding implausible reading",
        );
        return IngestOutcome::Rejected(reason);
    }

    match ReadingRepo::insert(pool, &CreateReading::from(input)).await {
        Ok(reading) => {
            tracing::info!(
                id = reading.id,
                heart_rate = reading.heart_rate,
                spo2 = reading.spo2,
                temperature_c = reading.temperature_c,
                steps = reading.steps,
                "Stored reading",
            );
            IngestOutcome::Stored(reading.id)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store reading");
            IngestOutcome::StoreFailed(e.to_string())
        }
    }
}

/// Lossy UTF-8 view of the start of a payload, for log fields.
fn excerpt(payload: &[u8]) -> String {
    let end = payload.len().min(MAX_LOGGED_PAYLOAD);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_long_payloads() {
        let payload = vec![b'x'; MAX_LOGGED_PAYLOAD * 2];
        assert_eq!(excerpt(&payload).len(), MAX_LOGGED_PAYLOAD);
    }

    #[test]
    fn excerpt_replaces_invalid_utf8() {
        assert_eq!(excerpt(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }
}
