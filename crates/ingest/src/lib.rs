//! Ingestion Listener: turns inbound telemetry messages into stored readings.
//!
//! Provides the inbound message source abstraction, the MQTT client that
//! implements it, the per-message decode -> validate -> insert pipeline,
//! and the long-lived listener task with its shared status handle.

pub mod client;
pub mod listener;
pub mod processor;
pub mod reconnect;
pub mod source;
pub mod status;
