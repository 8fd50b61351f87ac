//! Telemetry and support notification sinks.

use serde_json::Value;
use std::fmt;
use tokio::sync::mpsc;

/// Receives analytics events. Must never block or fail into the caller.
pub trait TelemetrySink: Send + Sync + fmt::Debug {
    fn emit(&self, event: &str, properties: Value);
}

/// Surfaces errors to the user through the support channel.
pub trait SupportChannel: Send + Sync + fmt::Debug {
    fn show_support(&self, message: &str);
}

/// Forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn emit(&self, event: &str, properties: Value) {
        info!(target: "wallets::telemetry", event, %properties);
    }
}

impl SupportChannel for TracingTelemetry {
    fn show_support(&self, message: &str) {
        warn!(target: "wallets::telemetry", reason = message, "support requested");
    }
}

/// Drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn emit(&self, _event: &str, _properties: Value) {}
}

impl SupportChannel for NoopTelemetry {
    fn show_support(&self, _message: &str) {}
}

/// A recorded telemetry or support message.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryMessage {
    Event { name: String, properties: Value },
    Support(String),
}

/// Sends events to an unbounded channel, for hosts that forward them elsewhere.
#[derive(Clone, Debug)]
pub struct ChannelTelemetry {
    tx: mpsc::UnboundedSender<TelemetryMessage>,
}

impl ChannelTelemetry {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TelemetryMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelTelemetry {
    fn emit(&self, event: &str, properties: Value) {
        // a closed receiver means nobody listens anymore
        let _ = self.tx.send(TelemetryMessage::Event { name: event.to_string(), properties });
    }
}

impl SupportChannel for ChannelTelemetry {
    fn show_support(&self, message: &str) {
        let _ = self.tx.send(TelemetryMessage::Support(message.to_string()));
    }
}
