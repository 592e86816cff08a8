//! Remote start/stop over MQTT.
//!
//! The only thing a command can do is flip the recording flag; the capture
//! thread and segmenter read it on their own schedule.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use tracing::{debug, info, warn};

use crate::config::ControlSettings;
use crate::error::RecorderError;
use crate::recorder::StateHandle;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Record,
    Stop,
}

impl ControlCmd {
    /// Parse a message payload. Only the exact tokens `record` and `stop`
    /// (surrounding whitespace aside) are commands.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match std::str::from_utf8(payload).ok()?.trim() {
            "record" => Some(Self::Record),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

pub fn apply(cmd: ControlCmd, state: &StateHandle) {
    let recording = cmd == ControlCmd::Record;
    if state.is_recording() != recording {
        info!(recording, "remote control changed recording state");
    }
    state.set_recording(recording);
}

/// Connect to the broker and apply commands from `settings.topic` until the
/// process exits. Connection failures are logged and retried.
pub fn spawn_control(
    settings: ControlSettings,
    broker: String,
    state: StateHandle,
) -> Result<JoinHandle<()>, RecorderError> {
    thread::Builder::new()
        .name("control".to_string())
        .spawn(move || run_control(&settings, &broker, &state))
        .map_err(|source| RecorderError::Spawn {
            name: "control",
            source,
        })
}

fn run_control(settings: &ControlSettings, broker: &str, state: &StateHandle) {
    let mut options = MqttOptions::new(settings.client_id.clone(), broker, settings.port);
    options.set_keep_alive(Duration::from_secs(60));
    let (client, mut connection) = Client::new(options, 10);

    for notification in connection.iter() {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!(broker, topic = %settings.topic, "connected to control broker");
                // Subscriptions do not survive a reconnect with a clean session.
                if let Err(e) = client.try_subscribe(settings.topic.clone(), QoS::AtMostOnce) {
                    warn!(error = %e, "failed to subscribe to control topic");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => match ControlCmd::parse(&publish.payload) {
                Some(cmd) => apply(cmd, state),
                None => debug!(payload = ?publish.payload, "ignoring control message"),
            },
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, broker, "control connection error, retrying");
                thread::sleep(RECONNECT_DELAY);
            }
        }
    }
}
