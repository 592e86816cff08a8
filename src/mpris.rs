//! MPRIS player adapter.
//!
//! Finds a media player on the session bus, then turns its
//! `PropertiesChanged` signals into [`PlayerEvent`]s. Status and metadata
//! changes come from one signal stream, so they reach the segmenter in the
//! order the player emitted them.

use std::collections::HashMap;
use std::pin::pin;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use async_io::{Timer, block_on};
use futures_util::{StreamExt, stream};
use tracing::{debug, info, warn};
use zbus::Connection;
use zbus::fdo::{DBusProxy, PropertiesProxy};
use zbus::proxy::CacheProperties;
use zvariant::OwnedValue;

use crate::config::PlayerSettings;
use crate::error::RecorderError;
use crate::events::{PlaybackState, PlayerEvent};

mod metadata;

pub use metadata::metadata_from_map;

const BUS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const PLAYER_IFACE: &str = "org.mpris.MediaPlayer2.Player";

#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
trait MediaPlayer2 {
    #[zbus(property)]
    fn identity(&self) -> zbus::Result<String>;
}

#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
trait Player {
    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
}

/// Pick a player bus name from `names`.
///
/// With `preferred`, only that player (or one of its instances, e.g.
/// `vlc.instance42`) is accepted. Without it, the first player in name order
/// wins so repeated lookups are stable.
pub fn choose_player<'a>(
    names: impl IntoIterator<Item = &'a str>,
    preferred: Option<&str>,
) -> Option<String> {
    let mut players: Vec<&str> = names
        .into_iter()
        .filter(|n| n.starts_with(BUS_PREFIX))
        .collect();
    players.sort_unstable();

    let Some(preferred) = preferred else {
        return players.first().map(|n| n.to_string());
    };

    players
        .into_iter()
        .find(|n| {
            let short = &n[BUS_PREFIX.len()..];
            short == preferred
                || short
                    .strip_prefix(preferred)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
        .map(str::to_string)
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    /// The player left the bus.
    Vanished,
    /// Nobody is listening for events any more.
    Closed,
}

/// Which Player properties a single `PropertiesChanged` signal touched.
#[derive(Default)]
struct Touched {
    status: bool,
    metadata: bool,
}

enum Signal {
    Changed(Touched),
    Owner { present: bool },
}

/// Watch for a player and forward its events until `events` is dropped.
///
/// Runs its own async executor on a dedicated thread. Returns an error only
/// when the session bus is unreachable or discovery runs out of attempts.
pub fn spawn_player_watcher(
    settings: PlayerSettings,
    events: Sender<PlayerEvent>,
) -> Result<JoinHandle<Result<(), RecorderError>>, RecorderError> {
    thread::Builder::new()
        .name("mpris".to_string())
        .spawn(move || block_on(watch(&settings, &events)))
        .map_err(|source| RecorderError::Spawn {
            name: "mpris",
            source,
        })
}

async fn watch(settings: &PlayerSettings, events: &Sender<PlayerEvent>) -> Result<(), RecorderError> {
    let connection = Connection::session().await?;

    loop {
        let name = wait_for_player(&connection, settings).await?;
        let outcome = follow_player(&connection, &name, events).await;
        if let Flow::Closed = player_lost(&name, outcome, events) {
            return Ok(());
        }
    }
}

/// Wrap up after `follow_player` returns. Players rarely report `Stopped`
/// before quitting, so a lost player is reported as stopped here; otherwise
/// capture would keep appending to the last track.
fn player_lost(name: &str, outcome: zbus::Result<Flow>, events: &Sender<PlayerEvent>) -> Flow {
    match outcome {
        Ok(Flow::Closed) => return Flow::Closed,
        Ok(Flow::Vanished) => info!(bus_name = %name, "player left the bus, searching again"),
        Err(e) => warn!(error = %e, bus_name = %name, "lost contact with player, searching again"),
    }
    match events.send(PlayerEvent::Status(PlaybackState::Stopped)) {
        Ok(()) => Flow::Vanished,
        Err(_) => Flow::Closed,
    }
}

async fn discover_player(connection: &Connection, preferred: Option<&str>) -> zbus::Result<Option<String>> {
    let dbus = DBusProxy::new(connection).await?;
    let names = dbus.list_names().await?;
    Ok(choose_player(names.iter().map(|n| n.as_str()), preferred))
}

async fn wait_for_player(connection: &Connection, settings: &PlayerSettings) -> Result<String, RecorderError> {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        match discover_player(connection, settings.name.as_deref()).await {
            Ok(Some(name)) => return Ok(name),
            Ok(None) => debug!(attempts, "no player on the bus yet"),
            Err(e) => warn!(error = %e, attempts, "player lookup failed"),
        }

        if settings.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(RecorderError::NoPlayer { attempts });
        }
        Timer::after(Duration::from_secs(settings.retry_secs)).await;
    }
}

async fn follow_player(
    connection: &Connection,
    name: &str,
    events: &Sender<PlayerEvent>,
) -> zbus::Result<Flow> {
    let root = MediaPlayer2Proxy::builder(connection)
        .destination(name.to_string())?
        .cache_properties(CacheProperties::No)
        .build()
        .await?;
    let identity = root
        .identity()
        .await
        .unwrap_or_else(|_| name.trim_start_matches(BUS_PREFIX).to_string());
    info!(player = %identity, bus_name = %name, "player found");

    let player = PlayerProxy::builder(connection)
        .destination(name.to_string())?
        .cache_properties(CacheProperties::No)
        .build()
        .await?;
    let properties = PropertiesProxy::builder(connection)
        .destination(name.to_string())?
        .path(OBJECT_PATH)?
        .build()
        .await?;

    let changes = properties
        .receive_properties_changed()
        .await?
        .map(|signal| {
            let touched = signal
                .args()
                .ok()
                .filter(|args| args.interface_name().as_str() == PLAYER_IFACE)
                .map(|args| {
                    let invalidated = args.invalidated_properties();
                    let hit = |prop: &str| {
                        args.changed_properties().contains_key(prop) || invalidated.iter().any(|p| *p == prop)
                    };
                    Touched {
                        status: hit("PlaybackStatus"),
                        metadata: hit("Metadata"),
                    }
                })
                .unwrap_or_default();
            Signal::Changed(touched)
        });
    let owner = properties
        .inner()
        .receive_owner_changed()
        .await?
        .map(|owner| Signal::Owner {
            present: owner.is_some(),
        });

    // Capture only runs while playing, so the current status is needed up
    // front. Current metadata is not: the track already in progress is
    // incomplete and is left to the placeholder.
    let status = player.playback_status().await?;
    if events.send(PlayerEvent::Status(PlaybackState::from_mpris(&status))).is_err() {
        return Ok(Flow::Closed);
    }

    let mut signals = pin!(stream::select(changes, owner));
    while let Some(signal) = signals.next().await {
        let touched = match signal {
            Signal::Owner { present: false } => return Ok(Flow::Vanished),
            Signal::Owner { present: true } => continue,
            Signal::Changed(touched) => touched,
        };

        // Metadata first: when a new track starts playing in the same
        // signal, its audio should not be captured into the previous track.
        if touched.metadata {
            let map = player.metadata().await?;
            if events.send(PlayerEvent::Metadata(metadata_from_map(&map))).is_err() {
                return Ok(Flow::Closed);
            }
        }
        if touched.status {
            let status = player.playback_status().await?;
            if events.send(PlayerEvent::Status(PlaybackState::from_mpris(&status))).is_err() {
                return Ok(Flow::Closed);
            }
        }
    }

    Ok(Flow::Vanished)
}

#[cfg(test)]
mod tests;
