use super::*;
use std::sync::mpsc;

use zvariant::{ObjectPath, Value};

use crate::recorder::{SharedState, Segmenter, encode_queue};
use crate::track::MusicLibrary;

fn owned(value: Value<'_>) -> OwnedValue {
    OwnedValue::try_from(value).unwrap()
}

fn full_map() -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    map.insert(
        "mpris:trackid".to_string(),
        owned(Value::from(
            ObjectPath::try_from("/org/mpris/MediaPlayer2/Track/7").unwrap(),
        )),
    );
    map.insert("xesam:title".to_string(), owned(Value::from("A/B")));
    map.insert(
        "xesam:artist".to_string(),
        owned(Value::from(vec!["X".to_string(), "Y".to_string()])),
    );
    map.insert("xesam:album".to_string(), owned(Value::from("C")));
    map.insert(
        "xesam:albumArtist".to_string(),
        owned(Value::from(vec!["Z".to_string()])),
    );
    map.insert("xesam:trackNumber".to_string(), owned(Value::from(3i32)));
    map.insert("mpris:length".to_string(), owned(Value::from(1_234_567i64)));
    map
}

#[test]
fn metadata_from_map_decodes_expected_keys() {
    let meta = metadata_from_map(&full_map());

    assert_eq!(meta.track_id.as_deref(), Some("/org/mpris/MediaPlayer2/Track/7"));
    assert_eq!(meta.title.as_deref(), Some("A/B"));
    assert_eq!(meta.artists, vec!["X".to_string(), "Y".to_string()]);
    assert_eq!(meta.album.as_deref(), Some("C"));
    assert_eq!(meta.album_artists, vec!["Z".to_string()]);
    assert_eq!(meta.track_number, Some(3));
}

#[test]
fn metadata_from_map_tolerates_loose_types() {
    let mut map = HashMap::new();
    map.insert("mpris:trackid".to_string(), owned(Value::from("spotify:track:abc")));
    map.insert("xesam:artist".to_string(), owned(Value::from("Solo Artist")));
    map.insert("xesam:trackNumber".to_string(), owned(Value::from(12u32)));
    map.insert(
        "xesam:title".to_string(),
        owned(Value::Value(Box::new(Value::from("Wrapped")))),
    );

    let meta = metadata_from_map(&map);

    assert_eq!(meta.track_id.as_deref(), Some("spotify:track:abc"));
    assert_eq!(meta.artists, vec!["Solo Artist".to_string()]);
    assert_eq!(meta.track_number, Some(12));
    assert_eq!(meta.title.as_deref(), Some("Wrapped"));
    assert!(meta.album.is_none());
    assert!(meta.album_artists.is_empty());
}

#[test]
fn metadata_from_map_ignores_mistyped_values() {
    let mut map = HashMap::new();
    map.insert("xesam:title".to_string(), owned(Value::from(42i32)));
    map.insert("xesam:trackNumber".to_string(), owned(Value::from("not a number")));

    let meta = metadata_from_map(&map);

    assert!(meta.title.is_none());
    assert!(meta.track_number.is_none());
}

#[test]
fn empty_map_yields_empty_metadata() {
    let meta = metadata_from_map(&HashMap::new());
    assert_eq!(meta, crate::events::TrackMetadata::default());
}

#[test]
fn choose_player_ignores_non_mpris_names_and_is_stable() {
    let names = [
        "org.freedesktop.DBus",
        ":1.42",
        "org.mpris.MediaPlayer2.vlc",
        "org.mpris.MediaPlayer2.spotify",
    ];
    assert_eq!(
        choose_player(names, None).as_deref(),
        Some("org.mpris.MediaPlayer2.spotify")
    );
    assert_eq!(choose_player(["org.freedesktop.DBus"], None), None);
}

#[test]
fn choose_player_honours_preference_and_instances() {
    let names = [
        "org.mpris.MediaPlayer2.spotify",
        "org.mpris.MediaPlayer2.vlc.instance4242",
    ];
    assert_eq!(
        choose_player(names, Some("vlc")).as_deref(),
        Some("org.mpris.MediaPlayer2.vlc.instance4242")
    );
    assert_eq!(
        choose_player(names, Some("spotify")).as_deref(),
        Some("org.mpris.MediaPlayer2.spotify")
    );
    // A prefix of another player's name is not a match.
    assert_eq!(choose_player(names, Some("spot")), None);
    assert_eq!(choose_player(names, Some("mpv")), None);
}

#[test]
fn losing_the_player_closes_the_capture_gate() {
    let state = SharedState::handle(true);
    let (queue, _encoded) = encode_queue(5);
    let mut segmenter = Segmenter::new(state.clone(), queue, MusicLibrary::new("/nonexistent", "ogg"));
    segmenter.handle(PlayerEvent::Status(PlaybackState::Playing));
    assert!(state.gate_open());

    let (tx, rx) = mpsc::channel();
    assert_eq!(player_lost("org.mpris.MediaPlayer2.vlc", Ok(Flow::Vanished), &tx), Flow::Vanished);
    for event in rx.try_iter() {
        segmenter.handle(event);
    }
    assert!(!state.gate_open());
}

#[test]
fn a_failed_player_connection_also_reports_stopped() {
    let (tx, rx) = mpsc::channel();
    let outcome = Err(zbus::Error::Failure("connection reset".to_string()));
    assert_eq!(player_lost("org.mpris.MediaPlayer2.vlc", outcome, &tx), Flow::Vanished);
    assert!(matches!(
        rx.try_recv(),
        Ok(PlayerEvent::Status(PlaybackState::Stopped))
    ));
}

#[test]
fn player_lost_stops_when_nobody_listens() {
    let (tx, rx) = mpsc::channel();
    assert_eq!(player_lost("org.mpris.MediaPlayer2.vlc", Ok(Flow::Closed), &tx), Flow::Closed);
    assert!(rx.try_recv().is_err());

    drop(rx);
    assert_eq!(player_lost("org.mpris.MediaPlayer2.vlc", Ok(Flow::Vanished), &tx), Flow::Closed);
}
