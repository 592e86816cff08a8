//! Decoding of the MPRIS `Metadata` dictionary.

use std::collections::HashMap;

use zvariant::{OwnedValue, Value};

use crate::events::TrackMetadata;

/// Pull the fields the recorder cares about out of an `a{sv}` metadata map.
///
/// Players disagree on types (`mpris:trackid` is an object path for most,
/// a plain string for some; artists are sometimes a single string), so each
/// field is decoded leniently and missing or mistyped entries become `None`.
pub fn metadata_from_map(map: &HashMap<String, OwnedValue>) -> TrackMetadata {
    TrackMetadata {
        track_id: map.get("mpris:trackid").and_then(|v| string_of(v)),
        title: map.get("xesam:title").and_then(|v| string_of(v)),
        artists: map.get("xesam:artist").map(|v| strings_of(v)).unwrap_or_default(),
        album: map.get("xesam:album").and_then(|v| string_of(v)),
        album_artists: map
            .get("xesam:albumArtist")
            .map(|v| strings_of(v))
            .unwrap_or_default(),
        track_number: map.get("xesam:trackNumber").and_then(|v| int_of(v)),
    }
}

fn string_of(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.as_str().to_string()),
        Value::ObjectPath(p) => Some(p.as_str().to_string()),
        Value::Value(inner) => string_of(inner),
        _ => None,
    }
}

fn strings_of(value: &Value<'_>) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(string_of).collect(),
        Value::Value(inner) => strings_of(inner),
        other => string_of(other).into_iter().collect(),
    }
}

fn int_of(value: &Value<'_>) -> Option<i32> {
    match value {
        Value::I32(n) => Some(*n),
        Value::U8(n) => Some(i32::from(*n)),
        Value::I16(n) => Some(i32::from(*n)),
        Value::U16(n) => Some(i32::from(*n)),
        Value::U32(n) => i32::try_from(*n).ok(),
        Value::I64(n) => i32::try_from(*n).ok(),
        Value::U64(n) => i32::try_from(*n).ok(),
        Value::Str(s) => s.as_str().trim().parse().ok(),
        Value::Value(inner) => int_of(inner),
        _ => None,
    }
}
