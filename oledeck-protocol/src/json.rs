//! JSON decoding of Volumio REST responses

use core::fmt::Write;

use heapless::String;
use serde::Deserialize;
use serde_json::Value;

use crate::playlist::{Playlist, PlaylistList};
use crate::snapshot::{AudioFormat, PlayerSnapshot, TransportStatus};
use crate::text::bounded;

/// Decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Body is not JSON of the expected outer shape
    Json,
    /// State has no usable `status`; the player is still starting up
    MissingStatus,
}

/// `getState` body. Every field is loosely typed: services disagree on
/// whether numbers are numbers or strings.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireState {
    status: Value,
    title: Value,
    artist: Value,
    album: Value,
    volume: Value,
    mute: Value,
    seek: Value,
    duration: Value,
    samplerate: Value,
    bitdepth: Value,
    bitrate: Value,
    track_type: Value,
    repeat: Value,
    repeat_single: Value,
    random: Value,
}

/// Decode a `getState` response
pub fn parse_state(body: &[u8]) -> Result<PlayerSnapshot, ProtocolError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ProtocolError::Json)?;
    if !value.is_object() {
        return Err(ProtocolError::Json);
    }
    let wire = WireState::deserialize(value).map_err(|_| ProtocolError::Json)?;

    let status = wire
        .status
        .as_str()
        .and_then(TransportStatus::parse)
        .ok_or(ProtocolError::MissingStatus)?;

    Ok(PlayerSnapshot {
        title: text(&wire.title),
        artist: text(&wire.artist),
        album: text(&wire.album),
        status,
        volume: number(&wire.volume).map(|v| v.clamp(0.0, 100.0) as u8),
        mute: flag(&wire.mute),
        seek_ms: number(&wire.seek).filter(|s| *s >= 0.0).map(|s| s as u64),
        duration_s: number(&wire.duration),
        format: format_of(&wire.samplerate, &wire.bitdepth, &wire.bitrate),
        track_type: text(&wire.track_type),
        repeat: flag(&wire.repeat),
        repeat_single: flag(&wire.repeat_single),
        random: flag(&wire.random),
        queue_fallback: None,
    })
}

/// Decode the format of the first entry of a `getQueue` response
///
/// Accepts both the REST shape `{"queue": [...]}` and a bare array.
/// Returns `Ok(None)` for an empty queue.
pub fn parse_queue_format(body: &[u8]) -> Result<Option<AudioFormat>, ProtocolError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ProtocolError::Json)?;
    let queue = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("queue") {
            Some(Value::Array(items)) => items,
            _ => return Err(ProtocolError::Json),
        },
        _ => return Err(ProtocolError::Json),
    };

    Ok(queue.first().map(|first| {
        format_of(
            first.get("samplerate").unwrap_or(&Value::Null),
            first.get("bitdepth").unwrap_or(&Value::Null),
            first.get("bitrate").unwrap_or(&Value::Null),
        )
    }))
}

/// Decode a `browse?uri=playlists` response
///
/// Reads `navigation.lists[0].items[*].{title,uri}`. Anything that does
/// not have this shape yields an empty listing; entries without a title
/// are skipped.
pub fn parse_playlists(body: &[u8]) -> PlaylistList {
    let mut list = PlaylistList::new();
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return list;
    };
    let Some(items) = value
        .pointer("/navigation/lists/0/items")
        .and_then(Value::as_array)
    else {
        return list;
    };

    for item in items {
        let Some(title) = item.get("title").and_then(Value::as_str) else {
            continue;
        };
        if title.is_empty() {
            continue;
        }
        let entry = Playlist {
            name: bounded(title),
            uri: bounded(item.get("uri").and_then(Value::as_str).unwrap_or("")),
        };
        if list.push(entry).is_err() {
            break;
        }
    }
    list
}

fn format_of(rate: &Value, depth: &Value, bits: &Value) -> AudioFormat {
    AudioFormat {
        sample_rate: text(rate),
        bit_depth: text(depth),
        bit_rate: text(bits),
    }
}

/// Strings as-is, numbers in their shortest form, everything else empty
fn text<const N: usize>(value: &Value) -> String<N> {
    match value {
        Value::String(s) => bounded(s),
        Value::Number(n) => {
            let mut out = String::new();
            let _ = write!(out, "{}", n);
            out
        }
        _ => String::new(),
    }
}

/// Finite numbers, accepting numeric strings
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}
