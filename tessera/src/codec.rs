//! Wire encoding of token sections
//!
//! Each section is JSON, base64url-encoded without padding. Claims pass
//! through a fixed sequence of formatters on their way out and another on
//! their way in:
//!
//! * encode: [`ENCODE_FORMATTERS`], which turns date claims into numeric
//!   seconds (a decimal number when the time carries microseconds)
//! * decode: [`DECODE_FORMATTERS`], which turns the numeric `exp`, `nbf`,
//!   and `iat` claims back into times and then normalizes a scalar `aud`
//!   into a one-element list
//!
//! The audience is never reshaped on encode. Whatever shape was stored is
//! what gets written.

use std::error::Error as StdError;

use indexmap::IndexMap;
use serde_json::Map;
use tessera_base64::{Base64Url, InvalidBase64Data};
use tessera_clock::UnixTime;

use crate::{
    error,
    jwt::{claims, Value},
};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A single pure transformation over a set of claims
pub type ClaimFormatter = fn(&mut IndexMap<String, Value>) -> Result<(), error::InvalidClaimValue>;

/// Formatters applied, in order, before claims are serialized
pub const ENCODE_FORMATTERS: &[ClaimFormatter] = &[format_dates];

/// Formatters applied, in order, after claims are deserialized
pub const DECODE_FORMATTERS: &[ClaimFormatter] = &[parse_dates, unify_audience];

/// Encodes bytes as URL-safe base64 without padding
#[must_use]
pub fn base64url_encode(data: &[u8]) -> String {
    Base64Url::from_raw(data).encode()
}

/// Decodes URL-safe base64, with or without padding
///
/// # Errors
///
/// The input is not valid URL-safe base64.
pub fn base64url_decode(data: &str) -> Result<Vec<u8>, InvalidBase64Data> {
    Base64Url::from_encoded(data).map(Base64Url::into_inner)
}

/// Serializes a JSON object, keeping its keys in insertion order
///
/// # Errors
///
/// The object cannot be serialized.
pub fn json_encode(object: &Map<String, serde_json::Value>) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(object)
}

/// Deserializes a JSON object
///
/// # Errors
///
/// The input is not JSON, or is JSON but not an object.
pub fn json_decode(data: &[u8]) -> Result<Map<String, serde_json::Value>, serde_json::Error> {
    serde_json::from_slice(data)
}

/// A time as a JSON number, written from its decimal text without trailing
/// zeros
pub(crate) fn time_to_json(t: UnixTime) -> serde_json::Value {
    if t.is_whole_second() {
        return serde_json::Value::from(t.as_secs());
    }

    let text = t.to_string();
    text.trim_end_matches('0')
        .parse::<serde_json::Number>()
        .map_or_else(|_| serde_json::Value::from(t.as_secs()), serde_json::Value::Number)
}

/// Reads a time from its decimal text, so no digit passes through a float
fn time_from_json(json: &serde_json::Value) -> Option<UnixTime> {
    match json {
        serde_json::Value::Number(n) => n
            .to_string()
            .parse()
            .ok()
            .or_else(|| n.as_f64().and_then(UnixTime::from_secs_f64)),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn format_dates(data: &mut IndexMap<String, Value>) -> Result<(), error::InvalidClaimValue> {
    for value in data.values_mut() {
        if let Value::Time(t) = *value {
            *value = Value::Json(time_to_json(t));
        }
    }

    Ok(())
}

fn parse_dates(data: &mut IndexMap<String, Value>) -> Result<(), error::InvalidClaimValue> {
    for &name in &claims::DATES {
        if let Some(value) = data.get_mut(name) {
            if let Value::Json(json) = value {
                let time = time_from_json(json)
                    .ok_or_else(|| error::invalid_claim_value(name, "expected seconds since the epoch"))?;
                *value = Value::Time(time);
            }
        }
    }

    Ok(())
}

fn unify_audience(data: &mut IndexMap<String, Value>) -> Result<(), error::InvalidClaimValue> {
    let value = match data.get_mut(claims::AUDIENCE) {
        Some(v) => v,
        None => return Ok(()),
    };

    match value {
        Value::Json(serde_json::Value::String(aud)) => {
            let aud = std::mem::take(aud);
            *value = Value::Json(serde_json::Value::Array(vec![aud.into()]));
            Ok(())
        }
        Value::Json(serde_json::Value::Array(list)) if list.iter().all(|a| a.is_string()) => Ok(()),
        _ => Err(error::invalid_claim_value(
            claims::AUDIENCE,
            "expected a string or a list of strings",
        )),
    }
}

pub(crate) fn encode_section(
    data: &IndexMap<String, Value>,
    formatters: &[ClaimFormatter],
) -> Result<String, BoxError> {
    let mut data = data.clone();
    for format in formatters {
        format(&mut data)?;
    }

    let object: Map<String, serde_json::Value> = data
        .into_iter()
        .map(|(k, v)| (k, v.into_json()))
        .collect();

    Ok(base64url_encode(&json_encode(&object)?))
}

pub(crate) fn decode_section(
    encoded: &str,
    formatters: &[ClaimFormatter],
) -> Result<IndexMap<String, Value>, BoxError> {
    let bytes = base64url_decode(encoded)?;
    let object = json_decode(&bytes)?;

    let mut data: IndexMap<String, Value> = object
        .into_iter()
        .map(|(k, v)| (k, Value::Json(v)))
        .collect();

    for format in formatters {
        format(&mut data)?;
    }

    Ok(data)
}
