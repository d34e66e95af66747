//! Field extraction for action dictionaries.
//!
//! Every draw action arrives as a JSON object. These helpers pull typed
//! values out of it and report missing keys or wrong types as
//! [`PageError`]s rather than silently substituting zero.

use serde_json::{Map, Value};

use crate::error::{PageError, Result};
use crate::graphics::Color;

/// One page, or one draw action, as a key-value map.
pub type ActionMap = Map<String, Value>;

/// Two numbers read from a pair of keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberPair {
    pub a: f64,
    pub b: f64,
}

/// `x` and `y`.
pub fn get_coords(map: &ActionMap) -> Result<NumberPair> {
    get_number_key_pair(map, "x", "y")
}

/// `width` and `height`.
pub fn get_dims(map: &ActionMap) -> Result<NumberPair> {
    get_number_key_pair(map, "width", "height")
}

pub fn get_radius(map: &ActionMap) -> Result<f64> {
    get_number_single_key(map, "radius")
}

pub fn get_edge(map: &ActionMap) -> Result<f64> {
    get_number_single_key(map, "edge")
}

pub fn get_stroke_width(map: &ActionMap) -> Result<f64> {
    get_number_single_key(map, "strokeWidth")
}

pub fn get_number_key_pair(map: &ActionMap, key1: &str, key2: &str) -> Result<NumberPair> {
    Ok(NumberPair {
        a: get_number_single_key(map, key1)?,
        b: get_number_single_key(map, key2)?,
    })
}

pub fn get_number_single_key(map: &ActionMap, key: &str) -> Result<f64> {
    let value = map
        .get(key)
        .ok_or_else(|| PageError::MissingKey(key.to_string()))?;
    as_number(key, value)
}

/// Like [`get_number_single_key`] but `None` when the key is absent or null.
pub fn get_optional_number(map: &ActionMap, key: &str) -> Result<Option<f64>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_number(key, value).map(Some),
    }
}

pub fn get_string<'a>(map: &'a ActionMap, key: &str) -> Result<&'a str> {
    match map.get(key) {
        None => Err(PageError::MissingKey(key.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(PageError::InvalidType {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

/// Read a `#RRGGBB` colour string.
pub fn get_color(map: &ActionMap, key: &str) -> Result<Color> {
    Color::from_hex_str(get_string(map, key)?)
}

/// Read a list of points. Each point is either `{"x": .., "y": ..}` or
/// a two-element array `[x, y]`.
pub fn get_double_and_double_pair_list(map: &ActionMap, key: &str) -> Result<Vec<(f64, f64)>> {
    let items = match map.get(key) {
        None => return Err(PageError::MissingKey(key.to_string())),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(PageError::InvalidType {
                key: key.to_string(),
                expected: "an array of points",
            })
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(point) => {
                let pair = get_coords(point)?;
                Ok((pair.a, pair.b))
            }
            Value::Array(pair) if pair.len() == 2 => {
                Ok((as_number(key, &pair[0])?, as_number(key, &pair[1])?))
            }
            _ => Err(PageError::InvalidType {
                key: key.to_string(),
                expected: "points as {x, y} or [x, y]",
            }),
        })
        .collect()
}

/// Parse a hex string such as `FF0000`, `#ff0000` or `0xff0000`.
pub fn hex_int_from_string(hex: &str) -> Result<u32> {
    let trimmed = hex.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PageError::InvalidColor(hex.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| PageError::InvalidColor(hex.to_string()))
}

fn as_number(key: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| PageError::InvalidType {
        key: key.to_string(),
        expected: "a number",
    })
}
