//! Raw input and the sources it is read from.
//!
//! A [`RawValue`] is whatever a transport hands over for one key: text,
//! undecoded bytes, every value of a repeated key, or a parsed JSON node.
//! A [`RawSource`] answers "what was submitted under this key?" and is
//! implemented for the common containers, JSON documents, and (through
//! [`Accessor`]) arbitrary lookup closures.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use tornforms_core::utils::MultiValueDict;

use crate::value::Value;

/// Untyped input for a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Explicitly nothing.
    Null,
    /// Decoded text.
    Text(String),
    /// Bytes that still have to be decoded as UTF-8.
    Bytes(Vec<u8>),
    /// An integer, as found in JSON bodies.
    Int(i64),
    /// Every value submitted under a repeated key, oldest first.
    List(Vec<RawValue>),
    /// A nested mapping, as found in JSON bodies.
    Map(BTreeMap<String, RawValue>),
}

/// A raw value reduced to something a field can coerce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scalar {
    Empty,
    Text(String),
    Int(i64),
}

/// Raw input with a shape no field accepts (a non-empty map, a nested list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Malformed;

impl RawValue {
    /// Reduces the value to a scalar.
    ///
    /// A list contributes its last element and an empty list is absent.
    /// Bytes that are not valid UTF-8 become absent. Empty maps are absent,
    /// other maps and lists nested in lists are malformed.
    pub(crate) fn into_scalar(self) -> Result<Scalar, Malformed> {
        match self {
            Self::List(mut items) => match items.pop() {
                None => Ok(Scalar::Empty),
                Some(Self::List(_)) => Err(Malformed),
                Some(last) => last.into_scalar(),
            },
            Self::Null => Ok(Scalar::Empty),
            Self::Text(s) => Ok(Scalar::Text(s)),
            Self::Int(i) => Ok(Scalar::Int(i)),
            Self::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Ok(Scalar::Text(s)),
                Err(e) => {
                    tracing::debug!(error = %e, "discarding input that is not valid UTF-8");
                    Ok(Scalar::Empty)
                }
            },
            Self::Map(map) if map.is_empty() => Ok(Scalar::Empty),
            Self::Map(_) => Err(Malformed),
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for RawValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for RawValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<Vec<Self>> for RawValue {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for RawValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Vec<u8>>> for RawValue {
    fn from(v: Vec<Vec<u8>>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Self>> for RawValue {
    fn from(v: BTreeMap<String, Self>) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// JSON nodes map onto raw values directly. Numbers that are not `i64` and
/// booleans arrive as their textual form.
impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Text(b.to_string()),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Int),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// A cleaned value fed back in as input, in the textual form its field parses.
impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Text(s) => Self::Text(s),
            Value::Int(i) => Self::Int(i),
            other => Self::Text(other.to_string()),
        }
    }
}

// ── Sources ────────────────────────────────────────────────────────────

/// Anything a form can read raw values from.
///
/// Returning `None` means the key was not submitted at all.
pub trait RawSource {
    /// Returns the raw value submitted under `key`.
    fn get_raw(&self, key: &str) -> Option<RawValue>;
}

impl<T: RawSource + ?Sized> RawSource for &T {
    fn get_raw(&self, key: &str) -> Option<RawValue> {
        (**self).get_raw(key)
    }
}

impl<K, V, S> RawSource for HashMap<K, V, S>
where
    K: Borrow<str> + Eq + Hash,
    V: Clone + Into<RawValue>,
    S: BuildHasher,
{
    fn get_raw(&self, key: &str) -> Option<RawValue> {
        self.get(key).cloned().map(Into::into)
    }
}

impl<K, V> RawSource for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: Clone + Into<RawValue>,
{
    fn get_raw(&self, key: &str) -> Option<RawValue> {
        self.get(key).cloned().map(Into::into)
    }
}

/// Every value of a repeated key is handed over; the field keeps the last.
impl<V> RawSource for MultiValueDict<V>
where
    V: Clone + Into<RawValue>,
{
    fn get_raw(&self, key: &str) -> Option<RawValue> {
        self.get_list(key)
            .map(|values| RawValue::List(values.iter().cloned().map(Into::into).collect()))
    }
}

/// Reads members of a JSON object. Any other JSON node has no keys.
impl RawSource for serde_json::Value {
    fn get_raw(&self, key: &str) -> Option<RawValue> {
        self.get(key).cloned().map(Into::into)
    }
}

impl RawSource for serde_json::Map<String, serde_json::Value> {
    fn get_raw(&self, key: &str) -> Option<RawValue> {
        self.get(key).cloned().map(Into::into)
    }
}

/// Adapts a lookup closure `(key, default) -> value` into a [`RawSource`].
///
/// The closure is always called with a `None` default.
///
/// # Examples
///
/// ```
/// use tornforms_forms::source::{Accessor, RawSource, RawValue};
///
/// let source = Accessor::new(|key: &str, default: Option<RawValue>| {
///     if key == "name" { Some(RawValue::from("Ada")) } else { default }
/// });
/// assert_eq!(source.get_raw("name"), Some(RawValue::from("Ada")));
/// assert_eq!(source.get_raw("other"), None);
/// ```
#[derive(Clone, Copy)]
pub struct Accessor<F> {
    lookup: F,
}

impl<F> Accessor<F>
where
    F: Fn(&str, Option<RawValue>) -> Option<RawValue>,
{
    /// Wraps a lookup closure.
    pub const fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F> RawSource for Accessor<F>
where
    F: Fn(&str, Option<RawValue>) -> Option<RawValue>,
{
    fn get_raw(&self, key: &str) -> Option<RawValue> {
        (self.lookup)(key, None)
    }
}

impl<F> std::fmt::Debug for Accessor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor").finish_non_exhaustive()
    }
}
