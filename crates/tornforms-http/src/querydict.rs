//! Query string dictionary for request arguments.
//!
//! [`QueryDict`] wraps [`MultiValueDict`] and keeps every submitted value as
//! the raw bytes it percent-decodes to. Decoding to text is left to the form
//! layer, so a value in the wrong charset reaches it undamaged instead of
//! being replaced with `U+FFFD`.

use tornforms_core::utils::MultiValueDict;

/// An immutable dictionary of urlencoded arguments.
///
/// # Examples
///
/// ```
/// use tornforms_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some(&b"blue"[..]));
/// assert_eq!(qd.get_list("color").map(<[_]>::len), Some(2));
/// assert_eq!(qd.get_str("size").as_deref(), Some("large"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    data: MultiValueDict<Vec<u8>>,
}

impl QueryDict {
    /// Creates an empty `QueryDict`.
    pub const fn new() -> Self {
        Self {
            data: MultiValueDict::new(),
        }
    }

    /// Parses `application/x-www-form-urlencoded` text.
    ///
    /// Pairs are separated by `&`, `+` stands for a space, and repeated keys
    /// keep every value in submission order. Keys are decoded as UTF-8
    /// (lossily); values are kept as bytes.
    pub fn parse(query_string: &str) -> Self {
        Self::parse_bytes(query_string.as_bytes())
    }

    /// Parses a urlencoded request body.
    pub fn parse_bytes(input: &[u8]) -> Self {
        let mut data = MultiValueDict::new();

        for pair in input.split(|&b| b == b'&') {
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair
                .iter()
                .position(|&b| b == b'=')
                .map_or((pair, &[][..]), |eq| (&pair[..eq], &pair[eq + 1..]));

            let key = String::from_utf8_lossy(&percent_decode(key)).into_owned();
            data.append(key, percent_decode(value));
        }

        Self { data }
    }

    /// Returns the last value for `key`.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    /// Returns the last value for `key` decoded as UTF-8, or `None` if it is
    /// missing or not valid UTF-8.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .map(str::to_string)
    }

    /// Returns every value for `key`, oldest first.
    pub fn get_list(&self, key: &str) -> Option<&[Vec<u8>]> {
        self.data.get_list(key)
    }

    /// Returns `true` if `key` was submitted.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no argument was submitted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates over keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Vec<u8>])> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Encodes the dictionary back into a query string.
    pub fn urlencode(&self) -> String {
        self.data
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", percent_encode(key.as_bytes()), percent_encode(value)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl From<MultiValueDict<Vec<u8>>> for QueryDict {
    fn from(data: MultiValueDict<Vec<u8>>) -> Self {
        Self { data }
    }
}

/// Replaces `+` with a space and decodes percent escapes.
fn percent_decode(input: &[u8]) -> Vec<u8> {
    let plus_decoded: Vec<u8> = input
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_encoding::percent_decode(&plus_decoded).collect()
}

fn percent_encode(input: &[u8]) -> String {
    percent_encoding::percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}
