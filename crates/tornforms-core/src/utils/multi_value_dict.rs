//! A string-keyed dictionary holding every value submitted under a key.
//!
//! Form submissions repeat keys (`?tag=a&tag=b`), and a field reads the
//! **last** submitted value. [`MultiValueDict`] keeps all of them in
//! submission order so the choice is made by the field, not the transport.

use std::collections::btree_map;
use std::collections::BTreeMap;

/// A dictionary that maps string keys to ordered lists of values.
///
/// [`get`](MultiValueDict::get) returns the last value for a key and
/// [`get_list`](MultiValueDict::get_list) returns all of them. Keys iterate
/// in sorted order.
///
/// # Examples
///
/// ```
/// use tornforms_core::utils::MultiValueDict;
///
/// let mut d = MultiValueDict::new();
/// d.append("color", "red");
/// d.append("color", "blue");
///
/// assert_eq!(d.get("color"), Some(&"blue"));
/// assert_eq!(d.get_list("color"), Some(&["red", "blue"][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueDict<V> {
    inner: BTreeMap<String, Vec<V>>,
}

impl<V> Default for MultiValueDict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MultiValueDict<V> {
    /// Creates an empty `MultiValueDict`.
    pub const fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    /// Returns the last value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.inner.get(key).and_then(|v| v.last())
    }

    /// Returns every value submitted under `key`, oldest first.
    pub fn get_list(&self, key: &str) -> Option<&[V]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    /// Sets the value for a key, replacing any existing values.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.inner.insert(key.into(), vec![value]);
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: impl Into<String>, value: V) {
        self.inner.entry(key.into()).or_default().push(value);
    }

    /// Appends every value of `other` after this dictionary's values.
    pub fn extend_from(&mut self, other: Self) {
        for (key, values) in other.inner {
            self.inner.entry(key).or_default().extend(values);
        }
    }

    /// Removes a key, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<V>> {
        self.inner.remove(key)
    }

    /// Returns `true` if the dictionary contains the key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Vec<V>> {
        self.inner.keys()
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the dictionary contains no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over (key, values) pairs.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<V>> {
        self.inner.iter()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for MultiValueDict<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (key, value) in iter {
            dict.append(key, value);
        }
        dict
    }
}

impl<V> IntoIterator for MultiValueDict<V> {
    type Item = (String, Vec<V>);
    type IntoIter = btree_map::IntoIter<String, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a MultiValueDict<V> {
    type Item = (&'a String, &'a Vec<V>);
    type IntoIter = btree_map::Iter<'a, String, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let d: MultiValueDict<String> = MultiValueDict::new();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_append_and_get_returns_last() {
        let mut d = MultiValueDict::new();
        d.append("color", "red");
        d.append("color", "blue");
        d.append("color", "green");

        assert_eq!(d.get("color"), Some(&"green"));
        assert_eq!(d.get_list("color"), Some(&["red", "blue", "green"][..]));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut d = MultiValueDict::new();
        d.append("k", "a");
        d.append("k", "b");
        d.set("k", "c");
        assert_eq!(d.get_list("k"), Some(&["c"][..]));
    }

    #[test]
    fn test_get_missing_key() {
        let d: MultiValueDict<&str> = MultiValueDict::new();
        assert_eq!(d.get("missing"), None);
        assert_eq!(d.get_list("missing"), None);
        assert!(!d.contains_key("missing"));
    }

    #[test]
    fn test_extend_from_keeps_order() {
        let mut body: MultiValueDict<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let query: MultiValueDict<i32> = [("a", 3), ("c", 4)].into_iter().collect();
        body.extend_from(query);

        assert_eq!(body.get_list("a"), Some(&[1, 3][..]));
        assert_eq!(body.get("c"), Some(&4));
        assert_eq!(body.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove() {
        let mut d = MultiValueDict::new();
        d.append("x", 1);
        assert_eq!(d.remove("x"), Some(vec![1]));
        assert!(d.is_empty());
    }

    #[test]
    fn test_iter() {
        let d: MultiValueDict<i32> = [("a", 1), ("a", 2), ("b", 3)].into_iter().collect();
        let items: Vec<_> = d.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        assert_eq!(items, vec![("a", vec![1, 2]), ("b", vec![3])]);
    }
}
