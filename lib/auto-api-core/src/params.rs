//! Ordered query parameters.

use std::collections::BTreeMap;
use std::fmt::Display;

/// Trait for types that can be converted to query parameter pairs.
///
/// Pairs are sent in the order they are returned.
///
/// # Example
///
/// ```
/// use auto_api_core::ToQueryPairs;
///
/// let pairs = [("page", 1)].to_query_pairs();
/// assert_eq!(pairs, vec![("page".to_string(), "1".to_string())]);
/// ```
pub trait ToQueryPairs {
    /// Convert this type to a vector of key-value pairs for query parameters.
    fn to_query_pairs(&self) -> Vec<(String, String)>;
}

/// Insertion-ordered mapping from parameter names to scalar values.
///
/// Keys are unique: inserting an existing key replaces its value in place.
///
/// # Example
///
/// ```
/// use auto_api_core::Params;
///
/// let params = Params::new()
///     .with("page", 2)
///     .with("brand", "BMW")
///     .with("year_from", 2020);
///
/// assert_eq!(params.get("brand"), Some("BMW"));
/// assert_eq!(params.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Builder-style [`Params::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a parameter, replacing any previous value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Merges other pairs into this set, with [`Params::insert`] semantics.
    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in pairs {
            self.insert(key, value);
        }
    }

    /// Value of a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Consume into the ordered pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl ToQueryPairs for Params {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.pairs.clone()
    }
}

impl<K: AsRef<str>, V: Display> ToQueryPairs for [(K, V)] {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(key, value)| (key.as_ref().to_string(), value.to_string()))
            .collect()
    }
}

impl<K: AsRef<str>, V: Display, const N: usize> ToQueryPairs for [(K, V); N] {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.as_slice().to_query_pairs()
    }
}

impl<K: AsRef<str>, V: Display> ToQueryPairs for Vec<(K, V)> {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.as_slice().to_query_pairs()
    }
}

impl<K: AsRef<str>, V: Display> ToQueryPairs for BTreeMap<K, V> {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(key, value)| (key.as_ref().to_string(), value.to_string()))
            .collect()
    }
}

impl<T: ToQueryPairs + ?Sized> ToQueryPairs for &T {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        (**self).to_query_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_keep_insertion_order() {
        let params = Params::new()
            .with("page", 2)
            .with("brand", "BMW")
            .with("year_from", 2020)
            .with("price_to", 50000);

        let keys: Vec<_> = params.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["page", "brand", "year_from", "price_to"]);
    }

    #[test]
    fn params_insert_replaces_in_place() {
        let mut params = Params::new().with("page", 1).with("brand", "Kia");
        params.insert("page", 3);

        assert_eq!(
            params.into_pairs(),
            vec![
                ("page".to_string(), "3".to_string()),
                ("brand".to_string(), "Kia".to_string()),
            ]
        );
    }

    #[test]
    fn params_extend_merges() {
        let mut params = Params::new().with("inner_id", "abc123");
        params.extend([("api_key".to_string(), "secret".to_string())]);

        assert_eq!(params.get("inner_id"), Some("abc123"));
        assert_eq!(params.get("api_key"), Some("secret"));
        assert!(!params.is_empty());
    }

    #[test]
    fn params_from_iterator() {
        let params: Params = [("page", 1), ("year_to", 2024)].into_iter().collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("year_to"), Some("2024"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn slices_and_vecs_to_pairs() {
        let array = [("brand", "Hyundai"), ("model", "Sonata")];
        let vec = vec![("page", 1_u32)];

        assert_eq!(
            array.to_query_pairs(),
            vec![
                ("brand".to_string(), "Hyundai".to_string()),
                ("model".to_string(), "Sonata".to_string()),
            ]
        );
        assert_eq!(vec.to_query_pairs(), vec![("page".to_string(), "1".to_string())]);
    }

    #[test]
    fn btree_map_to_pairs_is_sorted() {
        let map = BTreeMap::from([("year_from", 2019), ("brand_id", 7)]);

        assert_eq!(
            map.to_query_pairs(),
            vec![
                ("brand_id".to_string(), "7".to_string()),
                ("year_from".to_string(), "2019".to_string()),
            ]
        );
    }

    #[test]
    fn empty_params() {
        assert!(Params::new().to_query_pairs().is_empty());
        assert!(Params::default().is_empty());
    }
}
