//! Request parameter lists with repeated-key array encoding.
//!
//! The upstream site expects PHP-style array parameters: a list value is sent
//! as the same key repeated once per element (`sex[]=male&sex[]=female`).
//! Order is preserved because the search form submits parameters in a fixed
//! order and we mirror it.

use url::form_urlencoded;

/// An ordered list of request parameters.
///
/// Used both as a query string (GET) and as a form-urlencoded body (POST);
/// the wire encoding is identical in both positions.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single `key=value` pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Appends one pair per value under the same (typically `key[]`) name.
    pub fn push_all<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.pairs.push((key.to_string(), value.into()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serializes the pairs as `application/x-www-form-urlencoded` text.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Returns the first value recorded under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_array_keys_are_preserved() {
        let mut params = Params::new();
        params.push_all("sex[]", ["male", "female"]);
        assert_eq!(params.encode(), "sex%5B%5D=male&sex%5B%5D=female");
    }

    #[test]
    fn values_are_url_encoded() {
        let mut params = Params::new();
        params.push("keywords", "tea & travel");
        assert_eq!(params.encode(), "keywords=tea+%26+travel");
    }

    #[test]
    fn order_is_insertion_order() {
        let mut params = Params::new();
        params.push("b", "2");
        params.push("a", "1");
        assert_eq!(params.encode(), "b=2&a=1");
    }

    #[test]
    fn get_returns_first_value() {
        let mut params = Params::new();
        params.push_all("countries[]", ["FR", "DE"]);
        assert_eq!(params.get("countries[]"), Some("FR"));
        assert_eq!(params.get("missing"), None);
    }
}
