//! Authenticated session credentials and the cookie set sent with requests.
//!
//! Login itself is out of scope: a [`Session`] is built from cookie values
//! obtained by an external login collaborator and is immutable afterwards.

use std::fmt;

/// Cookie names the site issues at login.
const SESSION_COOKIE: &str = "interpals_sessid";
const CSRF_COOKIE: &str = "csrf_cookieV2";

/// A name→value cookie mapping with unique, case-sensitive names.
///
/// Insertion order is preserved so [`CookieSet::as_header`] is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: Vec<(String, String)>,
}

impl CookieSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a cookie, replacing any existing value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Serializes the set as a `Cookie` header value: `name=value; name=value`.
    pub fn as_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Parses a `Cookie` header value back into a set.
    ///
    /// Later duplicates win, matching [`CookieSet::insert`] semantics.
    pub fn parse(header: &str) -> Self {
        let mut set = Self::new();
        for fragment in header.split(';') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            match fragment.split_once('=') {
                Some((name, value)) => set.insert(name, value),
                None => set.insert(fragment, ""),
            }
        }
        set
    }
}

impl fmt::Display for CookieSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_header())
    }
}

/// An authenticated browsing context.
///
/// Holds the username plus the two cookies the site hands out at login.
/// Never mutated after creation; every request derives its `Cookie` header
/// from the same values.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    session_id: String,
    csrf_cookie: String,
}

impl Session {
    pub fn new(
        username: impl Into<String>,
        session_id: impl Into<String>,
        csrf_cookie: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            session_id: session_id.into(),
            csrf_cookie: csrf_cookie.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn csrf_cookie(&self) -> &str {
        &self.csrf_cookie
    }

    /// The cookie set sent with every authenticated request.
    pub fn cookies(&self) -> CookieSet {
        let mut set = CookieSet::new();
        set.insert(SESSION_COOKIE, self.session_id.clone());
        set.insert(CSRF_COOKIE, self.csrf_cookie.clone());
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip_preserves_mapping() {
        let mut set = CookieSet::new();
        set.insert("interpals_sessid", "abc123");
        set.insert("csrf_cookieV2", "tok");
        set.insert("theme", "dark");

        let reparsed = CookieSet::parse(&set.as_header());
        assert_eq!(reparsed, set);
    }

    #[test]
    fn insert_replaces_existing_name() {
        let mut set = CookieSet::new();
        set.insert("a", "1");
        set.insert("a", "2");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a"), Some("2"));
    }

    #[test]
    fn parse_tolerates_whitespace_and_empty_fragments() {
        let set = CookieSet::parse("a=1;  b=2; ;c=");
        assert_eq!(set.get("a"), Some("1"));
        assert_eq!(set.get("b"), Some("2"));
        assert_eq!(set.get("c"), Some(""));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn session_cookie_header() {
        let session = Session::new("anna", "sid-1", "csrf-1");
        assert_eq!(
            session.cookies().as_header(),
            "interpals_sessid=sid-1; csrf_cookieV2=csrf-1"
        );
    }
}
