//! Typed records produced by the parsers.
//!
//! All records are plain data: freshly allocated per parse, `Serialize` so a
//! downstream REST layer can hand them out unchanged. String fields default
//! to empty rather than `None` when the markup lacks them, mirroring the
//! page contract described in the parsers.

use serde::Serialize;

/// Gender as rendered by the site's icons.
///
/// The profile page only ever yields `Male` or `Female` (a two-state
/// inference), while search results can also yield `Unknown`. Both behaviors
/// are preserved per-parser; see DESIGN.md.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

/// One spoken or studied language with its proficiency token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: String,
    /// Proficiency level derived from the level-icon filename stem
    /// (e.g. `lang5`); `None` when no icon is rendered.
    pub level: Option<String>,
}

/// A user's public profile page, parsed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Profile {
    pub username: String,
    pub name: String,
    /// Age as displayed ("28"); empty when the page omits it.
    pub age: String,
    pub gender: Gender,
    pub current_city: String,
    pub hometown: String,
    pub speaks: Vec<Language>,
    pub learning: Vec<Language>,
    pub looking_for: Vec<String>,
    pub about: String,
    pub requests: String,
    pub hobbies: String,
    pub music: String,
    pub movies: String,
    pub tv_shows: String,
    pub books: String,
    /// Internal numeric user id; required for chat and friend operations.
    pub uid: String,
}

/// One row of a search results page.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub username: String,
    pub gender: Gender,
    pub city: String,
    pub country: String,
    pub joined: String,
    pub online_now: bool,
    pub thumbnail: String,
    pub description: String,
}

/// One conversation thread header from the inbox listing.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub thread_id: String,
    pub username: String,
    pub preview: String,
    pub unread: bool,
}

/// Inbox snapshot: thread summaries plus the unread count.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOverview {
    pub chats: Vec<ChatSummary>,
    pub unread: u32,
}

/// One message within a thread, ordered ascending by id.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: String,
    pub body: String,
    pub timestamp: String,
}

/// One row of a friends list.
#[derive(Debug, Clone, Serialize)]
pub struct FriendEntry {
    pub uid: String,
    pub username: String,
    pub name: String,
    pub thumbnail: String,
}

/// Gallery album metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Album {
    pub aid: String,
    pub title: String,
    pub cover: String,
}

/// One picture within an album.
#[derive(Debug, Clone, Serialize)]
pub struct Picture {
    pub pid: String,
    pub url: String,
    pub thumbnail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_default_is_all_empty() {
        let profile = Profile::default();
        assert_eq!(profile.username, "");
        assert_eq!(profile.age, "");
        assert_eq!(profile.gender, Gender::Unknown);
        assert!(profile.speaks.is_empty());
        assert!(profile.looking_for.is_empty());
    }

    #[test]
    fn gender_serializes_as_display_string() {
        let json = serde_json::to_string(&Gender::Male).unwrap();
        assert_eq!(json, "\"Male\"");
    }
}
