//! Friends list parser.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::FriendEntry;
use crate::parse::{element_text, query_param, selector};

static FRIEND_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.fList"));
static PROFILE_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static NAME_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.fListName"));
static THUMB_SEL: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static UID_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="uid="]"#));

/// Parses a friends listing page into friend rows.
///
/// Rows without a profile link are skipped with a warning; the rest of the
/// fields degrade to empty strings.
pub fn parse_friends(body: &str) -> Vec<FriendEntry> {
    let document = Html::parse_document(body);
    let mut friends = Vec::new();

    for (index, block) in document.select(&FRIEND_SEL).enumerate() {
        // First link whose href looks like a profile path ("/username").
        let username = block
            .select(&PROFILE_LINK_SEL)
            .filter_map(|link| link.value().attr("href"))
            .filter(|href| href.starts_with('/') && !href.contains("uid="))
            .map(|href| {
                let path = href.strip_prefix('/').unwrap_or(href);
                path.split('?').next().unwrap_or("").to_string()
            })
            .find(|user| !user.is_empty());
        let Some(username) = username else {
            log::warn!("skipping friend block #{index} without a profile link");
            continue;
        };

        let uid = block
            .select(&UID_LINK_SEL)
            .filter_map(|link| link.value().attr("href"))
            .find_map(|href| query_param(href, "uid"))
            .unwrap_or_default();

        let name = block
            .select(&NAME_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let thumbnail = block
            .select(&THUMB_SEL)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or("")
            .to_string();

        friends.push(FriendEntry {
            uid,
            username,
            name,
            thumbnail,
        });
    }

    friends
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRIENDS_PAGE: &str = r#"
        <html><body>
          <div class="fList">
            <a href="/maria87?from=friends"><img src="https://ipstatic.test/thumbs/maria.jpg"></a>
            <div class="fListName"><a href="/maria87">Maria</a></div>
            <a class="fListRemove" href="/app/friends/delete?uid=7341"></a>
          </div>
          <div class="fList">
            <a href="/jonas"><img src="https://ipstatic.test/thumbs/jonas.jpg"></a>
            <div class="fListName"><a href="/jonas">Jonas</a></div>
          </div>
        </body></html>
    "#;

    #[test]
    fn parses_friend_rows() {
        let friends = parse_friends(FRIENDS_PAGE);
        assert_eq!(friends.len(), 2);
        assert_eq!(friends[0].username, "maria87");
        assert_eq!(friends[0].uid, "7341");
        assert_eq!(friends[0].name, "Maria");
        assert_eq!(friends[0].thumbnail, "https://ipstatic.test/thumbs/maria.jpg");
        assert_eq!(friends[1].username, "jonas");
        assert_eq!(friends[1].uid, "");
    }

    #[test]
    fn block_without_profile_link_is_skipped() {
        let body = r#"<div class="fList"><p>placeholder</p></div>"#;
        assert!(parse_friends(body).is_empty());
    }
}
