//! Album and picture listing parsers.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::{Album, Picture};
use crate::parse::{element_text, query_param, selector};

static ALBUM_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.albumBox"));
static ALBUM_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[href*="aid="]"#));
static ALBUM_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.albumTitle"));
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static PICTURE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a.photoThumb"));

/// Parses the `/app/albums` page into album rows.
pub fn parse_albums(body: &str) -> Vec<Album> {
    let document = Html::parse_document(body);
    let mut albums = Vec::new();

    for (index, block) in document.select(&ALBUM_SEL).enumerate() {
        let aid = block
            .select(&ALBUM_LINK_SEL)
            .filter_map(|link| link.value().attr("href"))
            .find_map(|href| query_param(href, "aid"));
        let Some(aid) = aid else {
            log::warn!("skipping album block #{index} without an album id");
            continue;
        };

        let title = block
            .select(&ALBUM_TITLE_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let cover = block
            .select(&IMG_SEL)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or("")
            .to_string();

        albums.push(Album { aid, title, cover });
    }

    albums
}

/// Parses an `/app/album` page into picture rows.
pub fn parse_pictures(body: &str) -> Vec<Picture> {
    let document = Html::parse_document(body);
    let mut pictures = Vec::new();

    for (index, link) in document.select(&PICTURE_SEL).enumerate() {
        let Some(href) = link.value().attr("href") else {
            log::warn!("skipping picture block #{index} without a target");
            continue;
        };

        let thumbnail = link
            .select(&IMG_SEL)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or("")
            .to_string();
        let pid = query_param(href, "pid").unwrap_or_default();

        pictures.push(Picture {
            pid,
            url: href.to_string(),
            thumbnail,
        });
    }

    pictures
}
