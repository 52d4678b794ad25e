//! Search results page parser.
//!
//! One malformed result block must never abort the page: the block is logged
//! and skipped, and whatever parsed cleanly is returned. Unlike the profile
//! parser, gender here is a three-state inference (male/female/unknown from
//! the sex-icon src); the discrepancy is preserved on purpose.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::models::{Gender, SearchResult};
use crate::parse::{element_text, selector};

static RESULT_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.sResInner"));
static MAIN_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.sResMain"));
static USERNAME_SEL: LazyLock<Selector> = LazyLock::new(|| selector("b a"));
static SEX_ICON_SEL: LazyLock<Selector> = LazyLock::new(|| selector("img.sResSex"));
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static THUMB_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a.sResThumb img"));
static JOINED_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.sResJoined"));
static STATUS_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.sResLastOnline"));
static DESCRIPTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector("div.sResMainTxt div.sResTxtField"));

/// Parses a search results page into whatever rows are well-formed.
pub fn parse_results(body: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(body);
    let mut results = Vec::new();

    for (index, block) in document.select(&RESULT_SEL).enumerate() {
        match parse_block(block) {
            Ok(result) => results.push(result),
            Err(reason) => {
                log::warn!("skipping malformed search result block #{index}: {reason}");
            }
        }
    }

    results
}

fn parse_block(block: ElementRef<'_>) -> Result<SearchResult, &'static str> {
    let main = block
        .select(&MAIN_SEL)
        .next()
        .ok_or("missing result body")?;
    let username_link = main
        .select(&USERNAME_SEL)
        .next()
        .ok_or("missing username link")?;
    let username = element_text(username_link);

    let gender = match block
        .select(&SEX_ICON_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
    {
        // Order matters: "female" contains "male".
        Some(src) if src.to_lowercase().contains("female") => Gender::Female,
        Some(src) if src.to_lowercase().contains("male") => Gender::Male,
        _ => Gender::Unknown,
    };

    let mut city = String::new();
    let mut country = String::new();
    for link in main.select(&LINK_SEL) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if href.contains("city=") {
            city = element_text(link);
        } else if href.contains("countries[]=") || href.contains("countries%5B%5D=") {
            country = element_text(link);
        }
    }

    let thumbnail = block
        .select(&THUMB_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap_or("")
        .to_string();

    let joined = block
        .select(&JOINED_SEL)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let online_now = block
        .select(&STATUS_SEL)
        .next()
        .map(|status| element_text(status).contains("Online now"))
        .unwrap_or(false);

    let description = block
        .select(&DESCRIPTION_SEL)
        .next()
        .map(element_text)
        .unwrap_or_default();

    Ok(SearchResult {
        username,
        gender,
        city,
        country,
        joined,
        online_now,
        thumbnail,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_block(username: &str) -> String {
        format!(
            r#"<div class="sResInner">
                 <a class="sResThumb" href="/{username}"><img src="https://ipstatic.test/thumbs/{username}.jpg"></a>
                 <img class="sResSex" src="/img/icons/female.png">
                 <div class="sResMain">
                   <b><a href="/{username}">{username}</a></b>
                   <a href="/app/search?city=1234">Berlin</a>
                   <a href="/app/search?countries%5B%5D=DE">Germany</a>
                   <div class="sResMainTxt"><div class="sResTxtField">Hi, I collect postcards.</div></div>
                 </div>
                 <div class="sResJoined">Joined 3 months ago</div>
                 <div class="sResLastOnline">Online now</div>
               </div>"#
        )
    }

    #[test]
    fn parses_well_formed_blocks() {
        let body = format!("<html><body>{}{}</body></html>", result_block("mina"), result_block("olga"));
        let results = parse_results(&body);
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.username, "mina");
        assert_eq!(first.gender, Gender::Female);
        assert_eq!(first.city, "Berlin");
        assert_eq!(first.country, "Germany");
        assert_eq!(first.joined, "Joined 3 months ago");
        assert!(first.online_now);
        assert_eq!(first.thumbnail, "https://ipstatic.test/thumbs/mina.jpg");
        assert_eq!(first.description, "Hi, I collect postcards.");
    }

    #[test]
    fn malformed_blocks_are_skipped_not_fatal() {
        let body = format!(
            "<html><body>{}<div class=\"sResInner\"><p>advert</p></div>{}</body></html>",
            result_block("mina"),
            result_block("olga"),
        );
        let results = parse_results(&body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].username, "mina");
        assert_eq!(results[1].username, "olga");
    }

    #[test]
    fn gender_is_three_state() {
        let male = r#"<div class="sResInner"><img class="sResSex" src="/i/male.png">
            <div class="sResMain"><b><a href="/u">u</a></b></div></div>"#;
        let none = r#"<div class="sResInner">
            <div class="sResMain"><b><a href="/u">u</a></b></div></div>"#;
        assert_eq!(parse_results(male)[0].gender, Gender::Male);
        assert_eq!(parse_results(none)[0].gender, Gender::Unknown);
    }

    #[test]
    fn empty_page_yields_no_results() {
        assert!(parse_results("<html><body><p>No results.</p></body></html>").is_empty());
    }
}
