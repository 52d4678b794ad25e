//! Profile page parser.
//!
//! The profile header (`.profileBox h1`) is the required anchor: when it is
//! absent the user does not exist or the page shape changed, and parsing
//! fails loudly. Everything else is optional and degrades to empty values.
//!
//! Two quirks of the page are preserved deliberately (see DESIGN.md):
//! gender is a two-state inference from the presence of the male icon, and
//! the language/free-text sections are located by scanning candidate blocks
//! for their heading text because block order is not guaranteed.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{ApiError, Result};
use crate::models::{Gender, Language, Profile};
use crate::parse::{element_text, has_class, query_param, selector};

static HEADER_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".profileBox h1"));
static GENDER_ICON_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#".profileBox img[src*="male-14.png"]"#));
static LOCATION_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(".profLocation .profDataTopData"));
static LOCATION_INNER_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[style*="float: left"]"#));
static LOCATION_LABEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"span[style*="color: #ccc;"]"#));
static DATA_FIELD_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".profDataTopField"));
static H3_SEL: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static LANG_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".profLang"));
static LANG_NAME_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".prLangName"));
static LANG_LEVEL_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".proflLevel"));
static LOOKING_FOR_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".lfor"));
static SECTION_H2_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".profDataBox h2"));
static ICON_SEL: LazyLock<Selector> = LazyLock::new(|| selector("i"));
static UID_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="uid="]"#));

static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*y\.o\.").expect("age pattern is valid"));
static LEADING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("digits pattern is valid"));

/// Free-text section keys and the heading labels they are rendered under.
const SECTION_LABELS: [(&str, &str); 7] = [
    ("about", "About"),
    ("requests", "Requests"),
    ("hobbies", "Hobbies & Interests"),
    ("music", "Favorite Music"),
    ("movies", "Favorite Movies"),
    ("tv_shows", "Favorite TV Shows"),
    ("books", "Favorite Books"),
];

/// Parses a profile page into a [`Profile`] record.
///
/// # Errors
///
/// Returns [`ApiError::PageShape`] when the profile header block is missing.
pub fn parse_profile(body: &str) -> Result<Profile> {
    let document = Html::parse_document(body);
    let mut profile = Profile::default();

    let header = document
        .select(&HEADER_SEL)
        .next()
        .ok_or(ApiError::PageShape("profile header"))?;
    profile.username = element_text(header);

    if let Some(name_age) = header_trailing_text(header) {
        // "Antoine,  28 y.o." -- split on the first comma only.
        let (name_part, rest) = match name_age.split_once(',') {
            Some((name, rest)) => (name, Some(rest)),
            None => (name_age.as_str(), None),
        };
        profile.name = name_part.trim().to_string();

        if let Some(caps) = AGE_RE.captures(&name_age) {
            profile.age = caps[1].to_string();
        } else if let Some(rest) = rest {
            // Fallback when the "y.o." pattern is absent but the comma split
            // produced a second part.
            let candidate = rest.replace("y.o.", "");
            if let Some(caps) = LEADING_DIGITS_RE.captures(candidate.trim()) {
                profile.age = caps[1].to_string();
            }
        }
    }

    // Two-state inference: male icon present => Male, otherwise Female.
    profile.gender = if document.select(&GENDER_ICON_SEL).next().is_some() {
        Gender::Male
    } else {
        Gender::Female
    };

    let locations: Vec<_> = document.select(&LOCATION_SEL).collect();
    if let Some(block) = locations.first() {
        profile.current_city = location_text(*block, "[Current City]");
    }
    if let Some(block) = locations.get(1) {
        profile.hometown = location_text(*block, "[Hometown]");
    }

    profile.speaks = languages(&document, "speaks");
    profile.learning = languages(&document, "learning");
    profile.looking_for = looking_for(&document);

    for (key, label) in SECTION_LABELS {
        let text = section_text(&document, label);
        match key {
            "about" => profile.about = text,
            "requests" => profile.requests = text,
            "hobbies" => profile.hobbies = text,
            "music" => profile.music = text,
            "movies" => profile.movies = text,
            "tv_shows" => profile.tv_shows = text,
            "books" => profile.books = text,
            _ => unreachable!("unknown section key"),
        }
    }

    profile.uid = find_uid(&document);

    Ok(profile)
}

/// The "Name, NN y.o." text node directly after the username header.
fn header_trailing_text(header: ElementRef<'_>) -> Option<String> {
    let mut sibling = header.next_sibling();
    while let Some(node) = sibling {
        if let Some(text) = node.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        } else if node.value().is_element() {
            break;
        }
        sibling = node.next_sibling();
    }
    None
}

/// Extracts the location value with the decorative label span stripped.
///
/// The site renders `Paris, France <span ...>[Current City]</span>` inside a
/// float container; the label is removed and trailing punctuation cleaned.
fn location_text(block: ElementRef<'_>, fallback_label: &str) -> String {
    let (raw, label) = match block.select(&LOCATION_INNER_SEL).next() {
        Some(container) => {
            let label = container
                .select(&LOCATION_LABEL_SEL)
                .next()
                .map(element_text);
            (element_text(container), label)
        }
        // Inner float container missing: fall back to the whole block text.
        None => (element_text(block), Some(fallback_label.to_string())),
    };

    let mut text = raw;
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        text = text.replace(&label, "");
    }
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    text.trim().trim_end_matches(',').trim().to_string()
}

/// Finds the language block whose heading contains `heading` and parses its
/// entries. Block order is not guaranteed, hence the scan.
fn languages(document: &Html, heading: &str) -> Vec<Language> {
    for block in document.select(&DATA_FIELD_SEL) {
        let Some(h3) = block.select(&H3_SEL).next() else {
            continue;
        };
        if !element_text(h3).to_lowercase().contains(heading) {
            continue;
        }

        let mut entries = Vec::new();
        for lang in block.select(&LANG_SEL) {
            let Some(name_el) = lang.select(&LANG_NAME_SEL).next() else {
                continue;
            };
            let level = lang
                .select(&LANG_LEVEL_SEL)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(|src| {
                    src.rsplit('/')
                        .next()
                        .unwrap_or(src)
                        .trim_end_matches(".png")
                        .to_string()
                });
            entries.push(Language {
                name: element_text(name_el),
                level,
            });
        }
        return entries;
    }
    Vec::new()
}

fn looking_for(document: &Html) -> Vec<String> {
    for block in document.select(&DATA_FIELD_SEL) {
        let Some(h3) = block.select(&H3_SEL).next() else {
            continue;
        };
        if !element_text(h3).to_lowercase().contains("looking for") {
            continue;
        }
        return block
            .select(&LOOKING_FOR_SEL)
            .map(element_text)
            .collect();
    }
    Vec::new()
}

/// Finds the free-text section under the `h2` whose label matches `heading`
/// and returns the content of the following `.profDataBoxText` block.
fn section_text(document: &Html, heading: &str) -> String {
    for h2 in document.select(&SECTION_H2_SEL) {
        let label = heading_text(h2);
        let matched = if !label.is_empty() {
            label.eq_ignore_ascii_case(heading)
        } else {
            // Fallback when the icon/text layout differs: substring match on
            // the full h2 text.
            element_text(h2)
                .to_lowercase()
                .contains(&heading.to_lowercase())
        };
        if !matched {
            continue;
        }

        let mut sibling = h2.next_sibling();
        while let Some(node) = sibling {
            if let Some(el) = ElementRef::wrap(node) {
                if has_class(el, "profDataBoxText") {
                    return element_text(el);
                }
            }
            sibling = node.next_sibling();
        }
        return String::new();
    }
    String::new()
}

/// The heading text of an `h2`, skipping the leading `<i>` icon element.
fn heading_text(h2: ElementRef<'_>) -> String {
    let Some(icon) = h2.select(&ICON_SEL).next() else {
        return element_text(h2);
    };
    let mut sibling = icon.next_sibling();
    while let Some(node) = sibling {
        if let Some(text) = node.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        } else if node.value().is_element() {
            break;
        }
        sibling = node.next_sibling();
    }
    String::new()
}

/// The internal numeric uid, recovered from any `uid=`-carrying link on the
/// page (friend/report/album links all carry it).
fn find_uid(document: &Html) -> String {
    for link in document.select(&UID_LINK_SEL) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(uid) = query_param(href, "uid") {
            if !uid.is_empty() && uid.chars().all(|c| c.is_ascii_digit()) {
                return uid;
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PROFILE: &str = r#"
    <html><body>
      <div class="profileBox">
        <h1>Absonoplyanka</h1>
        Antoine,  28 y.o.
        <img src="/img/icons/male-14.png">
      </div>
      <div class="profLocation">
        <div class="profDataTopData">
          <div style="float: left;">
            Lyon, France,
            <span style="color: #ccc;">[Current City]</span>
          </div>
        </div>
        <div class="profDataTopData">
          <div style="float: left;">
            Marseille, France,
            <span style="color: #ccc;">[Hometown]</span>
          </div>
        </div>
      </div>
      <div class="profDataTopField">
        <h3>Looking For</h3>
        <span class="lfor">Email pals</span>
        <span class="lfor">Language exchange</span>
      </div>
      <div class="profDataTopField">
        <h3>Speaks</h3>
        <div class="profLang">
          <span class="prLangName">French</span>
          <img class="proflLevel" src="/img/levels/lang5.png">
        </div>
        <div class="profLang">
          <span class="prLangName">English</span>
          <img class="proflLevel" src="/img/levels/lang3.png">
        </div>
      </div>
      <div class="profDataTopField">
        <h3>Learning</h3>
        <div class="profLang">
          <span class="prLangName">Japanese</span>
        </div>
      </div>
      <div class="profDataBox">
        <h2><i class="icon-about"></i> About</h2>
        <div class="profDataBoxText">Bonjour! I like trains.</div>
        <h2><i class="icon-music"></i> Favorite Music</h2>
        <div class="profDataBoxText">Jazz, mostly.</div>
      </div>
      <a href="/app/friends/add?uid=7341288">Add friend</a>
    </body></html>
    "#;

    #[test]
    fn parses_full_profile() {
        let profile = parse_profile(FULL_PROFILE).unwrap();
        assert_eq!(profile.username, "Absonoplyanka");
        assert_eq!(profile.name, "Antoine");
        assert_eq!(profile.age, "28");
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.current_city, "Lyon, France");
        assert_eq!(profile.hometown, "Marseille, France");
        assert_eq!(profile.looking_for, vec!["Email pals", "Language exchange"]);
        assert_eq!(profile.speaks.len(), 2);
        assert_eq!(profile.speaks[0].name, "French");
        assert_eq!(profile.speaks[0].level.as_deref(), Some("lang5"));
        assert_eq!(profile.learning.len(), 1);
        assert_eq!(profile.learning[0].name, "Japanese");
        assert_eq!(profile.learning[0].level, None);
        assert_eq!(profile.about, "Bonjour! I like trains.");
        assert_eq!(profile.music, "Jazz, mostly.");
        assert_eq!(profile.movies, "");
        assert_eq!(profile.uid, "7341288");
    }

    #[test]
    fn missing_header_is_a_page_shape_error() {
        let err = parse_profile("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert!(matches!(err, ApiError::PageShape("profile header")));
    }

    #[test]
    fn minimal_profile_defaults_all_optional_fields() {
        let body = r#"<div class="profileBox"><h1>lonely</h1></div>"#;
        let profile = parse_profile(body).unwrap();
        assert_eq!(profile.username, "lonely");
        assert_eq!(profile.name, "");
        assert_eq!(profile.age, "");
        // No male icon on the page => Female; the two-state inference has no
        // way to express "unknown".
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.current_city, "");
        assert_eq!(profile.hometown, "");
        assert!(profile.speaks.is_empty());
        assert!(profile.learning.is_empty());
        assert!(profile.looking_for.is_empty());
        assert_eq!(profile.about, "");
        assert_eq!(profile.uid, "");
    }

    #[test]
    fn age_fallback_without_yo_pattern() {
        let body = r#"<div class="profileBox"><h1>user</h1>Maria, 31</div>"#;
        let profile = parse_profile(body).unwrap();
        assert_eq!(profile.name, "Maria");
        assert_eq!(profile.age, "31");
    }

    #[test]
    fn name_without_comma_keeps_whole_text() {
        let body = r#"<div class="profileBox"><h1>user</h1>Maria 31 y.o.</div>"#;
        let profile = parse_profile(body).unwrap();
        assert_eq!(profile.name, "Maria 31 y.o.");
        assert_eq!(profile.age, "31");
    }
}
