//! Chat/private-message parsers.
//!
//! The inbox page carries two scalar values: the `max_msg_id` watermark (the
//! highest message id the server has rendered, used to bound "load more"
//! pagination) and the unread count. Thread summaries and messages arrive as
//! HTML fragments embedded in the `body` field of the `pm.php` JSON
//! responses, so those parsers work on fragments rather than full documents.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{ApiError, Result};
use crate::models::{ChatMessage, ChatSummary};
use crate::parse::{element_text, has_class, query_param, selector};

static MAX_MSG_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="max_msg_id"\s+value="(\d+)""#).expect("max_msg_id pattern is valid")
});
static UNREAD_SEL: LazyLock<Selector> = LazyLock::new(|| selector("span.pmUnreadCount"));
static THREAD_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.pmThread"));
static THREAD_USER_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a.pmThreadUser"));
static THREAD_PREVIEW_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector("div.pmThreadPreview"));
static THREAD_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[href*="thread_id="]"#));
static MESSAGE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.pmMessage"));
static MSG_AUTHOR_SEL: LazyLock<Selector> = LazyLock::new(|| selector("span.pmMsgAuthor"));
static MSG_TEXT_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.pmMsgText"));
static MSG_TIME_SEL: LazyLock<Selector> = LazyLock::new(|| selector("span.pmMsgTime"));

/// Extracts the max-message-id watermark from the inbox page.
///
/// # Errors
///
/// The watermark is the anchor of the inbox page; its absence means the
/// request did not land on the inbox at all.
pub fn parse_max_msg_id(body: &str) -> Result<String> {
    MAX_MSG_ID_RE
        .captures(body)
        .map(|caps| caps[1].to_string())
        .ok_or(ApiError::PageShape("max_msg_id watermark"))
}

/// Extracts the unread-conversation count; missing or non-numeric badges
/// count as zero.
pub fn parse_unread(body: &str) -> u32 {
    let document = Html::parse_document(body);
    document
        .select(&UNREAD_SEL)
        .next()
        .and_then(|badge| element_text(badge).parse().ok())
        .unwrap_or(0)
}

/// Parses a `more_threads` HTML fragment into thread summaries.
pub fn parse_threads(fragment: &str) -> Vec<ChatSummary> {
    let fragment = Html::parse_fragment(fragment);
    let mut threads = Vec::new();

    for block in fragment.select(&THREAD_SEL) {
        let thread_id = block
            .value()
            .attr("data-thread")
            .map(str::to_string)
            .or_else(|| {
                block
                    .select(&THREAD_LINK_SEL)
                    .next()
                    .and_then(|link| link.value().attr("href"))
                    .and_then(|href| query_param(href, "thread_id"))
            });
        let Some(thread_id) = thread_id else {
            log::warn!("skipping thread block without a thread id");
            continue;
        };

        let username = block
            .select(&THREAD_USER_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let preview = block
            .select(&THREAD_PREVIEW_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();

        threads.push(ChatSummary {
            thread_id,
            username,
            preview,
            unread: has_class(block, "pmUnread"),
        });
    }

    threads
}

/// Parses a `load_messages` HTML fragment, ordered ascending by message id.
pub fn parse_messages(fragment: &str) -> Vec<ChatMessage> {
    let fragment = Html::parse_fragment(fragment);
    let mut messages = Vec::new();

    for block in fragment.select(&MESSAGE_SEL) {
        let id = block
            .value()
            .attr("data-msgid")
            .and_then(|raw| raw.parse::<u64>().ok());
        let Some(id) = id else {
            log::warn!("skipping message block without a numeric id");
            continue;
        };

        let sender = block
            .select(&MSG_AUTHOR_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let body = block
            .select(&MSG_TEXT_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let timestamp = block
            .select(&MSG_TIME_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();

        messages.push(ChatMessage {
            id,
            sender,
            body,
            timestamp,
        });
    }

    messages.sort_by_key(|message| message.id);
    messages
}
