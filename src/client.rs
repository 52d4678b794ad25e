//! Public operations: compose transport + parsers + pagination.
//!
//! The client owns the session credentials for its lifetime and translates
//! transport outcomes into domain results. Operations that the site answers
//! with a redirect (friend add/remove, thread-id discovery) treat the
//! redirect as their payload; everything else expects a page body.

use std::time::Duration;

use async_stream::try_stream;
use futures::Stream;

use crate::error::{ApiError, Result};
use crate::models::{
    Album, ChatMessage, ChatOverview, ChatSummary, FriendEntry, Picture, Profile, SearchResult,
};
use crate::params::Params;
use crate::parse;
use crate::search::SearchOptions;
use crate::session::Session;
use crate::transport::{is_authenticated, HttpTransport, Outcome, Transport};

/// Sentinel substrings the profile page uses to signal a domain outcome.
const NOT_FOUND_SENTINEL: &str = "User not found.";
const BLOCKED_SENTINEL: &str =
    "Sorry, this user's privacy settings do not allow you to contact them.";

/// Asynchronous client facade.
///
/// Generic over the transport so tests can drive the full operation logic
/// against scripted responses; production code uses [`HttpTransport`].
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    username: String,
}

impl Client<HttpTransport> {
    /// Builds a client for the production host from a validated session.
    pub fn new(session: Session) -> Self {
        let transport = HttpTransport::new(&session);
        Self {
            transport,
            username: session.username().to_string(),
        }
    }

    /// Builds a client against a custom base URL (used by tests).
    pub fn with_base_url(session: Session, base_url: impl Into<String>) -> Self {
        let transport = HttpTransport::with_base_url(&session, base_url);
        Self {
            transport,
            username: session.username().to_string(),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Builds a client over an arbitrary transport.
    pub fn with_transport(transport: T, username: impl Into<String>) -> Self {
        Self {
            transport,
            username: username.into(),
        }
    }

    /// Fetches a page body, optionally requiring the logged-in marker.
    async fn fetch_body(
        &self,
        path: &str,
        params: Option<&Params>,
        check_auth: bool,
    ) -> Result<String> {
        match self.transport.get(path, params).await? {
            Outcome::Body(body) => {
                if check_auth && !is_authenticated(&body) {
                    return Err(ApiError::Authentication);
                }
                Ok(body)
            }
            Outcome::Redirect { status, location } => {
                Err(ApiError::Redirect { status, location })
            }
        }
    }

    /// Posts a form and returns the response body.
    async fn post_body(&self, path: &str, params: &Params) -> Result<String> {
        match self.transport.post(path, params).await? {
            Outcome::Body(body) => Ok(body),
            Outcome::Redirect { status, location } => {
                Err(ApiError::Redirect { status, location })
            }
        }
    }

    /// Extracts the HTML fragment embedded in a `pm.php` JSON response.
    fn json_body_fragment(text: &str) -> Result<String> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        value
            .get("body")
            .and_then(|body| body.as_str())
            .map(str::to_string)
            .ok_or(ApiError::PageShape("json body payload"))
    }

    /// Returns whether the stored session is still accepted by the site.
    ///
    /// Only an authentication failure maps to `Ok(false)`; transport
    /// failures propagate, so a timeout is never mistaken for an expired
    /// session.
    pub async fn check_auth(&self) -> Result<bool> {
        if self.username.is_empty() {
            return Ok(false);
        }
        match self.fetch_body(&format!("/{}", self.username), None, true).await {
            Ok(_) => Ok(true),
            Err(ApiError::Authentication) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Records a profile visit without parsing the page.
    pub async fn view(&self, user: &str) -> Result<()> {
        self.fetch_body(&format!("/{user}"), None, true).await?;
        Ok(())
    }

    /// Fetches and parses a user's profile.
    pub async fn profile(&self, user: &str) -> Result<Profile> {
        let body = self.fetch_body(&format!("/{user}"), None, true).await?;

        if body.contains(NOT_FOUND_SENTINEL) {
            return Err(ApiError::UserNotFound);
        }
        if body.contains(BLOCKED_SENTINEL) {
            return Err(ApiError::Blocked);
        }

        parse::profile::parse_profile(&body)
    }

    /// Resolves a username to the internal numeric uid.
    pub async fn get_uid(&self, user: &str) -> Result<String> {
        let profile = self.profile(user).await?;
        if profile.uid.is_empty() {
            return Err(ApiError::PageShape("profile uid"));
        }
        Ok(profile.uid)
    }

    /// Lists usernames that recently viewed the session's profile.
    pub async fn visitors(&self) -> Result<Vec<String>> {
        let body = self.fetch_body("/app/views", None, true).await?;
        Ok(parse::parse_visitors(&body))
    }

    /// Resolves a city name to the site-internal city code.
    ///
    /// The code is the id of the first autocomplete match; no match is a
    /// page-shape error.
    pub async fn get_citycode(&self, name: &str) -> Result<String> {
        let mut params = Params::new();
        params.push("query", name);
        let body = self
            .fetch_body("/app/async/geoAc", Some(&params), false)
            .await?;

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let id = value
            .pointer("/items/0/id")
            .ok_or(ApiError::PageShape("city code"))?;
        match id {
            serde_json::Value::String(code) => Ok(code.clone()),
            id if id.is_number() => Ok(id.to_string()),
            _ => Err(ApiError::PageShape("city code")),
        }
    }

    /// Runs a search as a lazy, finite stream of results.
    ///
    /// The search form is fetched once to extract the CSRF token, which then
    /// stays fixed for the whole pagination run. A city name without a city
    /// code is resolved up front via [`Client::get_citycode`]. Pages are
    /// requested with an offset advancing per item consumed; an empty page
    /// or `limit` yielded items terminates the stream. `delay` throttles
    /// page requests without blocking unrelated tasks.
    pub async fn search(
        &self,
        options: &SearchOptions,
        limit: usize,
        delay: Duration,
    ) -> Result<impl Stream<Item = Result<SearchResult>> + '_> {
        let form = self.fetch_body("/app/search", None, true).await?;
        let csrf_token =
            parse::find_csrf_token(&form).ok_or(ApiError::PageShape("search csrf token"))?;

        let mut options = options.clone();
        if options.city.is_none() {
            if let Some(name) = options.city_name.clone() {
                options.city = Some(self.get_citycode(&name).await?);
            }
        }

        Ok(try_stream! {
            let mut offset = 0usize;
            'pages: loop {
                let params = options.to_params(&csrf_token, offset);
                let body = self.fetch_body("/app/search", Some(&params), true).await?;
                let items = parse::search::parse_results(&body);
                if items.is_empty() {
                    break;
                }
                log::debug!("search page at offset {offset}: {} items", items.len());

                for item in items {
                    yield item;
                    offset += 1;
                    if offset >= limit {
                        break 'pages;
                    }
                }

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        })
    }

    /// Collects a search into a vector; convenience over [`Client::search`].
    pub async fn search_collect(
        &self,
        options: &SearchOptions,
        limit: usize,
        delay: Duration,
    ) -> Result<Vec<SearchResult>> {
        use futures::TryStreamExt;

        let stream = self.search(options, limit, delay).await?;
        futures::pin_mut!(stream);
        stream.try_collect().await
    }

    /// Discovers the private-message thread id for a uid.
    ///
    /// The site answers the `send` action with a redirect whose `Location`
    /// carries the thread id; a normal response violates the protocol.
    pub async fn get_thread_id(&self, uid: &str) -> Result<String> {
        let mut params = Params::new();
        params.push("action", "send");
        params.push("uid", uid);

        match self.transport.get("/pm.php", Some(&params)).await? {
            Outcome::Redirect { location, .. } => {
                parse::query_param(&location, "thread_id").ok_or(ApiError::ThreadIdUnavailable)
            }
            Outcome::Body(_) => Err(ApiError::ThreadIdUnavailable),
        }
    }

    /// Fetches the inbox: up to `count` thread summaries starting at
    /// `offset`, plus the unread count.
    ///
    /// Thread pages are requested against the watermark captured from the
    /// inbox page, so threads arriving mid-pagination do not shift pages.
    /// The request offset advances by the raw page size, independent of how
    /// many summaries the caller's `count` consumed.
    pub async fn chat(&self, count: usize, offset: usize) -> Result<ChatOverview> {
        let inbox = self.fetch_body("/pm.php", None, true).await?;
        let max_msg_id = parse::chat::parse_max_msg_id(&inbox)?;
        let unread = parse::chat::parse_unread(&inbox);

        let mut chats: Vec<ChatSummary> = Vec::new();
        let mut offset = offset;
        while chats.len() < count {
            let mut params = Params::new();
            params.push("action", "more_threads");
            params.push("from", offset.to_string());
            params.push("filter", "all");
            params.push("max_msg_id", max_msg_id.clone());

            let text = self.post_body("/pm.php", &params).await?;
            let fragment = Self::json_body_fragment(&text)?;
            let items = parse::chat::parse_threads(&fragment);
            if items.is_empty() {
                break;
            }

            let page_len = items.len();
            for item in items {
                chats.push(item);
                if chats.len() >= count {
                    break;
                }
            }
            offset += page_len;
        }

        Ok(ChatOverview { chats, unread })
    }

    /// Loads messages for a thread, optionally only those after
    /// `last_msg_id`.
    pub async fn chat_messages(
        &self,
        thread_id: &str,
        last_msg_id: Option<&str>,
    ) -> Result<Vec<ChatMessage>> {
        let mut params = Params::new();
        params.push("action", "load_messages");
        params.push("thread", thread_id);
        if let Some(last_msg_id) = last_msg_id {
            params.push("last_msg_id", last_msg_id);
        }

        let text = self.post_body("/pm.php", &params).await?;
        let fragment = Self::json_body_fragment(&text)?;
        Ok(parse::chat::parse_messages(&fragment))
    }

    /// Sends a message into a thread.
    ///
    /// Success is the absence of an `"error"` key in the JSON response; a
    /// rejection carries the raw body for diagnosis.
    pub async fn chat_send(&self, thread_id: &str, message: &str) -> Result<()> {
        let mut params = Params::new();
        params.push("action", "send_message");
        params.push("thread", thread_id);
        params.push("message", message);

        let text = self.post_body("/pm.php", &params).await?;
        if text.contains("\"error\"") {
            return Err(ApiError::Rejected {
                operation: "send message",
                body: text,
            });
        }
        Ok(())
    }

    /// Deletes a thread without blocking the other participant.
    pub async fn chat_delete(&self, thread_id: &str) -> Result<()> {
        let mut params = Params::new();
        params.push("action", "delete_thread");
        params.push("thread", thread_id);
        params.push("block_user", "0");

        self.post_body("/pm.php", &params).await?;
        Ok(())
    }

    /// Lists a user's friends.
    pub async fn friends(&self, uid: &str) -> Result<Vec<FriendEntry>> {
        let mut params = Params::new();
        params.push("uid", uid);
        let body = self.fetch_body("/app/friends", Some(&params), true).await?;
        Ok(parse::friends::parse_friends(&body))
    }

    /// Sends a friend request; the site signals success with a redirect.
    pub async fn friend_add(&self, uid: &str) -> Result<()> {
        let mut params = Params::new();
        params.push("uid", uid);
        match self.transport.get("/app/friends/add", Some(&params)).await? {
            Outcome::Redirect { .. } => Ok(()),
            Outcome::Body(_) => Err(ApiError::MissingRedirect {
                operation: "add friend",
            }),
        }
    }

    /// Removes a friend; the site signals success with a redirect.
    pub async fn friend_remove(&self, uid: &str) -> Result<()> {
        let mut params = Params::new();
        params.push("uid", uid);
        match self
            .transport
            .get("/app/friends/delete", Some(&params))
            .await?
        {
            Outcome::Redirect { .. } => Ok(()),
            Outcome::Body(_) => Err(ApiError::MissingRedirect {
                operation: "delete friend",
            }),
        }
    }

    /// Lists a user's photo albums.
    pub async fn albums(&self, uid: &str) -> Result<Vec<Album>> {
        let mut params = Params::new();
        params.push("uid", uid);
        let body = self.fetch_body("/app/albums", Some(&params), true).await?;
        Ok(parse::pictures::parse_albums(&body))
    }

    /// Lists the pictures in one album.
    pub async fn pictures(&self, uid: &str, aid: &str) -> Result<Vec<Picture>> {
        let mut params = Params::new();
        params.push("uid", uid);
        params.push("aid", aid);
        let body = self.fetch_body("/app/album", Some(&params), true).await?;
        Ok(parse::pictures::parse_pictures(&body))
    }
}
