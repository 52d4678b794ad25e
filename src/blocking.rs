//! Blocking facade: the same operation set with fully blocking calls.
//!
//! Wraps the async client behind an owned current-thread runtime, one
//! request in flight at a time. Search is exposed as a blocking iterator so
//! callers can still stop consuming mid-page.

use std::io;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::runtime::{Builder, Runtime};

use crate::error::Result;
use crate::models::{
    Album, ChatMessage, ChatOverview, FriendEntry, Picture, Profile, SearchResult,
};
use crate::search::SearchOptions;
use crate::session::Session;
use crate::transport::HttpTransport;

/// Blocking client facade over [`crate::Client`].
pub struct Client {
    inner: crate::Client<HttpTransport>,
    runtime: Runtime,
}

impl Client {
    /// Builds a blocking client for the production host.
    pub fn new(session: Session) -> io::Result<Self> {
        Ok(Self {
            inner: crate::Client::new(session),
            runtime: Builder::new_current_thread().enable_all().build()?,
        })
    }

    /// Builds a blocking client against a custom base URL (used by tests).
    pub fn with_base_url(session: Session, base_url: impl Into<String>) -> io::Result<Self> {
        Ok(Self {
            inner: crate::Client::with_base_url(session, base_url),
            runtime: Builder::new_current_thread().enable_all().build()?,
        })
    }

    pub fn check_auth(&self) -> Result<bool> {
        self.runtime.block_on(self.inner.check_auth())
    }

    pub fn get_citycode(&self, name: &str) -> Result<String> {
        self.runtime.block_on(self.inner.get_citycode(name))
    }

    pub fn view(&self, user: &str) -> Result<()> {
        self.runtime.block_on(self.inner.view(user))
    }

    pub fn profile(&self, user: &str) -> Result<Profile> {
        self.runtime.block_on(self.inner.profile(user))
    }

    pub fn get_uid(&self, user: &str) -> Result<String> {
        self.runtime.block_on(self.inner.get_uid(user))
    }

    pub fn visitors(&self) -> Result<Vec<String>> {
        self.runtime.block_on(self.inner.visitors())
    }

    /// Runs a search, yielding results lazily through a blocking iterator.
    pub fn search(
        &self,
        options: &SearchOptions,
        limit: usize,
        delay: Duration,
    ) -> Result<SearchIter<'_>> {
        let stream = self
            .runtime
            .block_on(self.inner.search(options, limit, delay))?;
        Ok(SearchIter {
            runtime: &self.runtime,
            stream: stream.boxed(),
        })
    }

    pub fn get_thread_id(&self, uid: &str) -> Result<String> {
        self.runtime.block_on(self.inner.get_thread_id(uid))
    }

    pub fn chat(&self, count: usize, offset: usize) -> Result<ChatOverview> {
        self.runtime.block_on(self.inner.chat(count, offset))
    }

    pub fn chat_messages(
        &self,
        thread_id: &str,
        last_msg_id: Option<&str>,
    ) -> Result<Vec<ChatMessage>> {
        self.runtime
            .block_on(self.inner.chat_messages(thread_id, last_msg_id))
    }

    pub fn chat_send(&self, thread_id: &str, message: &str) -> Result<()> {
        self.runtime
            .block_on(self.inner.chat_send(thread_id, message))
    }

    pub fn chat_delete(&self, thread_id: &str) -> Result<()> {
        self.runtime.block_on(self.inner.chat_delete(thread_id))
    }

    pub fn friends(&self, uid: &str) -> Result<Vec<FriendEntry>> {
        self.runtime.block_on(self.inner.friends(uid))
    }

    pub fn friend_add(&self, uid: &str) -> Result<()> {
        self.runtime.block_on(self.inner.friend_add(uid))
    }

    pub fn friend_remove(&self, uid: &str) -> Result<()> {
        self.runtime.block_on(self.inner.friend_remove(uid))
    }

    pub fn albums(&self, uid: &str) -> Result<Vec<Album>> {
        self.runtime.block_on(self.inner.albums(uid))
    }

    pub fn pictures(&self, uid: &str, aid: &str) -> Result<Vec<Picture>> {
        self.runtime.block_on(self.inner.pictures(uid, aid))
    }
}

/// Blocking iterator over search results.
///
/// Finite and non-restartable; dropping it abandons the remaining pages.
pub struct SearchIter<'a> {
    runtime: &'a Runtime,
    stream: BoxStream<'a, Result<SearchResult>>,
}

impl Iterator for SearchIter<'_> {
    type Item = Result<SearchResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}
