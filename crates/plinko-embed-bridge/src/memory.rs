//! In-memory host page for tests and native simulation
//!
//! Stands in for the browser page where no DOM exists: location and nesting
//! are scriptable, the clock is manual, and every outgoing post is recorded.
//! Clones share their recording buffer, so a test can keep a handle after
//! moving the host into a bridge.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use plinko_embed_core::{EmbedError, Result};
use serde_json::Value;

use crate::host::{FrameNesting, HostPage};

/// A message recorded by [`MemoryHost`]
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    /// The posted data
    pub data: Value,
    /// Origin the post was restricted to
    pub target_origin: String,
}

/// Scriptable in-memory [`HostPage`]
#[derive(Debug, Clone)]
pub struct MemoryHost {
    browser: bool,
    search: String,
    pathname: String,
    nesting: Rc<Cell<FrameNesting>>,
    now_ms: Rc<Cell<u64>>,
    fail_posts: Rc<Cell<bool>>,
    posted: Rc<RefCell<Vec<PostedMessage>>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            browser: true,
            search: String::new(),
            pathname: "/".into(),
            nesting: Rc::new(Cell::new(FrameNesting::TopLevel)),
            now_ms: Rc::new(Cell::new(0)),
            fail_posts: Rc::new(Cell::new(false)),
            posted: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl MemoryHost {
    /// Browser page at the top level with an empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-browser rendering context (e.g. server-side rendering).
    pub fn non_browser() -> Self {
        Self {
            browser: false,
            ..Self::default()
        }
    }

    /// Set the raw query string.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Set the location path.
    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    /// Set the frame nesting.
    pub fn with_nesting(self, nesting: FrameNesting) -> Self {
        self.nesting.set(nesting);
        self
    }

    /// Change the frame nesting of this host and all its clones.
    pub fn set_nesting(&self, nesting: FrameNesting) {
        self.nesting.set(nesting);
    }

    /// Set the wall clock.
    pub fn set_now_ms(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    /// Make every subsequent post fail with a transport error.
    pub fn fail_posts(&self, fail: bool) {
        self.fail_posts.set(fail);
    }

    /// Everything posted to the parent so far.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.borrow().clone()
    }

    /// Drop the recorded posts.
    pub fn clear_posted(&self) {
        self.posted.borrow_mut().clear();
    }
}

impl HostPage for MemoryHost {
    fn is_browser(&self) -> bool {
        self.browser
    }

    fn search(&self) -> String {
        self.search.clone()
    }

    fn pathname(&self) -> String {
        self.pathname.clone()
    }

    fn frame_nesting(&self) -> FrameNesting {
        self.nesting.get()
    }

    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn post_to_parent(&self, data: &Value, target_origin: &str) -> Result<()> {
        if self.fail_posts.get() {
            return Err(EmbedError::Transport("parent frame unavailable".into()));
        }
        self.posted.borrow_mut().push(PostedMessage {
            data: data.clone(),
            target_origin: target_origin.into(),
        });
        Ok(())
    }
}
