//! Scope guard for an open run page.

use super::Session;
use crate::error::Result;
use crate::models::{PageInfo, PageStatus};
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// An open run page. Dereferences to the owning [`Session`], so logging calls go
/// through the guard (`page.log_param(..)`), and nested pages can be started from
/// it.
///
/// Dropping the guard without calling [`finish`](Self::finish) ends the page as
/// `failed`; this covers early returns through `?` and panics.
pub struct ActivePage<'s> {
    session: &'s mut Session,
    page: PageInfo,
    finished: bool,
}

impl<'s> ActivePage<'s> {
    pub(super) fn new(session: &'s mut Session, page: PageInfo) -> Self {
        Self {
            session,
            page,
            finished: false,
        }
    }

    /// The page as created
    pub fn page(&self) -> &PageInfo {
        &self.page
    }

    pub fn id(&self) -> &str {
        &self.page.id
    }

    /// Whether the page is still on the session's stack
    pub fn is_open(&self) -> bool {
        self.session.is_open(&self.page.id)
    }

    /// End the page with `status`. A page already ended through
    /// [`Session::end_page`] keeps its status and is returned as stored.
    pub fn finish(mut self, status: PageStatus) -> Result<PageInfo> {
        self.finished = true;
        match self.session.finish_page(&self.page.id, status)? {
            Some(page) => Ok(page),
            None => self.session.client.get_page(&self.page.id),
        }
    }

    /// End the page as `success`
    pub fn success(self) -> Result<PageInfo> {
        self.finish(PageStatus::Success)
    }
}

impl Deref for ActivePage<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for ActivePage<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for ActivePage<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = self.session.finish_page(&self.page.id, PageStatus::Failed) {
            warn!(page_id = %self.page.id, error = %e, "Failed to finalize page");
        }
    }
}
