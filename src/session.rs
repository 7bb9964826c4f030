//! Run Sessions
//!
//! A [`Session`] tracks which database new runs go into and which run pages are
//! open. Open pages form a stack: the innermost page is the implicit target of
//! param, metric, tag and artifact logging, and nested scopes push and pop in
//! order.
//!
//! A session is single-owner state; share one across threads only behind your own
//! synchronization, and never drive two sessions' page stacks for the same run.

use crate::client::{DatabaseCreated, NotionFlowClient};
use crate::error::{ApiError, Result};
use crate::models::{DatabaseInfo, PageInfo, PageStatus, ParamValue, SelectColor};
use std::path::Path;
use tracing::{info, warn};

mod guard;

pub use guard::ActivePage;

/// Page stack and active database over a tracking client
pub struct Session {
    client: NotionFlowClient,
    pages: Vec<PageInfo>,
    active_database_id: Option<String>,
}

impl Session {
    pub fn new(client: NotionFlowClient) -> Self {
        Self {
            client,
            pages: Vec::new(),
            active_database_id: None,
        }
    }

    /// Session over a client configured from the config file and environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(NotionFlowClient::from_env()?))
    }

    pub fn client(&self) -> &NotionFlowClient {
        &self.client
    }

    pub fn active_database_id(&self) -> Option<&str> {
        self.active_database_id.as_deref()
    }

    /// Innermost open page, as it was when the page was started
    pub fn active_page(&self) -> Option<&PageInfo> {
        self.pages.last()
    }

    /// Number of open pages
    pub fn depth(&self) -> usize {
        self.pages.len()
    }

    /// Create a run database and make it the active database. The database is
    /// selected even when it did not become ready within the polling budget.
    pub fn create_database<P, M>(
        &mut self,
        title: &str,
        params: &[(P, P)],
        metrics: &[(M, M)],
    ) -> Result<DatabaseCreated>
    where
        P: AsRef<str>,
        M: AsRef<str>,
    {
        let created = self.client.create_database(title, params, metrics)?;
        if !created.ready {
            warn!(database_id = %created.id, "Selecting database that is not ready yet");
        }
        self.active_database_id = Some(created.id.clone());
        Ok(created)
    }

    /// Select the active database by name or by id; exactly one must be given.
    pub fn set_database(&mut self, name: Option<&str>, id: Option<&str>) -> Result<DatabaseInfo> {
        let info = match (name, id) {
            (Some(_), Some(_)) | (None, None) => {
                return Err(ApiError::InvalidArgument(
                    "exactly one of database name or database id must be given".to_string(),
                ))
            }
            (Some(name), None) => self
                .client
                .get_database_by_name(name)?
                .ok_or_else(|| ApiError::DatabaseNotFound(name.to_string()))?,
            (None, Some(id)) => self.client.get_database(id)?,
        };
        info!(database_id = %info.id, "Selected database");
        self.active_database_id = Some(info.id.clone());
        Ok(info)
    }

    /// Create a page in `database_id` (or the active database) and open it.
    ///
    /// The returned guard ends the page when it goes out of scope: explicitly via
    /// [`ActivePage::finish`], or as `failed` when dropped unfinished.
    pub fn start_page(
        &mut self,
        database_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<ActivePage<'_>> {
        let database_id = database_id
            .map(str::to_string)
            .or_else(|| self.active_database_id.clone())
            .ok_or(ApiError::UnresolvedParent)?;
        let page = self.client.add_empty_page(&database_id, name)?;
        self.pages.push(page.clone());
        info!(page_id = %page.id, depth = self.pages.len(), "Started page");
        Ok(ActivePage::new(self, page))
    }

    /// Run `body` inside a new page scope. The page ends `success` when `body`
    /// returns `Ok`, and `failed` when it returns `Err` or panics; the body's error
    /// is returned unchanged. A page the body ended itself keeps its status.
    pub fn run_page<T, E, F>(
        &mut self,
        database_id: Option<&str>,
        name: Option<&str>,
        body: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut ActivePage<'_>) -> std::result::Result<T, E>,
        E: From<ApiError>,
    {
        let mut page = self.start_page(database_id, name)?;
        match body(&mut page) {
            Ok(value) => {
                page.finish(PageStatus::Success)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(finish_err) = page.finish(PageStatus::Failed) {
                    warn!(error = %finish_err, "Failed to mark page as failed");
                }
                Err(err)
            }
        }
    }

    fn top(&self) -> Result<&PageInfo> {
        self.pages.last().ok_or(ApiError::EmptyStack)
    }

    pub fn log_param(&self, key: &str, value: impl Into<ParamValue>) -> Result<PageInfo> {
        self.client.log_param(&self.top()?.id, key, value)
    }

    pub fn log_metric(&self, key: &str, value: f64, step: Option<u64>) -> Result<PageInfo> {
        self.client.log_metric(&self.top()?.id, key, value, step)
    }

    pub fn log_metrics<K: AsRef<str>>(
        &self,
        values: &[(K, f64)],
        step: Option<u64>,
    ) -> Result<PageInfo> {
        self.client.log_metrics(&self.top()?.id, values, step)
    }

    pub fn set_tag(&self, tag: &str, color: Option<SelectColor>) -> Result<PageInfo> {
        self.client.set_tag(&self.top()?.id, tag, color)
    }

    pub fn log_artifact(&self, local_path: &Path) -> Result<PageInfo> {
        self.client.log_artifact(&self.top()?.id, local_path)
    }

    /// Pop the innermost page and set its status
    pub fn end_page(&mut self, status: PageStatus) -> Result<PageInfo> {
        let page = self.pages.pop().ok_or(ApiError::EmptyStack)?;
        info!(page_id = %page.id, %status, depth = self.pages.len(), "Ended page");
        self.client.set_status(&page.id, status)
    }

    fn is_open(&self, page_id: &str) -> bool {
        self.pages.iter().any(|page| page.id == page_id)
    }

    /// End `page_id` if it is still the innermost page. `Ok(None)` when the page
    /// was already ended.
    fn finish_page(&mut self, page_id: &str, status: PageStatus) -> Result<Option<PageInfo>> {
        if !self.is_open(page_id) {
            return Ok(None);
        }
        match self.pages.last() {
            Some(top) if top.id == page_id => self.end_page(status).map(Some),
            _ => Err(ApiError::InvalidArgument(format!(
                "page {} is not the active page",
                page_id
            ))),
        }
    }
}
