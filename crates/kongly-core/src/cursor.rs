// ── Paginated traversal ──
//
// Walks a collection page by page, following the opaque cursor returned
// with each page until the gateway stops returning one. Nothing is
// fetched until the caller asks for it.

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::TryStreamExt;
use tracing::trace;

use crate::error::CoreError;
use crate::model::{Page, Resource};
use crate::resources::ResourceClient;

/// Restartable, lazy walk over every resource in a collection.
///
/// There is no snapshot isolation: resources created or deleted while a
/// traversal is in progress may or may not be seen.
#[derive(Debug, Clone)]
pub struct PageCursor {
    client: ResourceClient,
    page_size: u32,
    start: Option<String>,
    position: Option<String>,
    finished: bool,
}

impl PageCursor {
    pub fn new(client: ResourceClient, page_size: u32) -> Self {
        Self {
            client,
            page_size,
            start: None,
            position: None,
            finished: false,
        }
    }

    /// Resume a traversal from a cursor saved with [`position`](Self::position).
    #[must_use]
    pub fn starting_at(mut self, cursor: impl Into<String>) -> Self {
        let cursor = cursor.into();
        self.start = Some(cursor.clone());
        self.position = Some(cursor);
        self
    }

    /// Cursor of the next page to fetch; `None` before the first page or
    /// after the last.
    pub fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Rewind to where this cursor started.
    pub fn restart(&mut self) {
        self.position.clone_from(&self.start);
        self.finished = false;
    }

    /// Fetch the next page, or `None` once the last page has been seen.
    pub async fn next_page(&mut self) -> Result<Option<Page>, CoreError> {
        if self.finished {
            return Ok(None);
        }

        let page = self
            .client
            .list(self.page_size, self.position.as_deref())
            .await?;

        if page.cursor.is_some() && page.cursor == self.position {
            return Err(CoreError::Deserialization {
                kind: self.client.kind(),
                message: format!(
                    "listing did not advance: cursor {:?} returned twice",
                    self.position.as_deref().unwrap_or_default()
                ),
            });
        }

        trace!(
            kind = %self.client.kind(),
            next = ?page.cursor,
            "page fetched"
        );
        self.position.clone_from(&page.cursor);
        self.finished = page.cursor.is_none();
        Ok(Some(page))
    }

    /// Yield every remaining resource, fetching pages on demand.
    pub fn into_stream(self) -> impl Stream<Item = Result<Resource, CoreError>> + Send {
        try_stream! {
            let mut cursor = self;
            while let Some(page) = cursor.next_page().await? {
                for resource in page.resources {
                    yield resource;
                }
            }
        }
    }

    /// Drain the traversal into memory.
    pub async fn collect_all(self) -> Result<Vec<Resource>, CoreError> {
        self.into_stream().try_collect().await
    }
}
