//! Cursor pagination sweeps.
//!
//! A sweep walks a connection page by page, folding each page into an
//! accumulator. The next cursor always comes from the page just absorbed, so
//! page order in the result is cursor order.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::shopify::{Connection, ShopifyError};

/// Arguments for one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub first: u32,
    /// Cursor of the previous page's last item; `None` for the first page.
    pub after: Option<String>,
}

/// How a sweep ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome<T> {
    /// Every page was read.
    Complete(T),
    /// The deadline passed; holds what was gathered before it.
    Truncated(T),
}

/// Reducer state for one sweep.
#[derive(Debug)]
pub struct Sweep<A> {
    acc: A,
    cursor: Option<String>,
    finished: bool,
    pages: u32,
    seen_cursors: HashSet<String>,
}

impl<A> Sweep<A> {
    pub fn new(acc: A) -> Self {
        Self {
            acc,
            cursor: None,
            finished: false,
            pages: 0,
            seen_cursors: HashSet::new(),
        }
    }

    /// The next page to request, or `None` once the last page is absorbed.
    #[must_use]
    pub fn next_request(&self, first: u32) -> Option<PageRequest> {
        (!self.finished).then(|| PageRequest {
            first,
            after: self.cursor.clone(),
        })
    }

    /// Fold a page into the accumulator and take its continuation state.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if the page claims a successor but has no
    /// cursor, or repeats a cursor already followed. Either would loop forever.
    pub fn absorb<T>(
        &mut self,
        page: Connection<T>,
        mut fold: impl FnMut(&mut A, T),
    ) -> Result<(), ShopifyError> {
        self.pages += 1;

        for item in page.items {
            fold(&mut self.acc, item);
        }

        if !page.page_info.has_next_page {
            self.finished = true;
            return Ok(());
        }

        let cursor = page.page_info.end_cursor.ok_or_else(|| {
            ShopifyError::MalformedResponse(format!(
                "page {} has a next page but no endCursor",
                self.pages
            ))
        })?;

        if !self.seen_cursors.insert(cursor.clone()) {
            return Err(ShopifyError::MalformedResponse(format!(
                "page {} repeated cursor {cursor}",
                self.pages
            )));
        }

        self.cursor = Some(cursor);
        Ok(())
    }

    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.pages
    }

    pub fn into_inner(self) -> A {
        self.acc
    }
}

/// Walk every page of a connection, stopping early at `budget`.
///
/// # Errors
///
/// Returns the first fetch error, or a reducer error from [`Sweep::absorb`].
pub async fn run<T, A, F, Fut>(
    collection: &'static str,
    page_size: u32,
    budget: Duration,
    acc: A,
    mut fetch: F,
    mut fold: impl FnMut(&mut A, T),
) -> Result<SweepOutcome<A>, ShopifyError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Connection<T>, ShopifyError>>,
{
    let deadline = Instant::now() + budget;
    let mut sweep = Sweep::new(acc);

    while let Some(request) = sweep.next_request(page_size) {
        let Ok(page) = timeout_at(deadline, fetch(request)).await else {
            warn!(
                collection,
                pages = sweep.pages(),
                budget_secs = budget.as_secs_f64(),
                "Sweep deadline reached, returning partial result"
            );
            return Ok(SweepOutcome::Truncated(sweep.into_inner()));
        };
        sweep.absorb(page?, &mut fold)?;
    }

    debug!(collection, pages = sweep.pages(), "Sweep complete");
    Ok(SweepOutcome::Complete(sweep.into_inner()))
}
