//! Page aggregation for listing endpoints
//!
//! Listings are paginated by absolute, zero-based page index. The aggregator
//! walks the indices in ascending order and concatenates page contents,
//! re-reading `total_pages` from every page because some endpoints
//! re-paginate while they are being traversed.

use std::future::Future;

use bankpartner_domain::{Page, Result};
use tracing::trace;

use crate::ports::PageSource;

/// Fetch every page through `fetch_page` and return the elements in order.
///
/// Page 0 is always requested. Traversal continues while the next index is
/// below the `total_pages` reported by the most recently fetched page, so a
/// listing reporting zero pages costs exactly one call. The first failure is
/// returned unchanged and no further page is requested.
///
/// The aggregator keeps no state between calls and can be re-run for the
/// same query.
pub async fn collect_all<T, E, F, Fut>(mut fetch_page: F) -> std::result::Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut index: u32 = 0;

    loop {
        let page = fetch_page(index).await?;
        let total_pages = page.total_pages;
        trace!(index, total_pages, elements = page.content.len(), "fetched page");

        items.extend(page.content);
        index += 1;

        if index >= total_pages {
            break;
        }
    }

    Ok(items)
}

/// [`collect_all`] over a [`PageSource`]
pub async fn collect_source<T, S>(source: &S) -> Result<Vec<T>>
where
    T: Send,
    S: PageSource<T> + ?Sized,
{
    collect_all(move |index| source.fetch_page(index)).await
}
