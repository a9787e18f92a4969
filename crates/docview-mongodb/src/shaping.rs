//! Result shaping for read verbs
//!
//! An engine cursor becomes one of three shapes: a typed stream (`read`),
//! a single ordered `Vec` (`list`), or the first element if any (`one`).
//! Element order is always the order the engine delivered.

use docview_common::{DocViewError, Result};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

use crate::dispatch::DocumentStream;
use crate::document::decode;

/// Typed, forward-only stream of decoded entities
///
/// Dropping the stream cancels it. It ends either after the last element
/// or with exactly one `Err` item.
pub type EntityStream<T> = BoxStream<'static, Result<T>>;

/// Decode each delivered document, stopping at the first failure
pub fn entity_stream<T>(documents: DocumentStream) -> EntityStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    documents
        .and_then(|doc| futures::future::ready(decode::<T>(doc)))
        .scan(false, |failed, item| {
            if *failed {
                return futures::future::ready(None);
            }
            *failed = item.is_err();
            futures::future::ready(Some(item))
        })
        .boxed()
}

/// Fold the stream into one `Vec`, preserving arrival order
///
/// With `cap` set, more than `cap` elements fail the whole list with
/// `InvalidState` and the rest of the stream is dropped.
pub async fn collect_list<T>(mut stream: EntityStream<T>, cap: Option<usize>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    while let Some(item) = stream.try_next().await? {
        if let Some(cap) = cap {
            if items.len() >= cap {
                return Err(DocViewError::InvalidState(format!(
                    "list() result exceeded the configured cap of {} elements",
                    cap
                )));
            }
        }
        items.push(item);
    }
    Ok(items)
}

/// First element of the stream, or `None` if it completed empty
///
/// Stops polling after the first element; the stream is dropped right
/// away so the engine can release its cursor.
pub async fn first_or_none<T>(mut stream: EntityStream<T>) -> Result<Option<T>> {
    stream.try_next().await
}
