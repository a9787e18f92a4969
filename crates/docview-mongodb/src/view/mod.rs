//! Typed, immutable views over a collection
//!
//! A [`View`] accumulates filter, sort, projection, paging and write settings
//! through chained calls, each returning a new view. A terminal call then
//! translates the view into exactly one [`Request`], dispatches it and shapes
//! the reply.
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//!
//! let active = connection.view::<User>().filter(doc! { "active": true });
//! let newest = active.sort(doc! { "created_at": -1 }).limit(10)?;
//!
//! let page: Vec<User> = newest.list().await?;
//! let total = active.count().await?;
//! let renamed = active
//!     .filter(doc! { "email": "a@example.com" })
//!     .update_one_and_get(doc! { "$set": { "name": "Ada" } })
//!     .await?;
//! ```

mod state;
mod translate;

pub use state::ViewState;
pub use translate::multi_for_limit;

use std::marker::PhantomData;
use std::sync::Arc;

use bson::Document as BsonDocument;
use docview_common::Result;
use mongodb::options::{ReadPreference, WriteConcern};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::dispatch::{DeleteOutcome, Dispatcher, Engine, InsertOutcome, UpdateOutcome};
use crate::document::{decode, encode};
use crate::params::CursorOptions;
use crate::request::Request;
use crate::shaping::{collect_list, entity_stream, first_or_none, EntityStream};

/// Which path `save` took
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The entity had no `_id` and was inserted
    Inserted(InsertOutcome),
    /// The entity had an `_id` and was upsert-replaced by it
    Replaced(UpdateOutcome),
}

/// Immutable query/command builder for entities of type `T`
pub struct View<T> {
    state: ViewState,
    dispatcher: Dispatcher,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            dispatcher: self.dispatcher.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for View<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View").field("state", &self.state).finish()
    }
}

impl<T> View<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    /// View over every document the engine's collection holds
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_state(engine, ViewState::new())
    }

    pub fn with_state(engine: Arc<dyn Engine>, state: ViewState) -> Self {
        Self {
            state,
            dispatcher: Dispatcher::new(engine),
            _entity: PhantomData,
        }
    }

    /// Current builder state
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn derive(&self, state: ViewState) -> Self {
        Self {
            state,
            dispatcher: self.dispatcher.clone(),
            _entity: PhantomData,
        }
    }

    // ========== Chain Methods ==========

    pub fn filter(&self, filter: BsonDocument) -> Self {
        self.derive(self.state.filter(filter))
    }

    pub fn sort(&self, sort: BsonDocument) -> Self {
        self.derive(self.state.sort(sort))
    }

    pub fn project(&self, projection: BsonDocument) -> Self {
        self.derive(self.state.project(projection))
    }

    pub fn with_cursor_options(&self, options: CursorOptions) -> Self {
        self.derive(self.state.with_cursor_options(options))
    }

    /// # Errors
    /// `InvalidArgument` if `n` is negative; no new view is produced.
    pub fn skip(&self, n: i64) -> Result<Self> {
        Ok(self.derive(self.state.skip(n)?))
    }

    /// Limit the number of documents; 0 means no limit
    ///
    /// # Errors
    /// `InvalidArgument` if `n` is negative; no new view is produced.
    pub fn limit(&self, n: i64) -> Result<Self> {
        Ok(self.derive(self.state.limit(n)?))
    }

    pub fn with_write_concern(&self, write_concern: WriteConcern) -> Self {
        self.derive(self.state.with_write_concern(write_concern))
    }

    pub fn with_read_preference(&self, read_preference: ReadPreference) -> Self {
        self.derive(self.state.with_read_preference(read_preference))
    }

    /// Make updates and replaces issued from the returned view upserts
    pub fn request_upsert(&self) -> Self {
        self.derive(self.state.request_upsert())
    }

    /// Cap how many elements `list()` buffers before failing
    pub fn with_list_cap(&self, cap: usize) -> Self {
        self.derive(self.state.with_list_cap(Some(cap)))
    }

    pub fn without_list_cap(&self) -> Self {
        self.derive(self.state.with_list_cap(None))
    }

    // ========== Reads ==========

    pub async fn count(&self) -> Result<u64> {
        let request = self.state.count_request();
        self.dispatcher.count(request, self.read_preference()).await
    }

    /// Stream matching entities in server order
    ///
    /// Nothing is submitted until the stream is first polled; submission and
    /// decode failures arrive as the stream's last item.
    pub fn read(&self) -> EntityStream<T> {
        let request = self.state.read_request();
        entity_stream(self.dispatcher.cursor(request, self.read_preference()))
    }

    /// All matching entities, in server order, as one value
    pub async fn list(&self) -> Result<Vec<T>> {
        collect_list(self.read(), self.state.list_cap()).await
    }

    /// First matching entity, if any
    pub async fn one(&self) -> Result<Option<T>> {
        let request = self.state.one_request();
        let stream = entity_stream(self.dispatcher.cursor(request, self.read_preference()));
        first_or_none(stream).await
    }

    // ========== Writes ==========

    pub async fn insert(&self, entity: &T) -> Result<InsertOutcome> {
        let request = self.state.insert_request(vec![encode(entity)?]);
        self.dispatcher.insert(request).await
    }

    pub async fn insert_many(&self, entities: &[T]) -> Result<InsertOutcome> {
        let documents = entities.iter().map(encode).collect::<Result<Vec<_>>>()?;
        let request = self.state.insert_request(documents);
        self.dispatcher.insert(request).await
    }

    /// Insert `entity`, or upsert-replace it by `_id` when it has one
    pub async fn save(&self, entity: &T) -> Result<SaveOutcome> {
        let request = self.state.save_request(encode(entity)?);
        match request {
            Request::Insert { .. } => Ok(SaveOutcome::Inserted(
                self.dispatcher.insert(request).await?,
            )),
            _ => Ok(SaveOutcome::Replaced(self.dispatcher.update(request).await?)),
        }
    }

    /// Update every match (no limit) or one match (limit 1)
    ///
    /// # Errors
    /// `InvalidState` for any other limit, before anything is submitted.
    pub async fn update(&self, update: BsonDocument) -> Result<UpdateOutcome> {
        let request = self.checked(self.state.update_request(update))?;
        self.dispatcher.update(request).await
    }

    pub async fn update_one(&self, update: BsonDocument) -> Result<UpdateOutcome> {
        let request = self.state.update_one_request(update);
        self.dispatcher.update(request).await
    }

    pub async fn replace(&self, replacement: &T) -> Result<UpdateOutcome> {
        let request = self.state.replace_request(encode(replacement)?);
        self.dispatcher.update(request).await
    }

    /// Remove every match (no limit) or one match (limit 1)
    ///
    /// # Errors
    /// `InvalidState` for any other limit, before anything is submitted.
    pub async fn remove(&self) -> Result<DeleteOutcome> {
        let request = self.checked(self.state.remove_request())?;
        self.dispatcher.delete(request).await
    }

    pub async fn remove_one(&self) -> Result<DeleteOutcome> {
        let request = self.state.remove_one_request();
        self.dispatcher.delete(request).await
    }

    // ========== Find And Modify ==========
    //
    // "Nothing matched" is Ok(None) for every variant.

    /// Update one match and return it as it is after the update
    pub async fn update_one_and_get(&self, update: BsonDocument) -> Result<Option<T>> {
        self.find_and_modify(self.state.find_and_update_request(update, true))
            .await
    }

    /// Update one match and return it as it was before the update
    pub async fn get_one_and_update(&self, update: BsonDocument) -> Result<Option<T>> {
        self.find_and_modify(self.state.find_and_update_request(update, false))
            .await
    }

    /// Replace one match and return the replacement as stored
    pub async fn replace_one_and_get(&self, replacement: &T) -> Result<Option<T>> {
        let request = self
            .state
            .find_and_replace_request(encode(replacement)?, true);
        self.find_and_modify(request).await
    }

    /// Replace one match and return the document it replaced
    pub async fn get_one_and_replace(&self, replacement: &T) -> Result<Option<T>> {
        let request = self
            .state
            .find_and_replace_request(encode(replacement)?, false);
        self.find_and_modify(request).await
    }

    /// Remove one match and return it
    pub async fn get_one_and_remove(&self) -> Result<Option<T>> {
        self.find_and_modify(self.state.find_and_remove_request())
            .await
    }

    async fn find_and_modify(&self, request: Request) -> Result<Option<T>> {
        self.dispatcher
            .document(request)
            .await?
            .map(decode)
            .transpose()
    }

    fn read_preference(&self) -> Option<ReadPreference> {
        self.state.read_preference().cloned()
    }

    fn checked(&self, request: Result<Request>) -> Result<Request> {
        request.map_err(|e| {
            debug!(
                limit = self.state.params().limit(),
                limit_explicitly_set = self.state.limit_explicitly_set(),
                error = %e,
                "Rejected before dispatch"
            );
            e
        })
    }
}
