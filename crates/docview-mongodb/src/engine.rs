//! MongoDB-backed execution engine
//!
//! Maps each [`Request`] variant onto the matching driver call on a single
//! collection. Cursor cleanup, retries and server selection stay with the
//! driver.

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use docview_common::{DocViewError, Result};
use futures::stream::{StreamExt, TryStreamExt};
use mongodb::options::{
    CountOptions, DeleteOptions, FindOneAndDeleteOptions, FindOneAndReplaceOptions,
    FindOneAndUpdateOptions, FindOptions, InsertManyOptions, ReadPreference, ReplaceOptions,
    ReturnDocument, SelectionCriteria, UpdateOptions,
};
use mongodb::{Collection, Database};
use tracing::instrument;

use crate::dispatch::{DeleteOutcome, Engine, InsertOutcome, Reply, UpdateOutcome};
use crate::params::RequestParameters;
use crate::request::Request;
use crate::validation::ValidatedCollectionName;

/// [`Engine`] bound to one MongoDB collection
#[derive(Clone)]
pub struct MongoEngine {
    collection: Collection<BsonDocument>,
}

impl MongoEngine {
    pub fn new(collection: Collection<BsonDocument>) -> Self {
        Self { collection }
    }

    /// Engine for `name` in `database`
    pub fn for_collection(database: &Database, name: &ValidatedCollectionName) -> Self {
        Self::new(database.collection(name.as_str()))
    }

    /// Get the collection name
    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }
}

#[async_trait]
impl Engine for MongoEngine {
    #[instrument(skip_all, fields(collection = %self.collection.name(), kind = request.kind()))]
    async fn submit(
        &self,
        request: Request,
        read_preference: Option<ReadPreference>,
    ) -> Result<Reply> {
        let selection_criteria = read_preference.map(SelectionCriteria::ReadPreference);

        match request {
            Request::Count {
                filter,
                skip,
                limit,
            } => {
                let mut options = CountOptions::default();
                options.skip = positive(skip);
                options.limit = positive(limit);
                options.selection_criteria = selection_criteria;

                let n = self
                    .collection
                    .count_documents(filter)
                    .with_options(options)
                    .await?;
                Ok(Reply::Count(n))
            }

            Request::Read { params } => {
                let filter = params.filter().clone();
                let mut options = find_options(&params);
                options.selection_criteria = selection_criteria;

                let cursor = self.collection.find(filter).with_options(options).await?;
                Ok(Reply::Cursor(cursor.map_err(DocViewError::from).boxed()))
            }

            Request::Insert {
                documents,
                write_concern,
            } => {
                let mut options = InsertManyOptions::default();
                options.write_concern = write_concern;

                let result = self
                    .collection
                    .insert_many(documents)
                    .with_options(options)
                    .await?;

                let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
                ids.sort_by_key(|(index, _)| *index);
                Ok(Reply::Inserted(InsertOutcome {
                    inserted_ids: ids.into_iter().map(|(_, id)| id).collect(),
                }))
            }

            Request::Update {
                filter,
                update,
                upsert,
                multi,
                write_concern,
            } => {
                let mut options = UpdateOptions::default();
                options.upsert = Some(upsert);
                options.write_concern = write_concern;

                let result = if multi {
                    self.collection
                        .update_many(filter, update)
                        .with_options(options)
                        .await?
                } else {
                    self.collection
                        .update_one(filter, update)
                        .with_options(options)
                        .await?
                };
                Ok(Reply::Updated(UpdateOutcome {
                    matched_count: result.matched_count,
                    modified_count: result.modified_count,
                    upserted_id: result.upserted_id,
                }))
            }

            Request::Replace {
                filter,
                replacement,
                upsert,
                write_concern,
            } => {
                let mut options = ReplaceOptions::default();
                options.upsert = Some(upsert);
                options.write_concern = write_concern;

                let result = self
                    .collection
                    .replace_one(filter, replacement)
                    .with_options(options)
                    .await?;
                Ok(Reply::Updated(UpdateOutcome {
                    matched_count: result.matched_count,
                    modified_count: result.modified_count,
                    upserted_id: result.upserted_id,
                }))
            }

            Request::Remove {
                filter,
                multi,
                write_concern,
            } => {
                let mut options = DeleteOptions::default();
                options.write_concern = write_concern;

                let result = if multi {
                    self.collection
                        .delete_many(filter)
                        .with_options(options)
                        .await?
                } else {
                    self.collection
                        .delete_one(filter)
                        .with_options(options)
                        .await?
                };
                Ok(Reply::Deleted(DeleteOutcome {
                    deleted_count: result.deleted_count,
                }))
            }

            Request::FindAndUpdate {
                filter,
                update,
                projection,
                sort,
                upsert,
                return_new,
                write_concern,
            } => {
                let mut options = FindOneAndUpdateOptions::default();
                options.projection = projection;
                options.sort = sort;
                options.upsert = Some(upsert);
                options.return_document = Some(return_document(return_new));
                options.write_concern = write_concern;

                let doc = self
                    .collection
                    .find_one_and_update(filter, update)
                    .with_options(options)
                    .await?;
                Ok(Reply::Document(doc))
            }

            Request::FindAndReplace {
                filter,
                replacement,
                projection,
                sort,
                upsert,
                return_new,
                write_concern,
            } => {
                let mut options = FindOneAndReplaceOptions::default();
                options.projection = projection;
                options.sort = sort;
                options.upsert = Some(upsert);
                options.return_document = Some(return_document(return_new));
                options.write_concern = write_concern;

                let doc = self
                    .collection
                    .find_one_and_replace(filter, replacement)
                    .with_options(options)
                    .await?;
                Ok(Reply::Document(doc))
            }

            Request::FindAndRemove {
                filter,
                projection,
                sort,
                write_concern,
            } => {
                let mut options = FindOneAndDeleteOptions::default();
                options.projection = projection;
                options.sort = sort;
                options.write_concern = write_concern;

                let doc = self
                    .collection
                    .find_one_and_delete(filter)
                    .with_options(options)
                    .await?;
                Ok(Reply::Document(doc))
            }
        }
    }
}

/// Driver find options for the given parameters (read preference excluded)
pub fn find_options(params: &RequestParameters) -> FindOptions {
    let cursor = params.cursor_options();
    let mut options = FindOptions::default();
    options.projection = params.projection().cloned();
    options.sort = params.sort().cloned();
    options.skip = positive(params.skip());
    options.limit = positive(params.limit()).map(|l| i64::try_from(l).unwrap_or(i64::MAX));
    options.batch_size = cursor.batch_size;
    options.no_cursor_timeout = cursor.no_cursor_timeout;
    options.allow_partial_results = cursor.allow_partial_results;
    options.max_time = cursor.max_time;
    options.comment = cursor.comment.clone();
    options
}

// 0 means "unset" for both skip and limit
fn positive(n: u64) -> Option<u64> {
    (n > 0).then_some(n)
}

fn return_document(return_new: bool) -> ReturnDocument {
    if return_new {
        ReturnDocument::After
    } else {
        ReturnDocument::Before
    }
}
