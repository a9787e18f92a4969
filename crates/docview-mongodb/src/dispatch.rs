//! Execution engine contract and the dispatch adapter
//!
//! The view never talks to the network itself. It hands one [`Request`] to
//! an [`Engine`] and gets back a [`Reply`]; the [`Dispatcher`] checks that
//! the reply kind matches the request kind and forwards engine failures
//! untouched.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use docview_common::{DocViewError, Result};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use mongodb::options::ReadPreference;
use tracing::{debug, instrument, warn};

use crate::request::Request;

/// Raw documents delivered by an engine cursor, in server order
pub type DocumentStream = BoxStream<'static, Result<BsonDocument>>;

/// Ids assigned to inserted documents, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    pub inserted_ids: Vec<Bson>,
}

/// Outcome of an update or replace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Bson>,
}

/// Outcome of a remove
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// What an engine returns for one submitted request
pub enum Reply {
    Count(u64),
    Cursor(DocumentStream),
    Inserted(InsertOutcome),
    Updated(UpdateOutcome),
    Deleted(DeleteOutcome),
    /// Find-and-modify result; `None` when nothing matched
    Document(Option<BsonDocument>),
}

impl Reply {
    fn kind(&self) -> &'static str {
        match self {
            Reply::Count(_) => "count",
            Reply::Cursor(_) => "cursor",
            Reply::Inserted(_) => "inserted",
            Reply::Updated(_) => "updated",
            Reply::Deleted(_) => "deleted",
            Reply::Document(_) => "document",
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Count(n) => f.debug_tuple("Count").field(n).finish(),
            Reply::Cursor(_) => f.write_str("Cursor(..)"),
            Reply::Inserted(o) => f.debug_tuple("Inserted").field(o).finish(),
            Reply::Updated(o) => f.debug_tuple("Updated").field(o).finish(),
            Reply::Deleted(o) => f.debug_tuple("Deleted").field(o).finish(),
            Reply::Document(d) => f.debug_tuple("Document").field(d).finish(),
        }
    }
}

/// Executes requests against a database
///
/// Implementations encode the request, route it (honoring `read_preference`
/// for reads), decode the reply and own the server cursor lifecycle. A
/// returned cursor stream must release its server cursor when dropped.
/// Failures are reported through the returned `Result` or as the cursor
/// stream's terminal item, never by panicking.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn submit(
        &self,
        request: Request,
        read_preference: Option<ReadPreference>,
    ) -> Result<Reply>;
}

/// Hands requests to an engine and unwraps the expected reply kind
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<dyn Engine>,
}

impl Dispatcher {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    #[instrument(skip(self, request, read_preference), fields(kind = request.kind()))]
    pub async fn submit(
        &self,
        request: Request,
        read_preference: Option<ReadPreference>,
    ) -> Result<Reply> {
        debug!("Submitting request");
        match self.engine.submit(request, read_preference).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(error = %e, "Engine reported failure");
                Err(e)
            }
        }
    }

    pub async fn count(
        &self,
        request: Request,
        read_preference: Option<ReadPreference>,
    ) -> Result<u64> {
        match self.submit(request, read_preference).await? {
            Reply::Count(n) => Ok(n),
            other => Err(unexpected("count", &other)),
        }
    }

    /// Lazily submit a read; the stream's first poll performs the submission
    pub fn cursor(
        &self,
        request: Request,
        read_preference: Option<ReadPreference>,
    ) -> DocumentStream {
        let dispatcher = self.clone();
        stream::once(async move {
            match dispatcher.submit(request, read_preference).await? {
                Reply::Cursor(documents) => Ok(documents),
                other => Err(unexpected("cursor", &other)),
            }
        })
        .try_flatten()
        .boxed()
    }

    pub async fn insert(&self, request: Request) -> Result<InsertOutcome> {
        match self.submit(request, None).await? {
            Reply::Inserted(outcome) => {
                debug!(inserted = outcome.inserted_ids.len(), "Insert acknowledged");
                Ok(outcome)
            }
            other => Err(unexpected("inserted", &other)),
        }
    }

    pub async fn update(&self, request: Request) -> Result<UpdateOutcome> {
        match self.submit(request, None).await? {
            Reply::Updated(outcome) => {
                debug!(
                    matched = outcome.matched_count,
                    modified = outcome.modified_count,
                    upserted = outcome.upserted_id.is_some(),
                    "Update acknowledged"
                );
                Ok(outcome)
            }
            other => Err(unexpected("updated", &other)),
        }
    }

    pub async fn delete(&self, request: Request) -> Result<DeleteOutcome> {
        match self.submit(request, None).await? {
            Reply::Deleted(outcome) => {
                debug!(deleted = outcome.deleted_count, "Remove acknowledged");
                Ok(outcome)
            }
            other => Err(unexpected("deleted", &other)),
        }
    }

    pub async fn document(&self, request: Request) -> Result<Option<BsonDocument>> {
        match self.submit(request, None).await? {
            Reply::Document(doc) => Ok(doc),
            other => Err(unexpected("document", &other)),
        }
    }
}

fn unexpected(expected: &str, reply: &Reply) -> DocViewError {
    DocViewError::Internal(format!(
        "engine returned a {} reply where a {} reply was expected",
        reply.kind(),
        expected
    ))
}
