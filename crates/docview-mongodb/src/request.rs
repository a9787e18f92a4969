//! Request descriptors handed to the execution engine
//!
//! One terminal call on a view produces exactly one [`Request`]. Each variant
//! carries everything the engine needs, so the engine never looks back at the
//! view that built it.

use bson::Document as BsonDocument;
use mongodb::options::WriteConcern;

use crate::params::RequestParameters;

/// A fully specified, submission-ready operation
#[derive(Debug, Clone)]
pub enum Request {
    /// Count matching documents
    Count {
        filter: BsonDocument,
        skip: u64,
        limit: u64,
    },

    /// Open a cursor over matching documents
    Read { params: RequestParameters },

    /// Insert one or more documents
    Insert {
        documents: Vec<BsonDocument>,
        write_concern: Option<WriteConcern>,
    },

    /// Apply an update document to one (`multi == false`) or all matches
    Update {
        filter: BsonDocument,
        update: BsonDocument,
        upsert: bool,
        multi: bool,
        write_concern: Option<WriteConcern>,
    },

    /// Replace a single matching document
    Replace {
        filter: BsonDocument,
        replacement: BsonDocument,
        upsert: bool,
        write_concern: Option<WriteConcern>,
    },

    /// Remove one (`multi == false`) or all matching documents
    Remove {
        filter: BsonDocument,
        multi: bool,
        write_concern: Option<WriteConcern>,
    },

    /// Atomically update one document and return it
    FindAndUpdate {
        filter: BsonDocument,
        update: BsonDocument,
        projection: Option<BsonDocument>,
        sort: Option<BsonDocument>,
        upsert: bool,
        return_new: bool,
        write_concern: Option<WriteConcern>,
    },

    /// Atomically replace one document and return it
    FindAndReplace {
        filter: BsonDocument,
        replacement: BsonDocument,
        projection: Option<BsonDocument>,
        sort: Option<BsonDocument>,
        upsert: bool,
        return_new: bool,
        write_concern: Option<WriteConcern>,
    },

    /// Atomically remove one document and return it
    FindAndRemove {
        filter: BsonDocument,
        projection: Option<BsonDocument>,
        sort: Option<BsonDocument>,
        write_concern: Option<WriteConcern>,
    },
}

impl Request {
    /// Short operation name used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Count { .. } => "count",
            Request::Read { .. } => "read",
            Request::Insert { .. } => "insert",
            Request::Update { .. } => "update",
            Request::Replace { .. } => "replace",
            Request::Remove { .. } => "remove",
            Request::FindAndUpdate { .. } => "find_and_update",
            Request::FindAndReplace { .. } => "find_and_replace",
            Request::FindAndRemove { .. } => "find_and_remove",
        }
    }

    /// True for requests that route by read preference rather than write concern
    pub fn is_read(&self) -> bool {
        matches!(self, Request::Count { .. } | Request::Read { .. })
    }
}
