//! Terminal action translation
//!
//! Turns a [`ViewState`] plus a terminal verb into exactly one [`Request`].
//! Everything here is synchronous and pure: a failing translation means no
//! request exists, so nothing can reach the engine.

use bson::{doc, Document as BsonDocument};
use docview_common::{DocViewError, Result};

use super::state::ViewState;
use crate::document::{identity, ID_FIELD};
use crate::request::Request;

/// Derive the `multi` flag of a bulk update/remove from the current limit
///
/// Only "no limit" (all matches) and "exactly one" have a server meaning;
/// anything else is rejected rather than coerced.
pub fn multi_for_limit(limit: u64) -> Result<bool> {
    match limit {
        0 => Ok(true),
        1 => Ok(false),
        other => Err(DocViewError::InvalidState(format!(
            "update/remove only support no limit or a limit of exactly 1, got limit {}",
            other
        ))),
    }
}

impl ViewState {
    /// Count by filter, skip and limit; the server count takes no sort
    pub fn count_request(&self) -> Request {
        let params = self.params();
        Request::Count {
            filter: params.filter().clone(),
            skip: params.skip(),
            limit: params.limit(),
        }
    }

    pub fn read_request(&self) -> Request {
        Request::Read {
            params: self.params().clone(),
        }
    }

    /// Read request with an implicit limit of one
    pub fn one_request(&self) -> Request {
        Request::Read {
            params: self.params().bounded(1),
        }
    }

    pub fn insert_request(&self, documents: Vec<BsonDocument>) -> Request {
        Request::Insert {
            documents,
            write_concern: self.write_concern().cloned(),
        }
    }

    /// Insert when `document` has no `_id`, otherwise upsert-replace by `_id`
    ///
    /// A null `_id` is dropped before inserting so the server assigns one.
    pub fn save_request(&self, document: BsonDocument) -> Request {
        match identity(&document).cloned() {
            None => {
                let mut document = document;
                document.remove(ID_FIELD);
                self.insert_request(vec![document])
            }
            Some(id) => self
                .request_upsert()
                .filter(doc! { "_id": id })
                .replace_request(document),
        }
    }

    /// # Errors
    /// `InvalidState` unless the limit is 0 or 1.
    pub fn update_request(&self, update: BsonDocument) -> Result<Request> {
        let multi = multi_for_limit(self.params().limit())?;
        Ok(self.build_update(update, multi))
    }

    pub fn update_one_request(&self, update: BsonDocument) -> Request {
        self.build_update(update, false)
    }

    pub fn replace_request(&self, replacement: BsonDocument) -> Request {
        Request::Replace {
            filter: self.params().filter().clone(),
            replacement,
            upsert: self.upsert_requested(),
            write_concern: self.write_concern().cloned(),
        }
    }

    /// # Errors
    /// `InvalidState` unless the limit is 0 or 1.
    pub fn remove_request(&self) -> Result<Request> {
        let multi = multi_for_limit(self.params().limit())?;
        Ok(self.build_remove(multi))
    }

    pub fn remove_one_request(&self) -> Request {
        self.build_remove(false)
    }

    /// `return_new` selects the post-update (true) or pre-update document
    pub fn find_and_update_request(&self, update: BsonDocument, return_new: bool) -> Request {
        let params = self.params();
        Request::FindAndUpdate {
            filter: params.filter().clone(),
            update,
            projection: params.projection().cloned(),
            sort: params.sort().cloned(),
            upsert: self.upsert_requested(),
            return_new,
            write_concern: self.write_concern().cloned(),
        }
    }

    pub fn find_and_replace_request(&self, replacement: BsonDocument, return_new: bool) -> Request {
        let params = self.params();
        Request::FindAndReplace {
            filter: params.filter().clone(),
            replacement,
            projection: params.projection().cloned(),
            sort: params.sort().cloned(),
            upsert: self.upsert_requested(),
            return_new,
            write_concern: self.write_concern().cloned(),
        }
    }

    pub fn find_and_remove_request(&self) -> Request {
        let params = self.params();
        Request::FindAndRemove {
            filter: params.filter().clone(),
            projection: params.projection().cloned(),
            sort: params.sort().cloned(),
            write_concern: self.write_concern().cloned(),
        }
    }

    fn build_update(&self, update: BsonDocument, multi: bool) -> Request {
        Request::Update {
            filter: self.params().filter().clone(),
            update,
            upsert: self.upsert_requested(),
            multi,
            write_concern: self.write_concern().cloned(),
        }
    }

    fn build_remove(&self, multi: bool) -> Request {
        Request::Remove {
            filter: self.params().filter().clone(),
            multi,
            write_concern: self.write_concern().cloned(),
        }
    }
}
