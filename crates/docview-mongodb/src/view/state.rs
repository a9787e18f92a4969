//! Immutable builder state shared by every typed view

use bson::Document as BsonDocument;
use docview_common::Result;
use mongodb::options::{ReadPreference, WriteConcern};

use crate::params::{CursorOptions, RequestParameters};

/// Query shape plus the routing and write settings of a view
///
/// Every method takes `&self` and returns a fresh value; the receiver is
/// left untouched, so one state can be branched into several queries.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    params: RequestParameters,
    write_concern: Option<WriteConcern>,
    read_preference: Option<ReadPreference>,
    upsert_requested: bool,
    limit_explicitly_set: bool,
    list_cap: Option<usize>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self, filter: BsonDocument) -> Self {
        Self {
            params: self.params.with_filter(filter),
            ..self.clone()
        }
    }

    pub fn sort(&self, sort: BsonDocument) -> Self {
        Self {
            params: self.params.with_sort(sort),
            ..self.clone()
        }
    }

    pub fn project(&self, projection: BsonDocument) -> Self {
        Self {
            params: self.params.with_projection(projection),
            ..self.clone()
        }
    }

    pub fn with_cursor_options(&self, options: CursorOptions) -> Self {
        Self {
            params: self.params.with_cursor_options(options),
            ..self.clone()
        }
    }

    /// # Errors
    /// `InvalidArgument` if `n` is negative.
    pub fn skip(&self, n: i64) -> Result<Self> {
        Ok(Self {
            params: self.params.with_skip(n)?,
            ..self.clone()
        })
    }

    /// # Errors
    /// `InvalidArgument` if `n` is negative.
    pub fn limit(&self, n: i64) -> Result<Self> {
        Ok(Self {
            params: self.params.with_limit(n)?,
            limit_explicitly_set: true,
            ..self.clone()
        })
    }

    pub fn with_write_concern(&self, write_concern: WriteConcern) -> Self {
        Self {
            write_concern: Some(write_concern),
            ..self.clone()
        }
    }

    pub fn with_read_preference(&self, read_preference: ReadPreference) -> Self {
        Self {
            read_preference: Some(read_preference),
            ..self.clone()
        }
    }

    /// Treat the next update or replace issued from this state as an upsert
    pub fn request_upsert(&self) -> Self {
        Self {
            upsert_requested: true,
            ..self.clone()
        }
    }

    /// Bound the number of elements `list()` will buffer; `None` removes it
    pub fn with_list_cap(&self, cap: Option<usize>) -> Self {
        Self {
            list_cap: cap,
            ..self.clone()
        }
    }

    pub fn params(&self) -> &RequestParameters {
        &self.params
    }

    pub fn write_concern(&self) -> Option<&WriteConcern> {
        self.write_concern.as_ref()
    }

    pub fn read_preference(&self) -> Option<&ReadPreference> {
        self.read_preference.as_ref()
    }

    pub fn upsert_requested(&self) -> bool {
        self.upsert_requested
    }

    /// Whether `limit()` has been called on this state or an ancestor
    ///
    /// Informational only; the multi/limit rule looks at the value alone.
    pub fn limit_explicitly_set(&self) -> bool {
        self.limit_explicitly_set
    }

    pub fn list_cap(&self) -> Option<usize> {
        self.list_cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use docview_common::DocViewError;
    use mongodb::options::Acknowledgment;

    #[test]
    fn test_state_defaults() {
        let state = ViewState::new();
        assert!(state.params().filter().is_empty());
        assert!(state.write_concern().is_none());
        assert!(state.read_preference().is_none());
        assert!(!state.upsert_requested());
        assert!(!state.limit_explicitly_set());
        assert!(state.list_cap().is_none());
    }

    #[test]
    fn test_sort_does_not_touch_receiver() {
        let b1 = ViewState::new().filter(doc! { "kind": "a" });
        let b2 = b1.sort(doc! { "rank": -1 });
        assert!(b1.params().sort().is_none());
        assert_eq!(b2.params().sort(), Some(&doc! { "rank": -1 }));
        assert_eq!(b2.params().filter(), &doc! { "kind": "a" });
    }

    #[test]
    fn test_branching() {
        let base = ViewState::new().filter(doc! { "active": true });
        let by_name = base.sort(doc! { "name": 1 });
        let by_age = base.sort(doc! { "age": -1 });
        assert_eq!(by_name.params().sort(), Some(&doc! { "name": 1 }));
        assert_eq!(by_age.params().sort(), Some(&doc! { "age": -1 }));
        assert!(base.params().sort().is_none());
    }

    #[test]
    fn test_limit_marks_explicit() {
        let state = ViewState::new().limit(0).unwrap();
        assert!(state.limit_explicitly_set());
        assert_eq!(state.params().limit(), 0);
    }

    #[test]
    fn test_negative_skip_and_limit() {
        let state = ViewState::new();
        assert!(matches!(state.skip(-3), Err(DocViewError::InvalidArgument(_))));
        assert!(matches!(state.limit(-1), Err(DocViewError::InvalidArgument(_))));
        assert!(!state.limit_explicitly_set());
    }

    #[test]
    fn test_request_upsert() {
        let base = ViewState::new();
        let upsert = base.request_upsert();
        assert!(upsert.upsert_requested());
        assert!(!base.upsert_requested());
    }

    #[test]
    fn test_write_concern_and_read_preference() {
        let state = ViewState::new()
            .with_write_concern(WriteConcern::majority())
            .with_read_preference(ReadPreference::Primary);
        assert!(matches!(
            state.write_concern().and_then(|wc| wc.w.as_ref()),
            Some(Acknowledgment::Majority)
        ));
        assert!(matches!(state.read_preference(), Some(ReadPreference::Primary)));
    }
}
