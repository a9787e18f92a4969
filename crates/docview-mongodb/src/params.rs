//! Request parameters for find-shaped operations

use std::time::Duration;

use bson::{Bson, Document as BsonDocument};
use docview_common::{DocViewError, Result};

/// Server cursor flags forwarded verbatim with a read request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorOptions {
    /// Number of documents per server batch
    pub batch_size: Option<u32>,
    /// Keep the server cursor alive past the idle timeout
    pub no_cursor_timeout: Option<bool>,
    /// Return partial results when some shards are unavailable
    pub allow_partial_results: Option<bool>,
    /// Server-side time limit for the query
    pub max_time: Option<Duration>,
    /// Comment attached to the query in server logs and profiler output
    pub comment: Option<Bson>,
}

/// Filter, projection, sort and paging of one logical find
///
/// Values are never changed in place: every `with_*` method returns a new
/// value. `limit == 0` means no limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParameters {
    filter: BsonDocument,
    projection: Option<BsonDocument>,
    sort: Option<BsonDocument>,
    skip: u64,
    limit: u64,
    cursor_options: CursorOptions,
}

impl RequestParameters {
    /// Parameters matching every document, unsorted and unbounded
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(&self, filter: BsonDocument) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }

    pub fn with_projection(&self, projection: BsonDocument) -> Self {
        Self {
            projection: Some(projection),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: BsonDocument) -> Self {
        Self {
            sort: Some(sort),
            ..self.clone()
        }
    }

    pub fn with_cursor_options(&self, cursor_options: CursorOptions) -> Self {
        Self {
            cursor_options,
            ..self.clone()
        }
    }

    /// Set the number of documents to skip
    ///
    /// # Errors
    /// `InvalidArgument` if `skip` is negative.
    pub fn with_skip(&self, skip: i64) -> Result<Self> {
        let skip = non_negative("skip", skip)?;
        Ok(Self {
            skip,
            ..self.clone()
        })
    }

    /// Set the maximum number of documents; 0 removes the bound
    ///
    /// # Errors
    /// `InvalidArgument` if `limit` is negative.
    pub fn with_limit(&self, limit: i64) -> Result<Self> {
        let limit = non_negative("limit", limit)?;
        Ok(Self {
            limit,
            ..self.clone()
        })
    }

    /// Same parameters with the limit forced to `limit`
    pub(crate) fn bounded(&self, limit: u64) -> Self {
        Self {
            limit,
            ..self.clone()
        }
    }

    pub fn filter(&self) -> &BsonDocument {
        &self.filter
    }

    pub fn projection(&self) -> Option<&BsonDocument> {
        self.projection.as_ref()
    }

    pub fn sort(&self) -> Option<&BsonDocument> {
        self.sort.as_ref()
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn cursor_options(&self) -> &CursorOptions {
        &self.cursor_options
    }
}

fn non_negative(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        DocViewError::InvalidArgument(format!("{} must be >= 0, got {}", name, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_params_new() {
        let params = RequestParameters::new();
        assert!(params.filter().is_empty());
        assert!(params.projection().is_none());
        assert!(params.sort().is_none());
        assert_eq!(params.skip(), 0);
        assert_eq!(params.limit(), 0);
        assert_eq!(params.cursor_options(), &CursorOptions::default());
    }

    #[test]
    fn test_params_with_filter_leaves_original() {
        let base = RequestParameters::new();
        let filtered = base.with_filter(doc! { "status": "active" });
        assert!(base.filter().is_empty());
        assert_eq!(filtered.filter(), &doc! { "status": "active" });
    }

    #[test]
    fn test_params_chaining() {
        let params = RequestParameters::new()
            .with_filter(doc! { "active": true })
            .with_sort(doc! { "name": 1 })
            .with_projection(doc! { "name": 1, "_id": 0 })
            .with_skip(5)
            .unwrap()
            .with_limit(10)
            .unwrap();

        assert_eq!(params.filter(), &doc! { "active": true });
        assert_eq!(params.sort(), Some(&doc! { "name": 1 }));
        assert_eq!(params.projection(), Some(&doc! { "name": 1, "_id": 0 }));
        assert_eq!(params.skip(), 5);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_params_negative_skip() {
        let err = RequestParameters::new().with_skip(-1).unwrap_err();
        assert!(matches!(err, DocViewError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "Invalid argument: skip must be >= 0, got -1");
    }

    #[test]
    fn test_params_negative_limit() {
        let err = RequestParameters::new().with_limit(i64::MIN).unwrap_err();
        assert!(matches!(err, DocViewError::InvalidArgument(_)));
    }

    #[test]
    fn test_params_cursor_options() {
        let opts = CursorOptions {
            batch_size: Some(100),
            no_cursor_timeout: Some(true),
            max_time: Some(Duration::from_secs(2)),
            ..Default::default()
        };
        let params = RequestParameters::new().with_cursor_options(opts.clone());
        assert_eq!(params.cursor_options(), &opts);
    }
}
