//! Document trait and BSON conversion helpers
//!
//! Views are typed over any serde entity. Entities that also implement
//! [`Document`] know their own collection, which lets a [`Connection`]
//! hand out a view for them without naming the collection again.
//!
//! [`Connection`]: crate::Connection

use bson::{Bson, Document as BsonDocument};
use docview_common::{DocViewError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Name of the identity field every stored document carries
pub const ID_FIELD: &str = "_id";

/// Entity stored in a fixed collection
///
/// # Example
///
/// ```ignore
/// use serde::{Deserialize, Serialize};
/// use docview_mongodb::Document;
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct User {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<ObjectId>,
///     email: String,
/// }
///
/// impl Document for User {
///     fn collection_name() -> &'static str {
///         "users"
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    /// Get the collection name for this document type
    fn collection_name() -> &'static str;

    /// Convert document to BSON
    fn to_bson(&self) -> Result<BsonDocument> {
        encode(self)
    }

    /// Create document from BSON
    fn from_bson(doc: BsonDocument) -> Result<Self> {
        decode(doc)
    }
}

/// Encode an entity into a BSON document
pub fn encode<T: Serialize>(entity: &T) -> Result<BsonDocument> {
    bson::to_document(entity).map_err(|e| DocViewError::Serialization(e.to_string()))
}

/// Decode a BSON document into an entity
pub fn decode<T: DeserializeOwned>(doc: BsonDocument) -> Result<T> {
    bson::from_document(doc).map_err(|e| DocViewError::Deserialization(e.to_string()))
}

/// The document's `_id`, treating an explicit null as absent
pub fn identity(doc: &BsonDocument) -> Option<&Bson> {
    match doc.get(ID_FIELD) {
        None | Some(Bson::Null) => None,
        Some(id) => Some(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestDoc {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
        name: String,
        value: i32,
    }

    impl Document for TestDoc {
        fn collection_name() -> &'static str {
            "test_docs"
        }
    }

    #[test]
    fn test_collection_name() {
        assert_eq!(TestDoc::collection_name(), "test_docs");
    }

    #[test]
    fn test_to_bson_skips_missing_id() {
        let doc = TestDoc {
            id: None,
            name: "test".to_string(),
            value: 42,
        };

        let bson = doc.to_bson().unwrap();
        assert_eq!(bson.get_str("name").unwrap(), "test");
        assert_eq!(bson.get_i32("value").unwrap(), 42);
        assert!(identity(&bson).is_none());
    }

    #[test]
    fn test_from_bson() {
        let doc = TestDoc::from_bson(doc! { "name": "test", "value": 42 }).unwrap();
        assert_eq!(doc.name, "test");
        assert_eq!(doc.value, 42);
    }

    #[test]
    fn test_from_bson_type_mismatch() {
        let err = TestDoc::from_bson(doc! { "name": 7, "value": 42 }).unwrap_err();
        assert!(matches!(err, DocViewError::Deserialization(_)));
    }

    #[test]
    fn test_identity() {
        let id = ObjectId::new();
        assert_eq!(identity(&doc! { "_id": id }), Some(&Bson::ObjectId(id)));
        assert_eq!(identity(&doc! { "_id": "slug" }), Some(&Bson::String("slug".into())));
        assert!(identity(&doc! { "_id": null }).is_none());
        assert!(identity(&doc! { "name": "x" }).is_none());
    }
}
