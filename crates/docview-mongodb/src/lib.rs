//! Immutable query/command views for MongoDB
//!
//! A [`View`] describes a filter, sort, projection and paging request and is
//! never mutated: every chained call returns a new view. One terminal call
//! (count, read, insert, update, replace, remove or a find-and-modify
//! variant) becomes exactly one [`Request`] that an [`Engine`] executes.
//!
//! # Features
//! - Copy-on-write builder, safe to share and branch across tasks
//! - Eager validation of skip/limit and of the update/remove limit rule
//! - Streamed, collected or first-only read results
//! - Pluggable execution engine; [`MongoEngine`] drives the official driver

pub mod connection;
pub mod dispatch;
pub mod document;
pub mod engine;
pub mod params;
pub mod request;
pub mod shaping;
pub mod validation;
pub mod view;

pub use connection::{Connection, PoolConfig};
pub use dispatch::{
    DeleteOutcome, Dispatcher, DocumentStream, Engine, InsertOutcome, Reply, UpdateOutcome,
};
pub use docview_common::{DocViewError, Result};
pub use document::Document;
pub use engine::MongoEngine;
pub use params::{CursorOptions, RequestParameters};
pub use request::Request;
pub use shaping::EntityStream;
pub use validation::ValidatedCollectionName;
pub use view::{multi_for_limit, SaveOutcome, View, ViewState};
