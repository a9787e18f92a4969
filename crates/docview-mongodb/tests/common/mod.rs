//! Shared test doubles for view integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document as BsonDocument};
use docview_mongodb::{DocViewError, Engine, Reply, Request, Result, View};
use futures::stream::{self, StreamExt};
use mongodb::options::ReadPreference;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub priority: i32,
}

impl Task {
    pub fn new(title: &str, priority: i32) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            priority,
        }
    }
}

pub fn task_doc(title: &str, priority: i32) -> BsonDocument {
    doc! { "title": title, "priority": priority }
}

/// Engine that records every submission and answers from a script
#[derive(Default)]
pub struct RecordingEngine {
    submissions: Mutex<Vec<(Request, Option<ReadPreference>)>>,
    replies: Mutex<VecDeque<Result<Reply>>>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Arc::new(Self::default())
    }

    pub fn script(&self, reply: Result<Reply>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Queue a cursor over `docs` and return a counter of pulled elements
    pub fn script_cursor(&self, docs: Vec<BsonDocument>) -> Arc<AtomicUsize> {
        let items: Vec<Result<BsonDocument>> = docs.into_iter().map(Ok).collect();
        self.script_stream(items)
    }

    pub fn script_stream(&self, items: Vec<Result<BsonDocument>>) -> Arc<AtomicUsize> {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let cursor = stream::iter(items)
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .boxed();
        self.script(Ok(Reply::Cursor(cursor)));
        pulled
    }

    /// Queue a cursor that never ends, counting `{ "title": "t<n>", "priority": n }`
    pub fn script_endless_cursor(&self) -> Arc<AtomicUsize> {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let cursor = stream::iter(0..)
            .map(|n: i32| Ok(task_doc(&format!("t{}", n), n)))
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .boxed();
        self.script(Ok(Reply::Cursor(cursor)));
        pulled
    }

    pub fn submissions(&self) -> Vec<(Request, Option<ReadPreference>)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.submissions().into_iter().map(|(r, _)| r).collect()
    }

    pub fn last_request(&self) -> Request {
        self.requests()
            .pop()
            .expect("no request was submitted")
    }
}

#[async_trait]
impl Engine for RecordingEngine {
    async fn submit(
        &self,
        request: Request,
        read_preference: Option<ReadPreference>,
    ) -> Result<Reply> {
        self.submissions
            .lock()
            .unwrap()
            .push((request, read_preference));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DocViewError::Engine("no scripted reply".to_string())))
    }
}

pub fn task_view(engine: &Arc<RecordingEngine>) -> View<Task> {
    View::new(engine.clone())
}
