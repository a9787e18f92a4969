//! MongoDB connection management and view factory

use std::sync::Arc;
use std::time::Duration;

use bson::{doc, Document as BsonDocument};
use docview_common::{DocViewError, Result};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Database,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::document::Document;
use crate::engine::MongoEngine;
use crate::validation::ValidatedCollectionName;
use crate::view::View;

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum number of connections in the pool (default: 5)
    pub min_pool_size: Option<u32>,
    /// Maximum number of connections in the pool (default: 20)
    pub max_pool_size: Option<u32>,
    /// Maximum time a connection can remain idle before being closed (default: none)
    pub max_idle_time: Option<Duration>,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: Some(5),
            max_pool_size: Some(20),
            max_idle_time: None,
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            app_name: Some("docview".to_string()),
        }
    }
}

impl PoolConfig {
    /// Copy every configured value onto the driver options
    pub fn apply(self, client_options: &mut ClientOptions) {
        if let Some(min) = self.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = self.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = self.max_idle_time {
            client_options.max_idle_time = Some(idle);
        }
        if let Some(connect) = self.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = self.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = self.app_name {
            client_options.app_name = Some(app);
        }
    }
}

/// Database handle that hands out views bound to its collections
#[derive(Clone)]
pub struct Connection {
    client: Client,
    database: Database,
}

impl Connection {
    /// Create a new MongoDB connection with default pool settings
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_config(connection_string, PoolConfig::default()).await
    }

    /// Create a new MongoDB connection with custom pool configuration
    pub async fn with_config(connection_string: &str, config: PoolConfig) -> Result<Self> {
        let mut client_options = ClientOptions::parse(connection_string).await?;
        config.apply(&mut client_options);

        // Set stable API version for compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)?;

        let database = client.default_database().ok_or_else(|| {
            DocViewError::Connection(
                "No default database specified in connection string".to_string(),
            )
        })?;

        info!(database = database.name(), "Connected");
        Ok(Self { client, database })
    }

    /// Wrap an existing client and database
    pub fn from_parts(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// View over the collection `T` declares
    ///
    /// # Errors
    /// `Validation` if `T::collection_name()` is not a usable collection name.
    pub fn view<T: Document>(&self) -> Result<View<T>> {
        self.view_on(T::collection_name())
    }

    /// View over a named collection, typed as `T`
    ///
    /// # Errors
    /// `Validation` if `name` is not a usable collection name.
    pub fn view_on<T>(&self, name: &str) -> Result<View<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        let name = ValidatedCollectionName::new(name)?;
        let engine = MongoEngine::for_collection(&self.database, &name);
        Ok(View::new(Arc::new(engine)))
    }

    /// Untyped view over a named collection
    pub fn raw_view(&self, name: &str) -> Result<View<BsonDocument>> {
        self.view_on(name)
    }

    /// Check if the connection is healthy by pinging the server
    pub async fn ping(&self) -> Result<bool> {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => Ok(true),
            Err(e) => Err(DocViewError::Connection(format!("Ping failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_config() {
        let config = PoolConfig::default();
        assert_eq!(config.min_pool_size, Some(5));
        assert_eq!(config.max_pool_size, Some(20));
        assert_eq!(config.app_name, Some("docview".to_string()));
    }

    #[test]
    fn test_apply_pool_config() {
        let config = PoolConfig {
            min_pool_size: Some(1),
            max_pool_size: Some(50),
            max_idle_time: Some(Duration::from_secs(300)),
            connect_timeout: None,
            server_selection_timeout: Some(Duration::from_secs(3)),
            app_name: Some("reports".to_string()),
        };
        let mut options = ClientOptions::builder().build();
        config.apply(&mut options);

        assert_eq!(options.min_pool_size, Some(1));
        assert_eq!(options.max_pool_size, Some(50));
        assert_eq!(options.max_idle_time, Some(Duration::from_secs(300)));
        assert!(options.connect_timeout.is_none());
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(3)));
        assert_eq!(options.app_name, Some("reports".to_string()));
    }
}
