//! Catalog discovery and database resolution.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use datafusion::catalog::{CatalogProvider, SchemaProvider};
use log::info;
use parking_lot::RwLock;

use gridsql_client::RecordStore;
use gridsql_commons::{BaseInfo, SqlName};

use crate::scan::{PageCache, PageCacheConfig};
use crate::GridSqlError;

use super::base::BaseCatalog;

/// The process-wide database provider.
///
/// Bases are discovered once at construction. Each base's tables (schemas
/// only, never data) are built on first access to that base and reused for
/// the life of the process. The page cache is owned here and shared by
/// every table of every base.
pub struct Provider {
    store: Arc<dyn RecordStore>,
    bases: Vec<BaseInfo>,
    built: RwLock<BTreeMap<String, Arc<BaseCatalog>>>,
    cache: Arc<PageCache>,
}

impl Provider {
    /// Discover the upstream bases and construct the provider.
    ///
    /// A listing failure here is a schema-discovery failure: without the
    /// base list there is no catalog to serve.
    pub async fn connect(
        store: Arc<dyn RecordStore>,
        cache_config: PageCacheConfig,
    ) -> Result<Self, GridSqlError> {
        let bases = store
            .list_bases()
            .await
            .map_err(|e| GridSqlError::SchemaDiscovery(format!("failed to list bases: {e}")))?;
        info!("discovered {} upstream bases", bases.len());
        Ok(Self {
            store,
            bases,
            built: RwLock::new(BTreeMap::new()),
            cache: Arc::new(PageCache::new(cache_config)),
        })
    }

    /// Normalized names of every discovered base, in discovery order.
    pub fn base_names(&self) -> Vec<String> {
        self.bases
            .iter()
            .map(|b| SqlName::normalize(&b.name).into_string())
            .collect()
    }

    /// Existence check by normalized name. Never builds the table set.
    pub fn has_database(&self, name: &str) -> bool {
        self.bases
            .iter()
            .any(|b| SqlName::normalize(&b.name).as_str() == name)
    }

    /// Resolve one database by normalized name, building it on first
    /// access. Building fetches the base's table schemas (metadata only)
    /// and constructs every table of the base.
    pub async fn database(&self, name: &str) -> Result<Arc<BaseCatalog>, GridSqlError> {
        if let Some(db) = self.built.read().get(name) {
            return Ok(db.clone());
        }

        let base = self
            .bases
            .iter()
            .find(|b| SqlName::normalize(&b.name).as_str() == name)
            .cloned()
            .ok_or_else(|| GridSqlError::NotFound(format!("database {name:?}")))?;

        let db = self.build_base(base).await?;
        self.built.write().insert(name.to_string(), db.clone());
        Ok(db)
    }

    /// Build (if needed) and return every discovered base.
    ///
    /// This is the one operation that eagerly materializes every table's
    /// schema across all bases; results are cached for subsequent calls.
    pub async fn all_databases(&self) -> Result<Vec<Arc<BaseCatalog>>, GridSqlError> {
        let mut databases = Vec::with_capacity(self.bases.len());
        for name in self.base_names() {
            databases.push(self.database(&name).await?);
        }
        Ok(databases)
    }

    /// The shared page cache, for observability.
    pub fn page_cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    async fn build_base(&self, base: BaseInfo) -> Result<Arc<BaseCatalog>, GridSqlError> {
        let table_schemas = self.store.base_schema(&base.id).await.map_err(|e| {
            GridSqlError::SchemaDiscovery(format!(
                "failed to fetch schema for base {:?}: {e}",
                base.name
            ))
        })?;
        let db = Arc::new(BaseCatalog::build(
            base,
            table_schemas,
            self.store.clone(),
            self.cache.clone(),
        ));
        info!(
            "built database {} ({} tables)",
            db.name(),
            db.table_names().len()
        );
        Ok(db)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("bases", &self.bases.len())
            .field("built", &self.built.read().len())
            .finish()
    }
}

/// Engine face. DataFusion's catalog lookups are synchronous, so `schema`
/// serves from the built-base cache; callers materialize via
/// `all_databases()` (or `database(name)`) before registering the catalog.
impl CatalogProvider for Provider {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema_names(&self) -> Vec<String> {
        self.base_names()
    }

    fn schema(&self, name: &str) -> Option<Arc<dyn SchemaProvider>> {
        self.built
            .read()
            .get(name)
            .map(|db| db.clone() as Arc<dyn SchemaProvider>)
    }
}
