use dashmap::DashMap;
use domain::DomainError;
use domain::catalog::CatalogRepository;
use domain::schema::SensorSchema;
use infrastructure::config::SchemaConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

struct CachedSchema {
    schema: Arc<SensorSchema>,
    loaded_at: Instant,
}

/// Resolves the measurement schema of a sensor type from the catalog.
///
/// Resolved schemas are cached per sensor type for `ttl`. A zero TTL
/// disables caching. Entries can be dropped early with [`invalidate`].
///
/// [`invalidate`]: SchemaRegistry::invalidate
pub struct SchemaRegistry {
    catalog: Arc<dyn CatalogRepository>,
    ttl: Duration,
    cache: DashMap<Uuid, CachedSchema>,
}

impl SchemaRegistry {
    pub fn new(catalog: Arc<dyn CatalogRepository>, ttl: Duration) -> Self {
        Self {
            catalog,
            ttl,
            cache: DashMap::new(),
        }
    }

    pub fn from_config(catalog: Arc<dyn CatalogRepository>, config: &SchemaConfig) -> Self {
        Self::new(catalog, config.cache_ttl())
    }

    /// Fields of every active measurement type of `sensor_type_id`.
    ///
    /// Unknown or inactive sensor types yield `SchemaNotFound`.
    pub async fn resolve_fields(&self, sensor_type_id: Uuid) -> Result<Arc<SensorSchema>, DomainError> {
        if let Some(schema) = self.cached(sensor_type_id) {
            return Ok(schema);
        }

        let sensor_type = self
            .catalog
            .find_sensor_type(sensor_type_id)
            .await?
            .filter(|st| st.is_active())
            .ok_or(DomainError::SchemaNotFound(sensor_type_id))?;

        let types = self.catalog.find_measurement_types(sensor_type.id()).await?;
        let schema = Arc::new(SensorSchema::from_measurement_types(sensor_type.id(), &types));
        debug!(
            sensor_type_id = %sensor_type_id,
            fields = schema.len(),
            "Resolved measurement schema"
        );

        if !self.ttl.is_zero() {
            self.cache.insert(
                sensor_type_id,
                CachedSchema {
                    schema: schema.clone(),
                    loaded_at: Instant::now(),
                },
            );
        }

        Ok(schema)
    }

    fn cached(&self, sensor_type_id: Uuid) -> Option<Arc<SensorSchema>> {
        let entry = self.cache.get(&sensor_type_id)?;
        if entry.loaded_at.elapsed() < self.ttl {
            return Some(entry.schema.clone());
        }
        drop(entry);
        self.cache.remove(&sensor_type_id);
        None
    }

    /// Drop the cached schema of one sensor type
    pub fn invalidate(&self, sensor_type_id: Uuid) -> bool {
        let removed = self.cache.remove(&sensor_type_id).is_some();
        if removed {
            info!(sensor_type_id = %sensor_type_id, "Schema cache entry invalidated");
        }
        removed
    }

    pub fn invalidate_all(&self) {
        self.cache.clear();
        info!("Schema cache cleared");
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}
