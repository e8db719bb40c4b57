//! Consumer-facing client: subscriptions in, mutations out
//!
//! [`ApiClient`] ties the pieces together: the endpoint registry, the
//! transport, the cache store, and the invalidation bus. Rendering code
//! subscribes to read operations and observes snapshot streams; write
//! operations are invoked imperatively and trigger the invalidation pass
//! on success.

use crate::api::{ApiRegistry, EntityRoutes};
use crate::cache::{CacheStore, Subscription};
use crate::config::ClientConfig;
use crate::core::endpoint::{EndpointDescriptor, RequestParams};
use crate::core::error::{ClientError, ClientResult};
use crate::core::events::{EventEnvelope, InvalidationBus, InvalidationEvent};
use crate::core::tag::{EntityTag, TagSet};
use crate::transport::{RestClient, Transport};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// The folio API client
///
/// Cheap to clone; clones share the cache table, transport, and bus.
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::builder()
///     .with_config(ClientConfig::from_yaml_file("folio.yaml")?)
///     .build()?;
///
/// let events = client.entity(EntityTag::Event);
/// let mut sub = client.subscribe(&events.list(), RequestParams::new())?;
/// let snapshot = sub.settled().await;
///
/// client.mutate(&events.delete(), RequestParams::new().with_id("1")).await?;
/// // the list subscription is now refetching
/// ```
#[derive(Clone)]
pub struct ApiClient {
    store: CacheStore,
    transport: Arc<dyn Transport>,
    bus: InvalidationBus,
    registry: Arc<ApiRegistry>,
}

impl ApiClient {
    /// Start building a client
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Client over the default REST transport for `config`
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::builder().with_config(config.clone()).build()
    }

    /// The endpoint registry
    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }

    /// The routes for one entity kind
    ///
    /// Every kind is registered by default, so this only fails for a
    /// registry built without defaults.
    pub fn entity(&self, kind: EntityTag) -> ClientResult<&EntityRoutes> {
        self.registry
            .routes(kind)
            .ok_or_else(|| ClientError::InvalidOperation {
                operation: kind.as_str().to_string(),
                message: "entity kind is not registered".to_string(),
            })
    }

    /// Subscribe to a read operation
    ///
    /// Identical operation + parameters join the same cache entry and
    /// share one in-flight request.
    pub fn subscribe(
        &self,
        descriptor: &EndpointDescriptor,
        params: RequestParams,
    ) -> ClientResult<Subscription> {
        self.store.subscribe(descriptor, params)
    }

    /// Invoke a write operation
    ///
    /// On a successful response the descriptor's invalidation set is
    /// applied to the cache in one synchronous pass, and an invalidation
    /// event is published, before the result is returned.
    pub async fn mutate(
        &self,
        descriptor: &EndpointDescriptor,
        params: RequestParams,
    ) -> ClientResult<Value> {
        if !descriptor.is_write() {
            return Err(ClientError::InvalidOperation {
                operation: descriptor.operation.clone(),
                message: "cannot mutate through a read operation".to_string(),
            });
        }
        descriptor.resolve_path(&params)?;

        let data = self.transport.execute(descriptor, &params).await?;

        let tags = descriptor.invalidates();
        let affected = self.store.invalidate(tags);
        tracing::debug!(
            operation = %descriptor.operation,
            tags = %tags,
            affected = affected,
            "write completed, cache invalidated"
        );
        self.bus.publish(InvalidationEvent {
            operation: descriptor.operation.clone(),
            tags,
            entity_id: params.id.clone(),
        });

        Ok(data)
    }

    /// Manually invalidate a tag set, as if a write touching it succeeded
    pub fn invalidate_tags(&self, tags: TagSet) -> usize {
        let affected = self.store.invalidate(tags);
        self.bus.publish(InvalidationEvent {
            operation: "manual".to_string(),
            tags,
            entity_id: None,
        });
        affected
    }

    /// Subscribe to the stream of invalidation events
    pub fn events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.bus.subscribe()
    }

    /// The underlying cache store (mainly for diagnostics)
    pub fn store(&self) -> &CacheStore {
        &self.store
    }
}

/// Builder for [`ApiClient`]
///
/// A transport given explicitly wins over the one implied by the config;
/// this is how tests plug in an in-memory backend.
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    registry: Option<ApiRegistry>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
            registry: None,
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn with_registry(mut self, registry: ApiRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> ClientResult<ApiClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(RestClient::from_config(&self.config)?),
        };
        let registry = self.registry.unwrap_or_else(ApiRegistry::with_defaults);

        Ok(ApiClient {
            store: CacheStore::new(Arc::clone(&transport)),
            transport,
            bus: InvalidationBus::new(self.config.event_capacity),
            registry: Arc::new(registry),
        })
    }
}
