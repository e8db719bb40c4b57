//! Registry of entity routes

use super::EntityRoutes;
use crate::core::tag::EntityTag;
use std::collections::HashMap;

/// Registry of [`EntityRoutes`] for every resource kind the client knows
///
/// `ApiRegistry::with_defaults()` registers all kinds at their default
/// base paths; individual kinds can be re-registered with custom paths
/// for backends that deviate.
#[derive(Debug, Default)]
pub struct ApiRegistry {
    routes: HashMap<EntityTag, EntityRoutes>,
}

impl ApiRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Registry with every [`EntityTag`] at its default base path
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in EntityTag::ALL {
            registry.register(EntityRoutes::new(kind));
        }
        registry
    }

    /// Register routes for a kind, replacing any previous registration
    pub fn register(&mut self, routes: EntityRoutes) {
        self.routes.insert(routes.kind(), routes);
    }

    /// Look up the routes for a kind
    pub fn routes(&self, kind: EntityTag) -> Option<&EntityRoutes> {
        self.routes.get(&kind)
    }

    /// All registered kinds
    pub fn kinds(&self) -> Vec<EntityTag> {
        let mut kinds: Vec<EntityTag> = self.routes.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
