//! Per-entity endpoint declarations
//!
//! Every resource kind exposes the same five canonical operations, so the
//! per-entity "API module" collapses into one generic [`EntityRoutes`]
//! value instantiated per [`EntityTag`]. The [`ApiRegistry`] holds the
//! routes for every registered kind.

mod registry;

pub use registry::ApiRegistry;

use crate::core::endpoint::{CacheBehavior, EndpointDescriptor, PathTemplate};
use crate::core::tag::{EntityTag, TagSet};
use reqwest::Method;

/// The five canonical operations for one resource kind
///
/// Reads provide the kind's tag; writes invalidate it. Tagging is
/// deliberately coarse: an update to one event invalidates every event
/// list and every single-event query, trading extra refetches for the
/// guarantee that no view keeps stale data.
#[derive(Debug, Clone)]
pub struct EntityRoutes {
    kind: EntityTag,
    base: String,
}

impl EntityRoutes {
    /// Routes for a kind at its default base path
    pub fn new(kind: EntityTag) -> Self {
        Self {
            kind,
            base: kind.base_path().to_string(),
        }
    }

    /// Routes for a kind at a custom base path
    pub fn with_base(kind: EntityTag, base: impl Into<String>) -> Self {
        Self {
            kind,
            base: base.into(),
        }
    }

    pub fn kind(&self) -> EntityTag {
        self.kind
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn operation(&self, name: &str) -> String {
        format!("{}.{}", self.kind.as_str(), name)
    }

    /// GET `{base}` — provides {tag(kind)}
    pub fn list(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(
            self.operation("list"),
            Method::GET,
            PathTemplate::Collection(self.base.clone()),
            CacheBehavior::Provides(TagSet::single(self.kind)),
        )
    }

    /// GET `{base}/{id}` — provides {tag(kind)}
    pub fn get(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(
            self.operation("get"),
            Method::GET,
            PathTemplate::Item(self.base.clone()),
            CacheBehavior::Provides(TagSet::single(self.kind)),
        )
    }

    /// POST `{base}` — invalidates {tag(kind)}
    pub fn create(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(
            self.operation("create"),
            Method::POST,
            PathTemplate::Collection(self.base.clone()),
            CacheBehavior::Invalidates(TagSet::single(self.kind)),
        )
    }

    /// PATCH `{base}/{id}` — invalidates {tag(kind)}
    pub fn update(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(
            self.operation("update"),
            Method::PATCH,
            PathTemplate::Item(self.base.clone()),
            CacheBehavior::Invalidates(TagSet::single(self.kind)),
        )
    }

    /// DELETE `{base}/{id}` — invalidates {tag(kind)}
    pub fn delete(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(
            self.operation("delete"),
            Method::DELETE,
            PathTemplate::Item(self.base.clone()),
            CacheBehavior::Invalidates(TagSet::single(self.kind)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::endpoint::RequestParams;

    #[test]
    fn test_canonical_operation_table() {
        let routes = EntityRoutes::new(EntityTag::Event);

        let list = routes.list();
        assert_eq!(list.operation, "event.list");
        assert_eq!(list.method, Method::GET);
        assert!(list.is_read());

        let get = routes.get();
        assert_eq!(get.method, Method::GET);
        assert!(matches!(get.path, PathTemplate::Item(_)));

        let create = routes.create();
        assert_eq!(create.method, Method::POST);
        assert!(create.is_write());

        let update = routes.update();
        assert_eq!(update.method, Method::PATCH);

        let delete = routes.delete();
        assert_eq!(delete.method, Method::DELETE);
        assert!(delete.invalidates().contains(EntityTag::Event));
    }

    #[test]
    fn test_reads_provide_what_writes_invalidate() {
        for kind in EntityTag::ALL {
            let routes = EntityRoutes::new(kind);
            let provided = routes.list().provides().union(routes.get().provides());
            for write in [routes.create(), routes.update(), routes.delete()] {
                assert!(write.invalidates().intersects(provided));
            }
        }
    }

    #[test]
    fn test_default_base_path() {
        let routes = EntityRoutes::new(EntityTag::Publication);
        assert_eq!(routes.base(), "/publications");
        let path = routes
            .get()
            .resolve_path(&RequestParams::new().with_id("7"))
            .unwrap();
        assert_eq!(path, "/publications/7");
    }

    #[test]
    fn test_custom_base_path() {
        let routes = EntityRoutes::with_base(EntityTag::Blog, "/posts");
        assert_eq!(routes.list().resolve_path(&RequestParams::new()).unwrap(), "/posts");
        assert_eq!(routes.kind(), EntityTag::Blog);
    }
}
