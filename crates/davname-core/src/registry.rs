//! Host-side registry of live-property providers.
//!
//! The host owns two tables: the global namespace table, which hands out the
//! `lpN` prefix indices used in rendered markup, and the ordered list of
//! providers consulted when a property name has to be resolved.

use crate::config::DirConfig;
use crate::liveprop::{
    DisplayNameProvider, LivePropertyProvider, PatchOutcome, PatchRequest, PropId, RenderMode,
    RenderOutcome, RenderRequest,
};
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, trace};

/// Global namespace URI table.
///
/// Indices start at 1 and are assigned in registration order. Registering a
/// URI twice returns the existing index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    uris: Vec<String>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace URI and return its global index.
    pub fn register(&mut self, uri: &str) -> usize {
        if let Some(index) = self.index_of(uri) {
            return index;
        }
        self.uris.push(uri.to_string());
        let index = self.uris.len();
        debug!(uri = %uri, index, "registered live property namespace");
        index
    }

    /// Global index of a registered URI.
    pub fn index_of(&self, uri: &str) -> Option<usize> {
        self.uris.iter().position(|u| u == uri).map(|pos| pos + 1)
    }

    /// URI registered under a global index.
    pub fn uri_of(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|pos| self.uris.get(pos))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// ` xmlns:lpN="uri"` for a single index.
    pub fn declaration(&self, index: usize) -> Option<String> {
        self.uri_of(index)
            .map(|uri| format!(" xmlns:lp{index}=\"{uri}\""))
    }

    /// Declarations for every registered namespace, for the response root.
    pub fn xmlns_declarations(&self) -> String {
        let mut out = String::new();
        for (pos, uri) in self.uris.iter().enumerate() {
            let _ = write!(out, " xmlns:lp{}=\"{uri}\"", pos + 1);
        }
        out
    }
}

/// A property resolved by [`LivePropRegistry::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundProp {
    pub propid: PropId,
    provider: usize,
}

/// Ordered set of live-property providers plus the namespace table.
#[derive(Clone, Default)]
pub struct LivePropRegistry {
    namespaces: NamespaceTable,
    providers: Vec<Arc<dyn LivePropertyProvider>>,
}

impl fmt::Debug for LivePropRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivePropRegistry")
            .field("namespaces", &self.namespaces)
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl LivePropRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the display-name provider installed.
    pub fn with_displayname() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DisplayNameProvider::new()));
        registry
    }

    /// Register a provider and its namespaces.
    ///
    /// Providers are consulted in registration order.
    pub fn register(&mut self, provider: Arc<dyn LivePropertyProvider>) {
        let group = provider.group();
        for uri in group.namespace_uris {
            self.namespaces.register(uri);
        }
        debug!(
            props = group.specs.len(),
            providers = self.providers.len() + 1,
            "registered live property provider"
        );
        self.providers.push(provider);
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// Ask each provider in turn whether it owns `ns_uri` + `name`.
    pub fn find(&self, ns_uri: &str, name: &str) -> Option<FoundProp> {
        let found = self
            .providers
            .iter()
            .enumerate()
            .find_map(|(provider, p)| {
                p.find(ns_uri, name)
                    .map(|propid| FoundProp { propid, provider })
            });
        trace!(ns = %ns_uri, name = %name, found = found.is_some(), "live property lookup");
        found
    }

    fn provider(&self, found: FoundProp) -> Option<&dyn LivePropertyProvider> {
        self.providers.get(found.provider).map(|p| &**p)
    }

    pub fn is_writable(&self, found: FoundProp) -> bool {
        self.provider(found)
            .is_some_and(|p| p.is_writable(found.propid))
    }

    /// Render a resolved property for one resource.
    pub fn render(
        &self,
        found: FoundProp,
        resource_url: &str,
        mode: RenderMode,
        config: &DirConfig,
    ) -> RenderOutcome {
        let Some(provider) = self.provider(found) else {
            return RenderOutcome::NotApplicable;
        };
        let request = RenderRequest {
            resource_url,
            propid: found.propid,
            mode,
        };
        provider.render(&request, config, &self.namespaces)
    }

    /// Render every property of every provider, skipping the ones that are
    /// not applicable to the resource.
    pub fn render_all(
        &self,
        resource_url: &str,
        mode: RenderMode,
        config: &DirConfig,
    ) -> Vec<(FoundProp, String)> {
        let mut rendered = Vec::new();
        for (index, provider) in self.providers.iter().enumerate() {
            for spec in provider.group().specs {
                let found = FoundProp {
                    propid: spec.propid,
                    provider: index,
                };
                if let RenderOutcome::Rendered(markup) =
                    self.render(found, resource_url, mode, config)
                {
                    rendered.push((found, markup));
                }
            }
        }
        rendered
    }

    /// Resolve the `(namespace, name)` of a found property.
    pub fn name_of(&self, found: FoundProp) -> Option<(&'static str, &'static str)> {
        let group = self.provider(found)?.group();
        let spec = group.info(found.propid)?;
        Some((group.namespace_uri(spec)?, spec.name))
    }

    pub fn patch_validate(&self, found: FoundProp, request: &PatchRequest<'_>) -> PatchOutcome {
        self.provider(found)
            .map_or(PatchOutcome::NotApplicable, |p| p.patch_validate(request))
    }

    pub fn patch_exec(&self, found: FoundProp, request: &PatchRequest<'_>) -> PatchOutcome {
        self.provider(found)
            .map_or(PatchOutcome::NotApplicable, |p| p.patch_exec(request))
    }

    pub fn patch_commit(&self, found: FoundProp, request: &PatchRequest<'_>) {
        if let Some(p) = self.provider(found) {
            p.patch_commit(request);
        }
    }

    pub fn patch_rollback(&self, found: FoundProp, request: &PatchRequest<'_>) -> PatchOutcome {
        self.provider(found)
            .map_or(PatchOutcome::NotApplicable, |p| p.patch_rollback(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveprop::{DAV_NAMESPACE, LivePropGroup, LivePropSpec, PatchOperation};

    static EXAMPLE_PROPS: &[LivePropSpec] = &[LivePropSpec {
        ns: 0,
        name: "checksum",
        propid: PropId(20_001),
        is_writable: true,
    }];

    static EXAMPLE_GROUP: LivePropGroup = LivePropGroup {
        specs: EXAMPLE_PROPS,
        namespace_uris: &["urn:example", DAV_NAMESPACE],
    };

    /// Minimal writable provider used to check dispatch.
    struct ExampleProvider;

    impl LivePropertyProvider for ExampleProvider {
        fn group(&self) -> &'static LivePropGroup {
            &EXAMPLE_GROUP
        }

        fn find(&self, ns_uri: &str, name: &str) -> Option<PropId> {
            EXAMPLE_GROUP.find(ns_uri, name)
        }

        fn is_writable(&self, _propid: PropId) -> bool {
            true
        }

        fn render(
            &self,
            _request: &RenderRequest<'_>,
            _config: &DirConfig,
            _namespaces: &NamespaceTable,
        ) -> RenderOutcome {
            RenderOutcome::Rendered("<lp2:checksum>0</lp2:checksum>".to_string())
        }

        fn patch_validate(&self, _request: &PatchRequest<'_>) -> PatchOutcome {
            PatchOutcome::Handled
        }

        fn patch_exec(&self, _request: &PatchRequest<'_>) -> PatchOutcome {
            PatchOutcome::Handled
        }

        fn patch_commit(&self, _request: &PatchRequest<'_>) {}

        fn patch_rollback(&self, _request: &PatchRequest<'_>) -> PatchOutcome {
            PatchOutcome::Handled
        }
    }

    #[test]
    fn test_namespace_indices_start_at_one() {
        let mut table = NamespaceTable::new();
        assert!(table.is_empty());
        assert_eq!(table.register("DAV:"), 1);
        assert_eq!(table.register("urn:example"), 2);
        assert_eq!(table.register("DAV:"), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.uri_of(0), None);
        assert_eq!(table.uri_of(2), Some("urn:example"));
        assert_eq!(table.index_of("urn:missing"), None);
    }

    #[test]
    fn test_xmlns_declarations() {
        let mut table = NamespaceTable::new();
        table.register("DAV:");
        table.register("urn:example");
        assert_eq!(
            table.xmlns_declarations(),
            " xmlns:lp1=\"DAV:\" xmlns:lp2=\"urn:example\""
        );
        assert_eq!(table.declaration(1).as_deref(), Some(" xmlns:lp1=\"DAV:\""));
        assert_eq!(table.declaration(3), None);
    }

    #[test]
    fn test_with_displayname() {
        let registry = LivePropRegistry::with_displayname();
        assert_eq!(registry.namespaces().index_of("DAV:"), Some(1));

        let found = registry.find("DAV:", "displayname").unwrap();
        assert_eq!(found.propid, PropId::DISPLAYNAME);
        assert!(!registry.is_writable(found));
        assert_eq!(registry.name_of(found), Some(("DAV:", "displayname")));
        assert!(registry.find("DAV:", "getetag").is_none());
    }

    #[test]
    fn test_render_dispatch() {
        let registry = LivePropRegistry::with_displayname();
        let found = registry.find("DAV:", "displayname").unwrap();

        let enabled = DirConfig::with_displayname(true);
        let outcome = registry.render(found, "/docs/guide.html", RenderMode::Value, &enabled);
        assert_eq!(outcome.markup(), Some("<lp1:displayname>guide</lp1:displayname>"));

        let outcome = registry.render(found, "/docs/guide.html", RenderMode::Value, &DirConfig::new());
        assert_eq!(outcome, RenderOutcome::NotApplicable);
    }

    #[test]
    fn test_render_all() {
        let registry = LivePropRegistry::with_displayname();

        let all = registry.render_all("/docs/", RenderMode::Value, &DirConfig::with_displayname(true));
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1, "<lp1:displayname>docs</lp1:displayname>");

        assert!(registry.render_all("/docs/", RenderMode::NameOnly, &DirConfig::new()).is_empty());
        assert_eq!(
            registry.render_all("/docs/", RenderMode::SupportedList, &DirConfig::new()).len(),
            1
        );
    }

    #[test]
    fn test_providers_consulted_in_order() {
        let mut registry = LivePropRegistry::with_displayname();
        registry.register(Arc::new(ExampleProvider));

        // DAV: was already registered by the first provider
        assert_eq!(registry.namespaces().index_of("DAV:"), Some(1));
        assert_eq!(registry.namespaces().index_of("urn:example"), Some(2));

        let checksum = registry.find("urn:example", "checksum").unwrap();
        assert_eq!(checksum.propid, PropId(20_001));
        assert!(registry.is_writable(checksum));

        let displayname = registry.find("DAV:", "displayname").unwrap();
        assert_ne!(displayname, checksum);
        assert!(!registry.is_writable(displayname));
    }

    #[test]
    fn test_patch_dispatch() {
        let mut registry = LivePropRegistry::with_displayname();
        registry.register(Arc::new(ExampleProvider));

        let displayname = registry.find("DAV:", "displayname").unwrap();
        let checksum = registry.find("urn:example", "checksum").unwrap();

        let request = PatchRequest {
            resource_url: "/a.txt",
            propid: displayname.propid,
            operation: PatchOperation::Remove,
            value: None,
        };
        assert_eq!(registry.patch_validate(displayname, &request), PatchOutcome::NotApplicable);
        assert_eq!(registry.patch_exec(displayname, &request), PatchOutcome::NotApplicable);
        registry.patch_commit(displayname, &request);
        assert_eq!(registry.patch_rollback(displayname, &request), PatchOutcome::NotApplicable);

        assert_eq!(registry.patch_validate(checksum, &request), PatchOutcome::Handled);
    }
}
