//! Live-property provider contract and the `DAV:displayname` provider.
//!
//! A host WebDAV framework asks each registered provider whether it owns a
//! property ([`LivePropertyProvider::find`]), whether that property may be
//! written, and how to render it into a PROPFIND response. The display-name
//! provider owns exactly one read-only property whose value is computed from
//! the resource URL by [`derive_name`].

use crate::config::DirConfig;
use crate::name::derive_name;
use crate::registry::NamespaceTable;
use quick_xml::escape::escape;
use std::fmt;
use tracing::trace;

/// The core WebDAV namespace URI.
pub const DAV_NAMESPACE: &str = "DAV:";

/// Namespace URIs used by [`DISPLAYNAME_GROUP`], indexed by [`LivePropSpec::ns`].
pub const NAMESPACE_URIS: &[&str] = &[DAV_NAMESPACE];

/// Index of [`DAV_NAMESPACE`] within [`NAMESPACE_URIS`].
pub const NS_DAV: usize = 0;

/// Identifier of a live property, unique across all providers of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropId(pub u32);

impl PropId {
    /// First id of the range reserved for properties in the `DAV:` namespace.
    pub const CORE: u32 = 10_000;

    /// `DAV:displayname`.
    pub const DISPLAYNAME: PropId = PropId(PropId::CORE + 1);
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static description of one live property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivePropSpec {
    /// Index into the owning group's `namespace_uris`.
    pub ns: usize,
    /// Local element name.
    pub name: &'static str,
    pub propid: PropId,
    pub is_writable: bool,
}

/// The properties a provider owns, together with the namespaces they live in.
#[derive(Debug)]
pub struct LivePropGroup {
    pub specs: &'static [LivePropSpec],
    pub namespace_uris: &'static [&'static str],
}

impl LivePropGroup {
    /// Look up a property by namespace URI and local name.
    pub fn find(&self, ns_uri: &str, name: &str) -> Option<PropId> {
        self.specs
            .iter()
            .find(|spec| spec.name == name && self.namespace_uri(spec) == Some(ns_uri))
            .map(|spec| spec.propid)
    }

    /// Spec for a property id, if this group owns it.
    pub fn info(&self, propid: PropId) -> Option<&'static LivePropSpec> {
        self.specs.iter().find(|spec| spec.propid == propid)
    }

    /// Namespace URI of a spec in this group.
    pub fn namespace_uri(&self, spec: &LivePropSpec) -> Option<&'static str> {
        self.namespace_uris.get(spec.ns).copied()
    }
}

/// The single property owned by [`DisplayNameProvider`].
pub static DISPLAYNAME_PROPS: &[LivePropSpec] = &[LivePropSpec {
    ns: NS_DAV,
    name: "displayname",
    propid: PropId::DISPLAYNAME,
    is_writable: false,
}];

pub static DISPLAYNAME_GROUP: LivePropGroup = LivePropGroup {
    specs: DISPLAYNAME_PROPS,
    namespace_uris: NAMESPACE_URIS,
};

/// What the host wants inserted for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Element with its value.
    Value,
    /// Empty element, for `<D:propname/>` requests.
    NameOnly,
    /// `<D:supported-live-property>` descriptor.
    SupportedList,
}

/// Result of rendering a property for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The property is undefined for this resource. Not an error.
    NotApplicable,
    /// XML fragment to insert into the response.
    Rendered(String),
}

impl RenderOutcome {
    pub fn markup(&self) -> Option<&str> {
        match self {
            RenderOutcome::NotApplicable => None,
            RenderOutcome::Rendered(markup) => Some(markup),
        }
    }
}

/// A single render call, built by the host and discarded afterwards.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Resource URL path, still percent-encoded.
    pub resource_url: &'a str,
    pub propid: PropId,
    pub mode: RenderMode,
}

/// PROPPATCH instruction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOperation {
    Set,
    Remove,
}

/// One property of a PROPPATCH transaction routed to a provider.
#[derive(Debug, Clone, Copy)]
pub struct PatchRequest<'a> {
    pub resource_url: &'a str,
    pub propid: PropId,
    pub operation: PatchOperation,
    /// Serialized element for `Set`, `None` for `Remove`.
    pub value: Option<&'a [u8]>,
}

/// Answer of a provider to a PROPPATCH hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The provider does not take part in this patch.
    NotApplicable,
    /// The provider accepted (validate) or applied (exec/rollback) the step.
    Handled,
}

/// Capability set a live-property provider offers to the host.
pub trait LivePropertyProvider: Send + Sync {
    /// Property specs and namespaces owned by this provider.
    fn group(&self) -> &'static LivePropGroup;

    /// Return the id of the property named `ns_uri` + `name`, or `None` to let
    /// the host ask another provider.
    fn find(&self, ns_uri: &str, name: &str) -> Option<PropId>;

    fn is_writable(&self, propid: PropId) -> bool;

    /// Render one property for one resource.
    ///
    /// `config` is the per-scope configuration resolved by the host for the
    /// resource; `namespaces` supplies the host-assigned prefix index.
    fn render(
        &self,
        request: &RenderRequest<'_>,
        config: &DirConfig,
        namespaces: &NamespaceTable,
    ) -> RenderOutcome;

    fn patch_validate(&self, request: &PatchRequest<'_>) -> PatchOutcome;

    fn patch_exec(&self, request: &PatchRequest<'_>) -> PatchOutcome;

    fn patch_commit(&self, request: &PatchRequest<'_>);

    fn patch_rollback(&self, request: &PatchRequest<'_>) -> PatchOutcome;
}

/// Provides the read-only `DAV:displayname` live property.
///
/// Stateless: every call depends only on its arguments, so one instance can
/// be shared by all request handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayNameProvider;

impl DisplayNameProvider {
    pub const fn new() -> Self {
        Self
    }
}

impl LivePropertyProvider for DisplayNameProvider {
    fn group(&self) -> &'static LivePropGroup {
        &DISPLAYNAME_GROUP
    }

    fn find(&self, ns_uri: &str, name: &str) -> Option<PropId> {
        DISPLAYNAME_GROUP.find(ns_uri, name)
    }

    fn is_writable(&self, propid: PropId) -> bool {
        DISPLAYNAME_GROUP
            .info(propid)
            .is_some_and(|spec| spec.is_writable)
    }

    fn render(
        &self,
        request: &RenderRequest<'_>,
        config: &DirConfig,
        namespaces: &NamespaceTable,
    ) -> RenderOutcome {
        let Some(spec) = DISPLAYNAME_GROUP.info(request.propid) else {
            trace!(propid = %request.propid, "not a display-name property");
            return RenderOutcome::NotApplicable;
        };
        let Some(ns_uri) = DISPLAYNAME_GROUP.namespace_uri(spec) else {
            return RenderOutcome::NotApplicable;
        };

        match request.mode {
            // Support is advertised even where the value is switched off.
            RenderMode::SupportedList => RenderOutcome::Rendered(format!(
                "<D:supported-live-property D:name=\"{}\" D:namespace=\"{}\"/>",
                spec.name, ns_uri
            )),
            RenderMode::Value | RenderMode::NameOnly => {
                if !config.enabled() {
                    trace!(url = %request.resource_url, "displayname disabled for scope");
                    return RenderOutcome::NotApplicable;
                }
                let Some(global_ns) = namespaces.index_of(ns_uri) else {
                    trace!(ns = %ns_uri, "namespace not registered with host");
                    return RenderOutcome::NotApplicable;
                };
                RenderOutcome::Rendered(render_element(request, spec.name, global_ns))
            }
        }
    }

    // The display name is never writable, so none of the PROPPATCH hooks
    // have anything to do.

    fn patch_validate(&self, _request: &PatchRequest<'_>) -> PatchOutcome {
        PatchOutcome::NotApplicable
    }

    fn patch_exec(&self, _request: &PatchRequest<'_>) -> PatchOutcome {
        PatchOutcome::NotApplicable
    }

    fn patch_commit(&self, _request: &PatchRequest<'_>) {}

    fn patch_rollback(&self, _request: &PatchRequest<'_>) -> PatchOutcome {
        PatchOutcome::NotApplicable
    }
}

/// `<lpN:name>value</lpN:name>` or `<lpN:name/>`.
fn render_element(request: &RenderRequest<'_>, tag: &str, global_ns: usize) -> String {
    if request.mode == RenderMode::NameOnly {
        return format!("<lp{global_ns}:{tag}/>");
    }
    let name = derive_name(request.resource_url);
    format!(
        "<lp{global_ns}:{tag}>{value}</lp{global_ns}:{tag}>",
        value = escape(name.as_str())
    )
}
