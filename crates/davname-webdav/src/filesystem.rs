//! `DavFileSystem` wrapper that adds live properties to any backend.
//!
//! Content operations go straight to the wrapped filesystem. The property
//! hooks (`have_props`, `get_props`, `get_prop`, `patch_props`) first consult
//! the live-property registry, resolving the per-scope configuration from the
//! request URL, and only fall back to the backend's dead properties for names
//! no provider owns.

use crate::error::{WebDavError, WebDavResult};
use dav_server::davpath::DavPath;
use dav_server::fs::{
    DavDirEntry, DavFile, DavFileSystem, DavMetaData, DavProp, FsError, FsFuture, FsStream,
    OpenOptions, ReadDirMeta,
};
use dav_server::localfs::LocalFs;
use davname_core::{
    DirConfig, FoundProp, LivePropRegistry, PatchOperation, PatchOutcome, PatchRequest,
    RenderMode, RenderOutcome, ScopedConfig,
};
use hyper::StatusCode;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// WebDAV filesystem exposing the registry's live properties on top of an
/// inner backend.
#[derive(Clone)]
pub struct DisplayNameFs<F> {
    inner: F,
    registry: Arc<LivePropRegistry>,
    scopes: Arc<ScopedConfig>,
}

impl DisplayNameFs<LocalFs> {
    /// Serve a local directory.
    pub fn local(root: &Path, scopes: ScopedConfig) -> WebDavResult<Self> {
        if !root.is_dir() {
            return Err(WebDavError::InvalidRoot(root.to_path_buf()));
        }
        debug!(root = %root.display(), locations = scopes.locations().len(), "Serving local directory");
        let inner = *LocalFs::new(root, false, false, false);
        Ok(Self::new(inner, scopes))
    }
}

impl<F: DavFileSystem + Clone + Send + Sync> DisplayNameFs<F> {
    /// Wrap `inner` with the display-name provider installed.
    pub fn new(inner: F, scopes: ScopedConfig) -> Self {
        Self::with_registry(
            inner,
            Arc::new(LivePropRegistry::with_displayname()),
            Arc::new(scopes),
        )
    }

    /// Wrap `inner` with a caller-built registry.
    pub fn with_registry(
        inner: F,
        registry: Arc<LivePropRegistry>,
        scopes: Arc<ScopedConfig>,
    ) -> Self {
        Self {
            inner,
            registry,
            scopes,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn registry(&self) -> &LivePropRegistry {
        &self.registry
    }

    pub fn scopes(&self) -> &ScopedConfig {
        &self.scopes
    }

    /// Effective scope configuration for a request path.
    fn config_for(&self, path: &DavPath) -> DirConfig {
        self.scopes.resolve(&path.as_url_string())
    }

    /// Turn a rendered fragment into a `DavProp` that stands on its own.
    fn to_dav_prop(&self, found: FoundProp, markup: &str) -> Option<DavProp> {
        let (ns_uri, name) = self.registry.name_of(found)?;
        let namespaces = self.registry.namespaces();
        let index = namespaces.index_of(ns_uri)?;
        let decl = namespaces.declaration(index)?;
        Some(DavProp {
            name: name.to_string(),
            prefix: Some(format!("lp{index}")),
            namespace: Some(ns_uri.to_string()),
            xml: Some(attach_namespace(markup, &decl).into_bytes()),
        })
    }

    /// Run a PROPPATCH step for a live property.
    ///
    /// Protected properties are refused here and never reach their provider.
    fn patch_live(&self, found: FoundProp, request: &PatchRequest<'_>) -> StatusCode {
        if !self.registry.is_writable(found) {
            debug!(url = %request.resource_url, propid = %found.propid, "Refusing write to protected live property");
            return StatusCode::FORBIDDEN;
        }
        if self.registry.patch_validate(found, request) != PatchOutcome::Handled {
            return StatusCode::CONFLICT;
        }
        if self.registry.patch_exec(found, request) == PatchOutcome::Handled {
            self.registry.patch_commit(found, request);
            StatusCode::OK
        } else {
            self.registry.patch_rollback(found, request);
            StatusCode::CONFLICT
        }
    }
}

/// Insert a namespace declaration into the start tag of `fragment`.
///
/// `<lp1:displayname>x</lp1:displayname>` with ` xmlns:lp1="DAV:"` becomes
/// `<lp1:displayname xmlns:lp1="DAV:">x</lp1:displayname>`.
fn attach_namespace(fragment: &str, decl: &str) -> String {
    let Some(end) = fragment.find('>') else {
        return fragment.to_string();
    };
    let at = if fragment[..end].ends_with('/') {
        end - 1
    } else {
        end
    };
    let mut out = String::with_capacity(fragment.len() + decl.len());
    out.push_str(&fragment[..at]);
    out.push_str(decl);
    out.push_str(&fragment[at..]);
    out
}

impl<F: DavFileSystem + Clone + Send + Sync + 'static> DavFileSystem for DisplayNameFs<F> {
    fn open<'a>(&'a self, path: &'a DavPath, options: OpenOptions) -> FsFuture<'a, Box<dyn DavFile>> {
        self.inner.open(path, options)
    }

    fn read_dir<'a>(
        &'a self,
        path: &'a DavPath,
        meta: ReadDirMeta,
    ) -> FsFuture<'a, FsStream<Box<dyn DavDirEntry>>> {
        self.inner.read_dir(path, meta)
    }

    fn metadata<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, Box<dyn DavMetaData>> {
        self.inner.metadata(path)
    }

    fn symlink_metadata<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, Box<dyn DavMetaData>> {
        self.inner.symlink_metadata(path)
    }

    fn create_dir<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, ()> {
        self.inner.create_dir(path)
    }

    fn remove_dir<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, ()> {
        self.inner.remove_dir(path)
    }

    fn remove_file<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, ()> {
        self.inner.remove_file(path)
    }

    fn rename<'a>(&'a self, from: &'a DavPath, to: &'a DavPath) -> FsFuture<'a, ()> {
        self.inner.rename(from, to)
    }

    fn copy<'a>(&'a self, from: &'a DavPath, to: &'a DavPath) -> FsFuture<'a, ()> {
        self.inner.copy(from, to)
    }

    fn have_props<'a>(
        &'a self,
        path: &'a DavPath,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            if self.config_for(path).enabled() {
                return true;
            }
            self.inner.have_props(path).await
        })
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.as_url_string()))]
    fn get_props<'a>(&'a self, path: &'a DavPath, do_content: bool) -> FsFuture<'a, Vec<DavProp>> {
        Box::pin(async move {
            let mut props = if self.inner.have_props(path).await {
                self.inner.get_props(path, do_content).await?
            } else {
                Vec::new()
            };

            let url = path.as_url_string();
            let config = self.scopes.resolve(&url);
            let mode = if do_content {
                RenderMode::Value
            } else {
                RenderMode::NameOnly
            };
            for (found, markup) in self.registry.render_all(&url, mode, &config) {
                if let Some(prop) = self.to_dav_prop(found, &markup) {
                    props.push(prop);
                }
            }

            trace!(count = props.len(), "Properties collected");
            Ok(props)
        })
    }

    #[instrument(level = "debug", skip(self, prop), fields(path = %path.as_url_string(), name = %prop.name))]
    fn get_prop<'a>(&'a self, path: &'a DavPath, prop: DavProp) -> FsFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let ns_uri = prop.namespace.as_deref().unwrap_or_default();
            let Some(found) = self.registry.find(ns_uri, &prop.name) else {
                return self.inner.get_prop(path, prop).await;
            };

            let url = path.as_url_string();
            let config = self.scopes.resolve(&url);
            match self.registry.render(found, &url, RenderMode::Value, &config) {
                RenderOutcome::Rendered(markup) => self
                    .to_dav_prop(found, &markup)
                    .and_then(|p| p.xml)
                    .ok_or(FsError::NotFound),
                RenderOutcome::NotApplicable => {
                    trace!("Live property not applicable");
                    Err(FsError::NotFound)
                }
            }
        })
    }

    #[instrument(level = "debug", skip(self, patch), fields(path = %path.as_url_string(), count = patch.len()))]
    fn patch_props<'a>(
        &'a self,
        path: &'a DavPath,
        patch: Vec<(bool, DavProp)>,
    ) -> FsFuture<'a, Vec<(StatusCode, DavProp)>> {
        Box::pin(async move {
            let url = path.as_url_string();
            let mut results = Vec::with_capacity(patch.len());
            let mut passthrough = Vec::new();

            for (set, prop) in patch {
                let ns_uri = prop.namespace.as_deref().unwrap_or_default();
                let Some(found) = self.registry.find(ns_uri, &prop.name) else {
                    passthrough.push((set, prop));
                    continue;
                };
                let request = PatchRequest {
                    resource_url: &url,
                    propid: found.propid,
                    operation: if set {
                        PatchOperation::Set
                    } else {
                        PatchOperation::Remove
                    },
                    value: prop.xml.as_deref(),
                };
                let status = self.patch_live(found, &request);
                results.push((status, DavProp { xml: None, ..prop }));
            }

            if !passthrough.is_empty() {
                results.extend(self.inner.patch_props(path, passthrough).await?);
            }
            Ok(results)
        })
    }
}
