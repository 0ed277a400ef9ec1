//! Test harness for WebDAV integration tests.
//!
//! Provides a `TestServer` that serves a temporary directory over HTTP,
//! along with request helpers for the WebDAV methods the tests use.

#![allow(dead_code)]

use dav_server::fs::DavProp;
use davname_core::{DAV_NAMESPACE, DirConfig, ScopedConfig};
use davname_webdav::{DisplayNameFs, ServerConfig, WebDavServer};
use reqwest::{Client, Method, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// How long to wait for the server to accept requests.
const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Scope configuration enabling the display name for every URL.
pub fn enabled_everywhere() -> ScopedConfig {
    ScopedConfig::new(DirConfig::with_displayname(true))
}

/// A `DAV:displayname` property request as dav-server hands it to the filesystem.
pub fn displayname_prop() -> DavProp {
    DavProp {
        name: "displayname".to_string(),
        prefix: Some("D".to_string()),
        namespace: Some(DAV_NAMESPACE.to_string()),
        xml: None,
    }
}

/// WebDAV server over a temporary directory, stopped on drop.
pub struct TestServer {
    server: WebDavServer,
    client: Client,
    /// Temporary root directory (cleaned up on drop).
    root: TempDir,
}

impl TestServer {
    /// Serve a fresh temporary directory with the display name enabled.
    pub async fn with_temp_root() -> Self {
        Self::with_scopes(enabled_everywhere()).await
    }

    /// Serve a fresh temporary directory with the given scopes.
    pub async fn with_scopes(scopes: ScopedConfig) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let fs = DisplayNameFs::local(root.path(), scopes).expect("Failed to open root");
        let server = WebDavServer::start(fs, ServerConfig::default())
            .await
            .expect("Failed to start server");

        let test_server = Self {
            server,
            client: Client::new(),
            root,
        };
        test_server.wait_ready().await;
        test_server
    }

    async fn wait_ready(&self) {
        let deadline = tokio::time::Instant::now() + READY_TIMEOUT;
        loop {
            if self.propfind("/", "0").await.status() == StatusCode::MULTI_STATUS {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "Server at {} never became ready",
                self.server.url()
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.url(), path)
    }

    /// PROPFIND with an empty body (allprop).
    pub async fn propfind(&self, path: &str, depth: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"PROPFIND").unwrap(), self.url(path))
            .header("Depth", depth)
            .send()
            .await
            .expect("PROPFIND request failed")
    }

    /// PROPFIND returning status and body text.
    pub async fn propfind_body(&self, path: &str, depth: &str) -> (StatusCode, String) {
        let resp = self.propfind(path, depth).await;
        let status = resp.status();
        (status, resp.text().await.unwrap_or_default())
    }

    /// PROPFIND with an explicit XML request body.
    pub async fn propfind_xml(&self, path: &str, depth: &str, body: &str) -> (StatusCode, String) {
        let resp = self
            .client
            .request(Method::from_bytes(b"PROPFIND").unwrap(), self.url(path))
            .header("Depth", depth)
            .header("Content-Type", "application/xml")
            .body(body.to_string())
            .send()
            .await
            .expect("PROPFIND request failed");
        let status = resp.status();
        (status, resp.text().await.unwrap_or_default())
    }

    /// PROPPATCH with an XML request body.
    pub async fn proppatch(&self, path: &str, body: &str) -> (StatusCode, String) {
        let resp = self
            .client
            .request(Method::from_bytes(b"PROPPATCH").unwrap(), self.url(path))
            .header("Content-Type", "application/xml")
            .body(body.to_string())
            .send()
            .await
            .expect("PROPPATCH request failed");
        let status = resp.status();
        (status, resp.text().await.unwrap_or_default())
    }

    pub async fn put_ok(&self, path: &str, content: Vec<u8>) {
        let resp = self
            .client
            .put(self.url(path))
            .body(content)
            .send()
            .await
            .expect("PUT request failed");
        assert!(
            resp.status().is_success(),
            "PUT {path} failed with status {}",
            resp.status()
        );
    }

    pub async fn mkcol_ok(&self, path: &str) {
        let resp = self
            .client
            .request(Method::from_bytes(b"MKCOL").unwrap(), self.url(path))
            .send()
            .await
            .expect("MKCOL request failed");
        assert!(
            resp.status().is_success(),
            "MKCOL {path} failed with status {}",
            resp.status()
        );
    }

    pub async fn get_bytes(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed");
        let status = resp.status();
        let bytes = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        (status, bytes)
    }
}
