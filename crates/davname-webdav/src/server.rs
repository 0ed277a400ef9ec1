//! HTTP listener serving a [`DisplayNameFs`] through dav-server.
//!
//! One task accepts connections and spawns one task per connection. Stopping
//! the server ends the accept loop and asks open connections to finish their
//! current request before closing.

use crate::error::WebDavResult;
use crate::filesystem::DisplayNameFs;
use dav_server::fs::DavFileSystem;
use dav_server::{DavHandler, fakels::FakeLs};
use hyper::Request;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Listen address for the WebDAV server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to bind to (0 = auto-assign).
    pub port: u16,
    pub bind_address: IpAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

/// A running WebDAV server. Dropping it stops the server.
pub struct WebDavServer {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl WebDavServer {
    /// Bind the listener and start serving `fs`.
    pub async fn start<F>(fs: DisplayNameFs<F>, config: ServerConfig) -> WebDavResult<Self>
    where
        F: DavFileSystem + Clone + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        info!(
            addr = %addr,
            locations = fs.scopes().locations().len(),
            "WebDAV server listening"
        );

        // FakeLs answers LOCK/UNLOCK without tracking anything, which is
        // enough for clients that refuse to write without a lock token
        let handler = DavHandler::builder()
            .filesystem(Box::new(fs))
            .locksystem(FakeLs::new())
            .build_handler();

        let (shutdown, stop_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(listener, handler, stop_rx));

        Ok(Self {
            addr,
            shutdown,
            task: Some(task),
        })
    }

    /// The bound address, with the real port when 0 was requested.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for the accept loop to end.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!(addr = %self.addr, "WebDAV server stopped");
    }
}

impl Drop for WebDavServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, handler: DavHandler, mut stop: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(serve_connection(stream, peer, handler.clone(), stop.clone()));
                }
                Err(e) => error!(error = %e, "Failed to accept connection"),
            },
            _ = stop.changed() => {
                debug!("Accept loop stopping");
                break;
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: DavHandler,
    mut stop: watch::Receiver<bool>,
) {
    let service = service_fn(move |req: Request<Incoming>| {
        let handler = handler.clone();
        async move { Ok::<_, Infallible>(handler.handle(req).await) }
    });

    let builder = auto::Builder::new(TokioExecutor::new());
    let conn = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    warn!(peer = %peer, error = %e, "HTTP connection error");
                }
                break;
            }
            _ = stop.changed(), if !draining => {
                debug!(peer = %peer, "Draining connection");
                conn.as_mut().graceful_shutdown();
                draining = true;
            }
        }
    }
}
