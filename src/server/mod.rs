//! HTTP surface for the table operations.
//!
//! One task per connection, HTTP/1.1 only. Request bodies are collected
//! up to `max_body_bytes` before routing; operation work runs on the
//! blocking pool so a large clustering request never stalls the accept loop.

pub mod response;
pub mod routes;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_LENGTH};
use http::Request;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{info, warn};
use tokio::net::TcpListener;

use crate::config::subsystems::ServerConfig;
use crate::error::{Error, Result};
use crate::service::TableService;
use response::{error_response, ApiResponse};

pub use routes::route;

/// Shared per-server state handed to every connection.
#[derive(Debug)]
pub struct ServerState {
    service: Arc<TableService>,
    allow_origin: HeaderValue,
    max_body_bytes: usize,
}

impl ServerState {
    pub fn new(service: Arc<TableService>, config: &ServerConfig) -> Result<Self> {
        config.validate()?;
        let allow_origin = HeaderValue::from_str(&config.allow_origin)
            .map_err(|_| Error::config(format!("Invalid allow_origin: {}", config.allow_origin)))?;
        Ok(Self {
            service,
            allow_origin,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn service(&self) -> &Arc<TableService> {
        &self.service
    }

    pub fn allow_origin(&self) -> &HeaderValue {
        &self.allow_origin
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

pub struct ApiServer {
    state: Arc<ServerState>,
    listen_addr: SocketAddr,
}

impl ApiServer {
    pub fn new(service: Arc<TableService>, config: ServerConfig) -> Result<Self> {
        Ok(Self {
            state: Arc::new(ServerState::new(service, &config)?),
            listen_addr: config.listen_addr,
        })
    }

    /// Binds the configured address and serves until the process exits.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.listen_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Accept loop over an already-bound listener.
    ///
    /// Connections in flight when `shutdown` resolves are left to finish on
    /// their own tasks.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("API server listening on {}", listener.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            let (stream, peer_addr) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
            };

            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { Ok::<_, Infallible>(handle_request(state, req).await) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!("Connection error from {}: {}", peer_addr, e);
                }
            });
        }
    }
}

async fn handle_request(state: Arc<ServerState>, req: Request<Incoming>) -> ApiResponse {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match read_body(req, state.max_body_bytes()).await {
        Ok(body) => route(&state, &method, &path, body).await,
        Err(e) => error_response(&e, &state.allow_origin),
    };

    info!(
        "{} {} -> {} in {:?}",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    );
    response
}

/// Collects the request body, refusing anything over `limit` bytes.
async fn read_body<B>(req: Request<B>, limit: usize) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.map_or(false, |len| len > limit) {
        return Err(Error::PayloadTooLarge { limit });
    }

    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(Error::PayloadTooLarge { limit })
        }
        Err(e) => Err(Error::malformed(format!("failed to read request body: {}", e))),
    }
}
