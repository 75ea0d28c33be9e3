//! Gateway HTTP server.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy handler and middleware
//! - Resolve each request path to a backend via the route manager
//! - Forward requests to the backend and stream responses back
//! - Rebind the listener when the gateway port changes

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TimeoutConfig;
use crate::http::request::{append_forwarded_for, strip_hop_by_hop, MakeRequestUuid};
use crate::lifecycle::Shutdown;
use crate::routing::RouteManager;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteManager>,
    pub client: Client<HttpConnector, Body>,
}

/// Forwarding server for the gateway port.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    pub fn new(routes: Arc<RouteManager>, timeouts: &TimeoutConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState { routes, client };

        Self {
            router: Self::build_router(timeouts, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(timeouts: &TimeoutConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs))),
            )
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        tracing::info!(address = %listener.local_addr()?, "Gateway listening");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Serve on `listener`, then rebind on `bind_host` each time `port_rx`
    /// changes, until shutdown.
    ///
    /// The caller binds the initial port. Failing to bind a later port is
    /// logged and the server waits for the next change.
    pub async fn run_on_port(
        self,
        mut listener: TcpListener,
        bind_host: String,
        mut port_rx: watch::Receiver<String>,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let _ = port_rx.borrow_and_update();

        loop {
            let address = listener.local_addr()?;
            tracing::info!(address = %address, "Gateway listening");

            let rebind = Arc::new(AtomicBool::new(false));
            let stop = {
                let rebind = rebind.clone();
                let shutdown = shutdown.clone();
                let mut changes = port_rx.clone();
                async move {
                    tokio::select! {
                        _ = shutdown.wait() => {}
                        changed = changes.changed() => {
                            if changed.is_ok() {
                                rebind.store(true, Ordering::SeqCst);
                            }
                        }
                    }
                }
            };

            let app = self.router.clone().into_make_service_with_connect_info::<SocketAddr>();
            axum::serve(listener, app).with_graceful_shutdown(stop).await?;

            if !rebind.load(Ordering::SeqCst) {
                tracing::info!("Gateway stopped");
                return Ok(());
            }
            tracing::info!(old_address = %address, "Gateway port changed, rebinding");

            listener = loop {
                let port = port_rx.borrow_and_update().clone();
                let address = format!("{}:{}", bind_host, port);

                match TcpListener::bind(&address).await {
                    Ok(listener) => break listener,
                    Err(e) => {
                        tracing::error!(address = %address, error = %e, "Failed to bind gateway port");
                        tokio::select! {
                            _ = shutdown.wait() => return Ok(()),
                            changed = port_rx.changed() => {
                                if changed.is_err() {
                                    return Ok(());
                                }
                            }
                        }
                    }
                }
            };
        }
    }

    /// The router, for embedding or testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Main proxy handler.
/// Resolves the backend by longest path prefix and forwards the request.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    let Some(backend) = state.routes.get_proxy(&path) else {
        tracing::warn!(path = %path, client = %client_addr, "No route matched");
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    let (mut parts, body) = request.into_parts();
    parts.uri = match backend.rewrite_uri(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(path = %path, backend = %backend.base_url(), error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Invalid upstream URI").into_response();
        }
    };
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, client_addr.ip());

    tracing::debug!(path = %path, upstream = %parts.uri, "Forwarding request");

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(path = %path, backend = %backend.base_url(), error = %e, "Upstream request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
