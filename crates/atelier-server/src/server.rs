//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Request, State,
    },
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use crate::reload::{reload_client_script, ReloadHub, ReloadMessage};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Directory served to the browser (the build output root)
    pub out_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Suppress the startup log line
    pub quiet: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("dist"),
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: true,
            quiet: false,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    Bind(SocketAddr, String),

    #[error("File watch error: {0}")]
    Watch(String),
}

/// Shared server state.
#[derive(Clone)]
struct ServerState {
    hub: ReloadHub,
}

/// Development server over the build output.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the server. Runs for the lifetime of the development session;
    /// there is no programmatic stop.
    pub async fn start(self, hub: ReloadHub) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .expect("Invalid address");

        let state = ServerState { hub };

        let app = Router::new()
            .route("/__reload", get(ws_handler))
            .route("/__reload.js", get(reload_script_handler))
            .fallback_service(ServeDir::new(&self.config.out_dir))
            .layer(middleware::from_fn(inject_reload_script))
            .with_state(state);

        if !self.config.quiet {
            tracing::info!(
                "Serving {} at http://{}",
                self.config.out_dir.display(),
                addr
            );
        }

        // Open browser if configured
        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Bind(addr, e.to_string()))?;

        Ok(())
    }
}

/// Append the reload client to every HTML response.
async fn inject_reload_script(req: Request, next: Next) -> Response {
    let res = next.run(req).await;

    let is_html = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/html"))
        .unwrap_or(false);
    if !is_html {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let injected = inject_into_html(&String::from_utf8_lossy(&bytes));
    // The body length changed; let hyper recompute it.
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(injected))
}

/// Insert the script tag before `</body>`, or append when absent.
fn inject_into_html(html: &str) -> String {
    const TAG: &str = r#"<script src="/__reload.js"></script>"#;
    match html.rfind("</body>") {
        Some(idx) => format!("{}{}{}", &html[..idx], TAG, &html[idx..]),
        None => format!("{html}{TAG}"),
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: ServerState) {
    let mut rx = state.hub.subscribe();

    // Send connected message
    let msg = serde_json::to_string(&ReloadMessage::Connected).unwrap();
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    // Forward reload messages to the client
    while let Ok(reload_msg) = rx.recv().await {
        let json = serde_json::to_string(&reload_msg).unwrap();
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 3000);
        assert!(server.config.open);
    }

    #[test]
    fn injects_before_the_closing_body_tag() {
        let html = "<html><body><p>hi</p></body></html>";

        let out = inject_into_html(html);

        assert!(out.contains(r#"<script src="/__reload.js"></script></body>"#));
    }

    #[test]
    fn appends_when_no_body_tag_exists() {
        let out = inject_into_html("<p>fragment</p>");

        assert!(out.starts_with("<p>fragment</p>"));
        assert!(out.ends_with(r#"<script src="/__reload.js"></script>"#));
    }
}
