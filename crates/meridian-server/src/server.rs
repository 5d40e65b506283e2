//! Watch-mode server implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;

use meridian_static::{BuildConfig, StaticBuilder};

use crate::reload::{
    inject_reload_script, reload_client_script, ReloadHub, ReloadMessage, RELOAD_PATH,
    RELOAD_SCRIPT_PATH,
};
use crate::watcher::{FileWatcher, WatchEvent, WatchScope};

/// Configuration for watch mode.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site configuration; assets are bundled into `source_dir/assets_dir`
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig {
                minify: false,
                ..BuildConfig::default()
            },
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Build(#[from] meridian_static::BuildError),

    #[error("Build task failed: {0}")]
    TaskError(String),
}

/// Watch-mode server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Where watch mode writes bundled assets.
    pub fn assets_dir(&self) -> PathBuf {
        self.config
            .build
            .source_dir
            .join(&self.config.build.assets_dir)
    }

    /// Bundle once, then watch, rebuild and serve until the process exits.
    ///
    /// A failure of the initial bundle aborts; later failures are reported to
    /// connected pages and the previous assets stay in place.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let builder = Arc::new(StaticBuilder::new(self.config.build.clone()));
        let assets_dir = self.assets_dir();

        let count = rebundle(&builder, &assets_dir).await?;
        tracing::info!("Built {} assets into {}", count, assets_dir.display());

        let hub = ReloadHub::new();

        let scope = WatchScope::new(
            &self.config.build.source_dir,
            &[assets_dir.clone(), self.config.build.output_dir.clone()],
        )
        .map_err(|e| ServerError::WatchError(e.to_string()))?;
        let (watcher, mut rx) =
            FileWatcher::new(scope).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let watch_hub = hub.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&builder, &assets_dir, &watch_hub, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(&self.config.build.source_dir, hub);

        tracing::info!("Watching for changes...");
        tracing::info!(
            "Serving {} at http://{}",
            self.config.build.source_dir.display(),
            addr
        );

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Bundle assets on a blocking thread. Returns the number of files written.
async fn rebundle(builder: &Arc<StaticBuilder>, assets_dir: &Path) -> Result<usize, ServerError> {
    let builder = Arc::clone(builder);
    let assets_dir = assets_dir.to_path_buf();

    let assets = tokio::task::spawn_blocking(move || builder.bundle_assets(&assets_dir, false))
        .await
        .map_err(|e| ServerError::TaskError(e.to_string()))??;

    Ok(assets.len())
}

/// Handle file watch events.
async fn handle_watch_event(
    builder: &Arc<StaticBuilder>,
    assets_dir: &Path,
    hub: &ReloadHub,
    event: WatchEvent,
) {
    match event {
        WatchEvent::SourceModified(path) => {
            tracing::info!("Source modified: {}", path.display());

            match rebundle(builder, assets_dir).await {
                Ok(count) => {
                    tracing::info!("Rebuilt {} assets", count);
                    hub.send(ReloadMessage::Reload);
                }
                Err(e) => {
                    tracing::warn!("Rebuild failed: {}", e);
                    hub.send(ReloadMessage::BuildFailed {
                        message: e.to_string(),
                    });
                }
            }
        }

        WatchEvent::PageModified(path) => {
            tracing::info!("Page modified: {}", path.display());
            hub.send(ReloadMessage::Reload);
        }

        WatchEvent::Changed(path) => {
            tracing::debug!("Changed: {}", path.display());
            hub.send(ReloadMessage::Reload);
        }
    }
}

/// Routes: reload endpoints, everything else served from `root`.
fn router(root: &Path, hub: ReloadHub) -> Router {
    Router::new()
        .route(RELOAD_PATH, get(ws_handler))
        .route(RELOAD_SCRIPT_PATH, get(reload_script_handler))
        .fallback_service(ServeDir::new(root))
        .layer(middleware::map_response(inject_into_html))
        .with_state(hub)
}

/// Add the reload client to full HTML responses.
async fn inject_into_html(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));

    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read page body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_reload_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(html))
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<ReloadHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, hub))
}

/// Forward reload messages to one connected page.
async fn handle_ws(mut socket: WebSocket, hub: ReloadHub) {
    let mut rx = hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected)
        .await
        .is_err()
    {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send_message(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Reload client lagged by {} messages", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
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
    use std::fs;
    use tempfile::tempdir;

    fn html_response(status: StatusCode, body: &str) -> Response {
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 7777);
        assert!(!server.config.build.minify);
        assert_eq!(server.assets_dir(), PathBuf::from("./Assets"));
    }

    #[tokio::test]
    async fn injects_reload_script_into_pages() {
        let response = inject_into_html(html_response(StatusCode::OK, "<body></body>")).await;

        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
        assert_eq!(
            body_text(response).await,
            "<body><script src=\"/__reload.js\"></script>\n</body>"
        );
    }

    #[tokio::test]
    async fn leaves_other_responses_alone() {
        let not_modified = inject_into_html(html_response(StatusCode::NOT_MODIFIED, "")).await;
        assert_eq!(body_text(not_modified).await, "");

        let css = Response::builder()
            .header(header::CONTENT_TYPE, "text/css")
            .body(Body::from("body{}"))
            .unwrap();
        assert_eq!(body_text(inject_into_html(css).await).await, "body{}");
    }

    #[tokio::test]
    async fn rebundles_into_source_tree() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src/js")).unwrap();
        fs::write(temp.path().join("src/js/base.js"), "run();\n").unwrap();

        let config = DevServerConfig {
            build: BuildConfig {
                source_dir: temp.path().to_path_buf(),
                entries: vec!["src/js/*.js".to_string()],
                minify: false,
                ..BuildConfig::default()
            },
            ..DevServerConfig::default()
        };
        let server = DevServer::new(config);
        let builder = Arc::new(StaticBuilder::new(server.config.build.clone()));

        let count = rebundle(&builder, &server.assets_dir()).await.unwrap();

        assert_eq!(count, 1);
        let js = fs::read_to_string(temp.path().join("Assets/base.js")).unwrap();
        assert!(js.contains("  run();"));
    }

    #[tokio::test]
    async fn source_change_broadcasts_build_failure() {
        let temp = tempdir().unwrap();
        let builder = Arc::new(StaticBuilder::new(BuildConfig {
            source_dir: temp.path().to_path_buf(),
            entries: vec!["src/js/*.js".to_string()],
            ..BuildConfig::default()
        }));
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        handle_watch_event(
            &builder,
            &temp.path().join("Assets"),
            &hub,
            WatchEvent::SourceModified(temp.path().join("src/js/base.js")),
        )
        .await;

        match rx.try_recv() {
            Ok(ReloadMessage::BuildFailed { message }) => {
                assert!(message.contains("no files match"));
            }
            other => panic!("Expected BuildFailed, got {:?}", other),
        }
    }
}
