// Static file server for the site: no routing, no dynamic response.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::Path as AxumPath;
use axum::extract::State as AxumState;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{debug, info, warn};
use snafu::prelude::*;

use crate::args::ServeArgs;
use crate::page::config_reader::load_config;
use crate::page::{BindingSnafu, PageResult, ServingSnafu};

pub const DEFAULT_ROOT: &str = "public";
pub const DEFAULT_PORT: u16 = 7007;

struct ServerState {
    root: PathBuf,
}

/// The directory to serve and the port, from the flags or the configuration.
pub fn resolve_serve_settings(args: &ServeArgs, config_path: Option<&str>) -> PageResult<(PathBuf, u16)> {
    let loaded = load_config(config_path)?;
    let server = loaded.config.server.clone().unwrap_or_default();
    let root = match (&args.root, &server.root) {
        (Some(r), _) => PathBuf::from(r),
        (None, Some(r)) => loaded.resolve(r),
        (None, None) => loaded.resolve(DEFAULT_ROOT),
    };
    let port = args.port.or(server.port).unwrap_or(DEFAULT_PORT);
    Ok((root, port))
}

pub async fn run_serve(args: &ServeArgs, config_path: Option<&str>) -> PageResult<()> {
    let (root, port) = resolve_serve_settings(args, config_path)?;
    serve(root, port).await
}

pub fn router(root: PathBuf) -> Router {
    let state = Arc::new(ServerState { root });
    Router::new()
        .route("/", get(route_index))
        .route("/{*path}", get(route_any))
        .with_state(state)
}

pub async fn serve(root: PathBuf, port: u16) -> PageResult<()> {
    let address = format!("0.0.0.0:{port}");
    info!("Serving {}", root.display());
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .context(BindingSnafu {
            address: address.clone(),
        })?;
    println!(" ➜   Open: http://localhost:{port}");
    axum::serve(listener, router(root))
        .await
        .context(ServingSnafu)
}

async fn route_index(AxumState(state): AxumState<Arc<ServerState>>) -> Response {
    serve_route(&state, "").await
}

async fn route_any(
    AxumPath(path): AxumPath<String>,
    AxumState(state): AxumState<Arc<ServerState>>,
) -> Response {
    serve_route(&state, &path).await
}

async fn serve_route(state: &ServerState, raw_path: &str) -> Response {
    let rel = match sanitize_rel_path(raw_path) {
        Some(p) => p,
        None => {
            warn!("Rejected path {:?}", raw_path);
            return (StatusCode::BAD_REQUEST, "invalid path").into_response();
        }
    };
    match resolve_static_file(&state.root, &rel) {
        Some(file) => {
            debug!("GET /{} -> {}", raw_path, file.display());
            serve_static(&file).await
        }
        None => {
            debug!("GET /{} -> not found", raw_path);
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

// The request path as a path under the root. Anything that could leave the
// root (`..`, an absolute path, a drive prefix) is refused.
fn sanitize_rel_path(path: &str) -> Option<PathBuf> {
    let rel = Path::new(path.trim_start_matches('/'));
    rel.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| rel.to_path_buf())
}

// Directories are served through their index.html.
fn resolve_static_file(root: &Path, rel: &Path) -> Option<PathBuf> {
    let full = root.join(rel);
    if full.is_dir() {
        let index = full.join("index.html");
        return index.is_file().then_some(index);
    }
    full.is_file().then_some(full)
}

async fn serve_static(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(path))], bytes).into_response(),
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "cannot read file").into_response()
        }
    }
}

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content types of the files a site is made of, by extension.
const CONTENT_TYPES: &[(&[&str], &str)] = &[
    (&["html", "htm"], "text/html; charset=utf-8"),
    (&["css"], "text/css; charset=utf-8"),
    (&["js", "mjs"], "application/javascript; charset=utf-8"),
    (&["json"], "application/json; charset=utf-8"),
    (&["txt"], "text/plain; charset=utf-8"),
    (&["svg"], "image/svg+xml"),
    (&["png"], "image/png"),
    (&["jpg", "jpeg"], "image/jpeg"),
    (&["webp"], "image/webp"),
    (&["gif"], "image/gif"),
    (&["ico"], "image/x-icon"),
    (&["woff"], "font/woff"),
    (&["woff2"], "font/woff2"),
];

fn content_type(path: &Path) -> &'static str {
    let ext = match path.extension().and_then(|s| s.to_str()) {
        Some(e) => e.to_ascii_lowercase(),
        None => return DEFAULT_CONTENT_TYPE,
    };
    CONTENT_TYPES
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
        .map(|(_, ct)| *ct)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
