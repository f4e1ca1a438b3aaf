//! Development server
//!
//! Serves the public directory. Posts that were not generated yet are fetched
//! and rendered on first request, then kept on disk like any other page.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{ContentSource, FetchError};
use crate::generator::Generator;
use crate::helpers::{post_path, uid_from_post_path};
use crate::Blog;

/// Server state
pub struct ServerState {
    public_dir: PathBuf,
    generator: Generator,
}

impl ServerState {
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            public_dir: blog.public_dir.clone(),
            generator: Generator::new(blog, source)?,
        })
    }
}

/// Build the router serving the site
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(blog, blog.content_source()?)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve files, rendering missing post pages on demand
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    if let Some(uid) = uid_from_post_path(request.uri().path()) {
        let generated = state.public_dir.join(post_path(&uid)).join("index.html");
        if !generated.exists() {
            return render_on_demand(&state, &uid).await;
        }
    }

    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state).await,
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve file: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

async fn render_on_demand(state: &ServerState, uid: &str) -> Response {
    tracing::info!("Rendering post {:?} on demand", uid);
    match state.generator.build_post_page(uid).await {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => not_found(state).await,
        Err(e) => {
            tracing::error!("Failed to render post {:?}: {:#}", uid, e);
            let transient = e
                .downcast_ref::<FetchError>()
                .is_some_and(FetchError::is_transient);
            let status = if transient {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, "Failed to fetch post").into_response()
        }
    }
}

/// The generated 404 page, rendered fresh when it is not on disk
async fn not_found(state: &ServerState) -> Response {
    let body = match tokio::fs::read_to_string(state.public_dir.join("404.html")).await {
        Ok(body) => body,
        Err(_) => match state.generator.render_not_found() {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to render not-found page: {}", e);
                "Not found".to_string()
            }
        },
    };
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{detail, StaticSource};
    use crate::config::SiteConfig;
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn app(dir: &std::path::Path) -> (Blog, Router) {
        let blog = Blog::with_config(dir, SiteConfig::default());
        let source = StaticSource::default()
            .with_post(detail("hooks", "um dois três"))
            .with_post(detail("café", "texto"))
            .with_failing_post("flaky");
        let state = ServerState::new(&blog, Arc::new(source)).unwrap();
        (blog, router(Arc::new(state)))
    }

    #[tokio::test]
    async fn test_post_rendered_on_demand_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, app) = app(dir.path());

        let (status, body) = get(app, "/post/hooks").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Post hooks"));
        assert!(blog.public_dir.join("post/hooks/index.html").exists());
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (_, app) = app(dir.path());

        let (status, body) = get(app, "/post/missing/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Post não encontrado"));
    }

    #[tokio::test]
    async fn test_encoded_uid_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, app) = app(dir.path());

        let (status, body) = get(app, "/post/caf%C3%A9/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Post café"));
        assert!(blog.public_dir.join("post/café/index.html").exists());
    }

    #[tokio::test]
    async fn test_unavailable_cms_is_service_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let (_, app) = app(dir.path());

        let (status, _) = get(app, "/post/flaky").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_static_files_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, app) = app(dir.path());
        std::fs::create_dir_all(&blog.public_dir).unwrap();
        std::fs::write(blog.public_dir.join("index.html"), "<h1>home</h1>").unwrap();

        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>home</h1>");

        let (status, _) = get(app, "/nothing-here.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
