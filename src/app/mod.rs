//! The HTTP app: JSON API over the catalog, reader, library and admin data,
//! plus the built web assets.

mod admin_routes;
mod routes;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{delete, get, post, put};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::admin::{Admin, AdminError};
use crate::catalog::{Catalog, CatalogError, MangaDexClient};
use crate::cli::ServeArgs;
use crate::config::Config;
use crate::library::Library;
use crate::store::{CollectionStore, LocalFsStore, MemoryStore};

pub(crate) type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub library: Arc<Library>,
    pub admin: Arc<Admin>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, store: Arc<dyn CollectionStore>, config: Config) -> Self {
        let library = Arc::new(Library::new(Arc::clone(&store)));
        let admin = Arc::new(Admin::new(store, Arc::clone(&library)));
        Self {
            catalog,
            library,
            admin,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState, web_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/api", get(routes::index))
        .route("/api/manga", get(routes::list_manga))
        .route("/api/manga/:id", get(routes::manga_detail))
        .route("/api/tags", get(routes::tags))
        .route("/api/read/:chapter_id", get(routes::read_chapter))
        .route("/api/read/:chapter_id/navigate", get(routes::navigate))
        .route("/api/mangadex-proxy/*path", get(routes::proxy))
        .route("/api/rankings", get(admin_routes::list_rankings))
        .route("/api/recommendations", get(admin_routes::list_recommendations))
        .route(
            "/api/library/:user_id",
            get(admin_routes::list_bookmarks).post(admin_routes::add_bookmark),
        )
        .route(
            "/api/library/:user_id/:manga_id",
            delete(admin_routes::remove_bookmark),
        )
        .route("/api/admin/stats", get(admin_routes::stats))
        .route(
            "/api/admin/admins",
            get(admin_routes::list_admins).post(admin_routes::add_admin),
        )
        .route("/api/admin/admins/:id", delete(admin_routes::remove_admin))
        .route(
            "/api/admin/users",
            get(admin_routes::list_users).post(admin_routes::register_user),
        )
        .route("/api/admin/users/:id", delete(admin_routes::delete_user))
        .route("/api/admin/users/:id/toggle", post(admin_routes::toggle_user))
        .route("/api/admin/users/:id/role", put(admin_routes::set_role))
        .route(
            "/api/admin/rankings",
            get(admin_routes::list_rankings).post(admin_routes::add_ranking),
        )
        .route("/api/admin/rankings/:id", delete(admin_routes::remove_ranking))
        .route("/api/admin/rankings/:id/move", post(admin_routes::move_ranking))
        .route(
            "/api/admin/recommendations",
            get(admin_routes::list_recommendations).post(admin_routes::add_recommendation),
        )
        .route(
            "/api/admin/recommendations/:id",
            delete(admin_routes::remove_recommendation),
        )
        .route("/api/admin/bookmarks", get(admin_routes::all_bookmarks));

    let mut app = Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let web_index = web_dir.map(|dir| (dir, dir.join("index.html")));
    match web_index {
        Some((dir, index)) if index.exists() => {
            let static_files = ServeDir::new(dir).not_found_service(ServeFile::new(index));
            app = app.fallback_service(static_files);
        }
        _ => {
            app = app.fallback(|| async {
                Html(
                    r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>mangashelf</title></head>
  <body>
    <h1>mangashelf</h1>
    <p>web assets not found. Build the web app into <code>web/dist</code> or point <code>--web-dir</code> at it.</p>
  </body>
</html>
"#,
                )
            });
        }
    }
    app
}

pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::from_env()?.with_catalog_url(args.catalog_url.as_deref())?;
    tracing::info!(?args, catalog = %config.catalog.base_url, page_size = config.page_size, "starting mangashelf");

    let catalog: Arc<dyn Catalog> = Arc::new(MangaDexClient::new(&config.catalog)?);
    let store: Arc<dyn CollectionStore> = if args.in_memory {
        tracing::info!("using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!(data_dir = %args.data_dir.display(), "using local filesystem store");
        Arc::new(LocalFsStore::new(&args.data_dir))
    };

    let app = router(AppState::new(catalog, store, config), Some(args.web_dir.as_path()));

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}

pub(crate) fn catalog_error(err: CatalogError) -> ApiError {
    (status(err.http_status()), err.to_string())
}

pub(crate) fn admin_error(err: AdminError) -> ApiError {
    if let AdminError::Store(inner) = &err {
        tracing::error!(error = %format!("{inner:#}"), "store failure");
    }
    (status(err.http_status()), format!("{err:#}"))
}

pub(crate) fn internal_error(err: anyhow::Error) -> ApiError {
    tracing::error!(error = %format!("{err:#}"), "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}
