//! HTTP server for the listing and on-demand post pages

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::detail::{DetailFlow, DetailResponse};
use crate::listing::{Listing, MAX_PAGES};
use crate::templates::PageRenderer;
use crate::Blog;

/// Server state
struct ServerState {
    blog: Blog,
    detail: Arc<DetailFlow>,
    pages: PageRenderer,
}

#[derive(Debug, Deserialize)]
struct ListingQuery {
    pages: Option<usize>,
}

/// Build the router serving `blog`
pub fn router(blog: &Blog, detail: Arc<DetailFlow>) -> Result<Router> {
    let state = Arc::new(ServerState {
        blog: blog.clone(),
        detail,
        pages: blog.page_renderer()?,
    });

    Ok(Router::new()
        .route("/", get(listing_handler))
        .route("/post/:slug", get(post_handler))
        .fallback_service(ServeDir::new(&blog.public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn start(blog: &Blog, detail: Arc<DetailFlow>, ip: &str, port: u16) -> Result<()> {
    let app = router(blog, detail)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Listing page; `/?pages=N` shows the first N pages
async fn listing_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let pages = query.pages.unwrap_or(1).clamp(1, MAX_PAGES);

    if pages == 1 {
        let index = state.blog.public_dir.join("index.html");
        if let Ok(html) = tokio::fs::read_to_string(&index).await {
            return Html(html).into_response();
        }
    }

    let listing = Listing::load_pages(
        state.blog.source.as_ref(),
        &state.blog.listing_options(),
        &state.blog.dates,
        pages,
    )
    .await;

    match listing {
        Ok(listing) => page(StatusCode::OK, state.pages.render_listing(&listing)),
        Err(e) => {
            tracing::error!("Failed to load listing: {}", e);
            page(StatusCode::BAD_GATEWAY, state.pages.render_fetch_failed())
        }
    }
}

/// Post page, generated on first request when not pre-rendered
async fn post_handler(State(state): State<Arc<ServerState>>, Path(slug): Path<String>) -> Response {
    match state.detail.request(&slug).await {
        Ok(DetailResponse::Fresh(detail)) | Ok(DetailResponse::Stale(detail)) => {
            page(StatusCode::OK, state.pages.render_post(&detail))
        }
        Ok(DetailResponse::Loading) => page(StatusCode::OK, state.pages.render_loading()),
        Ok(DetailResponse::NotFound) => {
            page(StatusCode::NOT_FOUND, state.pages.render_not_found())
        }
        Err(e) => {
            tracing::error!("Failed to generate post {}: {}", slug, e);
            page(StatusCode::BAD_GATEWAY, state.pages.render_fetch_failed())
        }
    }
}

fn page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
