use std::collections::HashMap;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use dukafeed_core::Category;
use dukafeed_feed::{build_feed, resolve_assignments, xml::error_document, FeedConfig};
use sqlx::PgPool;

use crate::middleware::RequestId;

use super::AppState;

const FEED_CACHE_CONTROL: &str = "public, max-age=3600, stale-while-revalidate=86400";

/// `GET /feed.xml` — serve the merchant feed, from cache when fresh.
///
/// Rate limiting has already run by the time this handler is reached, so a
/// limited request never triggers a catalog read.
pub(super) async fn serve_feed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    if let Some(body) = state.cache.get_fresh().await {
        tracing::debug!(request_id = %req_id.0, "serving cached feed");
        return xml_response(StatusCode::OK, body);
    }

    let products = match dukafeed_db::list_feed_products(&state.pool).await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "product read failed");
            return xml_response(StatusCode::INTERNAL_SERVER_ERROR, error_document());
        }
    };

    let assignments = load_assignments(&state.pool, &products, &req_id.0).await;
    let feed_config = FeedConfig::from_app_config(&state.config);

    match build_feed(&products, &assignments, &feed_config) {
        Ok(body) => {
            tracing::info!(
                request_id = %req_id.0,
                products = products.len(),
                bytes = body.len(),
                "feed regenerated"
            );
            state.cache.store(body.clone()).await;
            xml_response(StatusCode::OK, body)
        }
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "feed generation failed");
            xml_response(StatusCode::INTERNAL_SERVER_ERROR, error_document())
        }
    }
}

/// Category resolution is non-fatal: a failed read degrades to a feed with
/// no category fields rather than a 500.
async fn load_assignments(
    pool: &PgPool,
    products: &[dukafeed_core::FeedProduct],
    request_id: &str,
) -> HashMap<String, Vec<Category>> {
    let categories = match dukafeed_db::list_categories(pool).await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!(request_id, error = %e, "category read failed, feed will omit categories");
            return HashMap::new();
        }
    };
    let links = match dukafeed_db::list_category_links(pool).await {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!(request_id, error = %e, "category link read failed, feed will omit categories");
            return HashMap::new();
        }
    };

    resolve_assignments(products, &categories, &links)
}

fn xml_response(status: StatusCode, body: String) -> Response {
    let mut response = (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response();
    if status == StatusCode::OK {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static(FEED_CACHE_CONTROL),
        );
    }
    response
}
