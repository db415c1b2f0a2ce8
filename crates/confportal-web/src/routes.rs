//! Portal route handlers.
//!
//! The page itself is always served with content length unknown, which
//! selects the streaming engine; only the short save acknowledgement goes
//! out the direct single-shot path with a known length.

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use confportal_core::{DeliveryStrategy, EngineConfig, PageStream};
use confportal_html::{apply_form, escape_html, PortalPage};

use crate::{body, AppState, PortalState};

/// Create the portal router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_redirect))
        .route("/config", get(config_page).post(config_save))
        .with_state(state)
}

async fn root_redirect() -> Redirect {
    Redirect::temporary("/config")
}

/// `GET /config` — stream the configuration page.
///
/// The page must never be cached: parameter values change between visits.
async fn config_page(State(state): State<AppState>) -> impl IntoResponse {
    let page = build_page(&state).await;
    let mut stream = PageStream::new(engine_config_for_pass(&state), page);
    stream.reset_state();
    tracing::debug!("streaming configuration page");
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=UTF-8"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "-1"),
        ],
        body::page_body(stream),
    )
}

/// `POST /config` — apply the submitted form.
async fn config_save(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    if !pairs.iter().any(|(name, _)| name == "portalSave") {
        return Redirect::to("/config").into_response();
    }

    {
        let mut system = state.system.write().await;
        apply_form(&mut system, &pairs);
    }
    {
        let mut custom = state.custom.write().await;
        apply_form(&mut custom, &pairs);
    }
    tracing::info!(fields = pairs.len(), "configuration saved");

    // Short acknowledgement with a known content length: no streaming
    // engine involved on this path.
    (
        [(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")],
        Html(saved_page(&state.config.title)),
    )
        .into_response()
}

/// Assemble a page definition from the current parameter values.
async fn build_page(state: &PortalState) -> PortalPage {
    let system = state.system.read().await.clone();
    let custom = state.custom.read().await.clone();
    let mut page = PortalPage::new(&state.config.title)
        .with_config_version(&state.config.config_version)
        .with_system_groups(system)
        .with_custom_groups(custom);
    if let Some(path) = &state.config.update_path {
        page = page.with_update_path(path);
    }
    page
}

/// Engine configuration for one render pass. In spill mode every pass gets
/// its own scratch file so concurrent requests never collide on disk.
fn engine_config_for_pass(state: &PortalState) -> EngineConfig {
    let mut engine = state.config.engine.clone();
    if let DeliveryStrategy::Spill { scratch_path } = &mut engine.strategy {
        let id = state.next_render_id();
        let file = match scratch_path.file_name().and_then(|n| n.to_str()) {
            Some(name) => format!("{name}.{id}"),
            None => format!("portal.scratch.{id}"),
        };
        scratch_path.set_file_name(file);
    }
    engine
}

fn saved_page(title: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"/>\
<title>{}</title></head><body><p>Configuration saved.</p>\
<p><a href=\"/config\">Return to the configuration page.</a></p></body></html>",
        escape_html(title)
    )
}
