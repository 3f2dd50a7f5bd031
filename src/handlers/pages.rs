use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
    Extension,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

use super::types::ProfileResponse;
use crate::headers::HeaderKind;
use crate::middleware::SharedRequestContext;
use crate::server::state::AppState;

/// Page with an inline script authorized by the request's CSP nonce
pub async fn index(
    State(state): State<AppState>,
    Extension(context): Extension<SharedRequestContext>,
) -> Html<String> {
    let nonce = state.engine.nonce_for_script(&context.lock());
    state.metrics.nonces_issued.fetch_add(1, Ordering::Relaxed);

    Html(format!(
        "<!doctype html>\n<html>\n<head><title>secure-headers</title></head>\n<body>\n\
         <h1>secure-headers</h1>\n\
         <script nonce=\"{nonce}\">document.body.dataset.ready = \"true\";</script>\n\
         </body>\n</html>\n"
    ))
}

/// Page meant to be framed by other sites: drops X-Frame-Options and
/// relies on CSP frame-ancestors instead
pub async fn embed(
    State(state): State<AppState>,
    Extension(context): Extension<SharedRequestContext>,
) -> Result<Html<&'static str>, StatusCode> {
    let mut context = context.lock();

    state
        .engine
        .opt_out_of_header(&mut context, HeaderKind::XFrameOptions)
        .and_then(|_| {
            state.engine.append_header(
                &mut context,
                HeaderKind::Csp,
                &json!({ "frame_ancestors": ["'self'", "https:"] }),
            )
        })
        .map_err(|e| {
            warn!("Failed to adjust headers for embed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Html("<!doctype html>\n<p>embeddable</p>\n"))
}

/// Responds using the named configuration `name`
pub async fn profile_status(
    State(state): State<AppState>,
    Extension(context): Extension<SharedRequestContext>,
    Path(name): Path<String>,
) -> Result<Json<ProfileResponse>, StatusCode> {
    let mut context = context.lock();

    if let Err(e) = state.engine.use_named(&mut context, &name) {
        warn!("Rejected unknown profile '{}': {}", name, e);
        return Err(StatusCode::NOT_FOUND);
    }

    info!("Serving with configuration '{}'", name);
    Ok(Json(ProfileResponse { profile: name }))
}
