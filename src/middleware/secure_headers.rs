use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::{Mutex, MutexGuard};
use tracing::error;

use crate::request::RequestContext;
use crate::resolver::ResolvedHeaderSet;
use crate::server::state::AppState;
use crate::utils::{extract_user_agent, is_secure_request};

/// Request context shared between the middleware and the handler, exposed
/// to handlers as a request extension.
#[derive(Clone, Debug)]
pub struct SharedRequestContext(Arc<Mutex<RequestContext>>);

impl SharedRequestContext {
    pub fn new(context: RequestContext) -> Self {
        Self(Arc::new(Mutex::new(context)))
    }

    pub fn lock(&self) -> MutexGuard<'_, RequestContext> {
        self.0.lock()
    }
}

/// Middleware to add the resolved security headers to all responses
pub async fn secure_headers_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let secure = is_secure_request(request.headers(), &state.config.server);
    let user_agent = extract_user_agent(request.headers());
    let context = SharedRequestContext::new(RequestContext::new(secure, user_agent));
    request.extensions_mut().insert(context.clone());

    let mut response = next.run(request).await;

    let resolved = state
        .engine
        .resolve_headers(&context.lock())
        .map_err(|e| e.to_string())
        .and_then(to_header_pairs);
    let pairs = match resolved {
        Ok(pairs) => pairs,
        Err(e) => {
            // Never serve a response without its security headers
            error!("Failed to resolve security headers: {}", e);
            state.metrics.resolution_errors.fetch_add(1, Ordering::Relaxed);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    state.metrics.responses.fetch_add(1, Ordering::Relaxed);

    let headers = response.headers_mut();
    for (name, value) in pairs {
        headers.insert(name, value);
    }

    // Remove server information
    headers.remove(header::SERVER);

    response
}

fn to_header_pairs(resolved: ResolvedHeaderSet) -> Result<Vec<(HeaderName, HeaderValue)>, String> {
    resolved
        .into_iter()
        .map(|(name, value)| -> Result<(HeaderName, HeaderValue), String> {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| format!("invalid header name {name:?}"))?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| format!("invalid value for {name}: {value:?}"))?;
            Ok((header_name, header_value))
        })
        .collect()
}
