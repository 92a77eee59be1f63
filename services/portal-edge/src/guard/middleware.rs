//! Axum middleware applying [`AccessGuard`] decisions.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use chrono::Utc;

use crate::guard::decision::{GuardAction, GuardOutcome};
use crate::server::AppState;

/// Runs before routing: either passes the request on or answers with a
/// redirect, clearing the credential cookie when the decision says so.
pub async fn access_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let guard = &state.guard;
    let path = request.uri().path().to_owned();
    let credential = jar.get(guard.cookie_name()).map(|c| c.value());

    let outcome = guard.evaluate(&path, credential, Utc::now().timestamp());
    state.metrics.record_decision(outcome.reason.as_str());

    tracing::debug!(
        path = %path,
        reason = outcome.reason.as_str(),
        location = outcome.location().unwrap_or("-"),
        clear_credential = outcome.clear_credential,
        "Guard decision"
    );

    let GuardOutcome {
        action,
        clear_credential,
        ..
    } = outcome;

    match action {
        GuardAction::Continue => next.run(request).await,
        GuardAction::Redirect(location) => {
            let redirect = Redirect::temporary(&location);
            if clear_credential {
                let jar = jar.remove(Cookie::build((guard.cookie_name().to_owned(), "")).path("/"));
                (jar, redirect).into_response()
            } else {
                redirect.into_response()
            }
        }
    }
}
