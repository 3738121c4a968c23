use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use model_admin::infra::auth::UserDirectory;
use modkit::{Problem, ProblemResponse};

/// Header naming the acting user. Authentication proper happens upstream.
pub const USER_HEADER: &str = "x-user";

/// Resolves `x-user` against the directory and stores the user in request
/// extensions. A request without the header passes through anonymous; an
/// unknown name is rejected here.
pub async fn resolve_user(
    State(users): State<Arc<UserDirectory>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let name = req
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    if let Some(name) = name {
        let Some(user) = users.get(&name).cloned() else {
            tracing::warn!(user = %name, "unknown user");
            let problem = Problem::new(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                format!("unknown user '{name}'"),
            )
            .with_instance(req.uri().path());
            return ProblemResponse(problem).into_response();
        };
        tracing::Span::current().record("user", tracing::field::display(&user.username));
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
