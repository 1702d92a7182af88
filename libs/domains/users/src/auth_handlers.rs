use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ConflictResponse, GoneResponse,
        InternalServerErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::AuthOutcome;
use crate::error::UserResult;
use crate::models::{
    ActivateRequest, ActivationResponse, CreatedResponse, LoginRequest, RegisterRequest,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the sign-up and sign-in endpoints
#[derive(OpenApi)]
#[openapi(
    paths(register, activate, login),
    components(
        schemas(
            RegisterRequest,
            ActivateRequest,
            LoginRequest,
            CreatedResponse,
            ActivationResponse,
            AuthOutcome
        ),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            GoneResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, activation and sign-in")
    )
)]
pub struct ApiDoc;

pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/register", post(register))
        .route("/activate", post(activate))
        .route("/login", post(login))
        .with_state(shared_service)
}

/// Register an inactive account and mail its activation code
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, activation mail dispatched", body = CreatedResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let created = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Activate an account with the mailed code
#[utoipa::path(
    post,
    path = "/activate",
    tag = "Auth",
    request_body = ActivateRequest,
    responses(
        (status = 200, description = "Account activated", body = ActivationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 410, response = GoneResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn activate<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<ActivateRequest>,
) -> UserResult<Json<ActivationResponse>> {
    let response = service.activate(input).await?;
    Ok(Json(response))
}

/// Check credentials
///
/// Always answers 200; failures come back as `{ "error": "..." }`.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "`{ user }` on success, `{ error }` otherwise", body = AuthOutcome),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Json<AuthOutcome> {
    Json(service.authenticate(&input.username, &input.password).await)
}
