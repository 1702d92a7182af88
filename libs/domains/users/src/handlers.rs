use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::UserResult;
use crate::models::{
    CreateUser, CreatedResponse, DeleteAck, UpdateAck, UpdateUser, UserPage, UserResponse,
};
use crate::pagination::PageMeta;
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, remove_user),
    components(
        schemas(
            UserResponse,
            UserPage,
            PageMeta,
            CreateUser,
            UpdateUser,
            CreatedResponse,
            UpdateAck,
            DeleteAck
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User administration (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Listing controls; any other query parameter is a field filter
/// (`name=/ann/i`, `createdAt>=2024-01-01`, `!phone`, ...)
#[derive(Debug, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct ListUsersQuery {
    /// 1-based page number (default 1)
    current: Option<u64>,
    /// Page size (default 10)
    #[param(rename = "pageSize")]
    page_size: Option<u64>,
    /// Comma-separated fields, `-` prefix for descending
    #[param(example = "-createdAt,name")]
    sort: Option<String>,
}

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            get(list_users).post(create_user).patch(update_user),
        )
        .route("/{id}", get(get_user).delete(remove_user))
        .with_state(shared_service)
}

/// List users with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    RawQuery(query): RawQuery,
) -> UserResult<Json<UserPage>> {
    let page = service.list_users(query.as_deref().unwrap_or_default()).await?;
    Ok(Json(page))
}

/// Create an active user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = CreatedResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let created = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ObjectId (24 hex characters)")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = service.get_user(&id).await?;
    Ok(Json(user))
}

/// Update the user named by `_id` in the body
#[utoipa::path(
    patch,
    path = "",
    tag = "Users",
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Update acknowledged", body = UpdateAck),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UpdateAck>> {
    let ack = service.update_user(input).await?;
    Ok(Json(ack))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ObjectId (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Delete acknowledged", body = DeleteAck),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
) -> UserResult<Json<DeleteAck>> {
    let ack = service.remove_user(&id).await?;
    Ok(Json(ack))
}
