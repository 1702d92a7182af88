//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Admin API",
        version = "0.1.0",
        description = "User administration with email-activated registration (MongoDB)",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/users", api = domain_users::handlers::ApiDoc),
        (path = "/api/auth", api = domain_users::auth_handlers::ApiDoc)
    ),
    tags(
        (name = "Users", description = "User administration (MongoDB)"),
        (name = "Auth", description = "Registration, activation and sign-in")
    )
)]
pub struct ApiDoc;
