//! Users Domain
//!
//! User administration and email-activated sign-up on MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (users + auth)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Hashing, activation codes, sign-in mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │ Repository  │ ◄── │    Query    │  ← query string → filter/sort/page
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Documents, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//! use email::MockSmtpProvider;
//!
//! let service = UserService::new(InMemoryUserRepository::new(), Arc::new(MockSmtpProvider::new()));
//! let router = handlers::router(service);
//! ```

pub mod auth;
pub mod auth_handlers;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::AuthOutcome;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CredentialErrorKind, UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    ActivateRequest, CreateUser, LoginRequest, RegisterRequest, UpdateUser, User, UserProfile,
    UserResponse,
};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{ActivationSettings, UserService};
