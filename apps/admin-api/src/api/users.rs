//! Users domain wiring

use domain_users::{MongoUserRepository, UserService};
use std::sync::Arc;

use crate::state::AppState;

/// One service shared by the users and auth routers
pub fn service(state: &AppState) -> UserService<MongoUserRepository> {
    let repository = MongoUserRepository::new(&state.db);

    UserService::new(repository, Arc::clone(&state.mailer))
        .with_activation_settings(state.config.activation.settings())
}
