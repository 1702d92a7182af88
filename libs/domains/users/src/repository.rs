use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::UserResult;
use crate::models::{DeleteAck, UpdateAck, User, UserPatch, UserProfile, to_bson_datetime};
use crate::query::{Filter, SortSpec};

/// Repository trait for User persistence
///
/// Reads that return [`UserProfile`] never carry the password hash.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Check if an email is already registered (exact match)
    async fn exists_by_email(&self, email: &str) -> UserResult<bool>;

    /// Count users matching a filter
    async fn count(&self, filter: &Filter) -> UserResult<u64>;

    /// One sorted page of users matching a filter
    async fn find_page(
        &self,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: i64,
    ) -> UserResult<Vec<UserProfile>>;

    async fn find_profile(&self, id: ObjectId) -> UserResult<Option<UserProfile>>;

    /// Full record including the password hash, for credential checks
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn insert(&self, user: User) -> UserResult<ObjectId>;

    /// `$set` the patch on the user with this id
    async fn update_one(
        &self,
        id: ObjectId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> UserResult<UpdateAck>;

    async fn delete_one(&self, id: ObjectId) -> UserResult<DeleteAck>;

    /// Lookup on `_id` and `codeId` together
    async fn find_by_id_and_code(&self, id: ObjectId, code: &str) -> UserResult<Option<User>>;

    /// Flip `isActive` to true; code fields are left as they are
    async fn mark_active(&self, id: ObjectId, now: DateTime<Utc>) -> UserResult<UpdateAck>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Filters and sorts are evaluated against the BSON form of each user, so
/// results match what MongoDB returns for the same query.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(users: &[User], filter: &Filter) -> UserResult<Vec<(bson::Document, User)>> {
        let mut out = Vec::new();
        for user in users {
            let doc = bson::to_document(user)?;
            if filter.matches(&doc) {
                out.push((doc, user.clone()));
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn count(&self, filter: &Filter) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(Self::matching(&users, filter)?.len() as u64)
    }

    async fn find_page(
        &self,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: i64,
    ) -> UserResult<Vec<UserProfile>> {
        let users = self.users.read().await;
        let mut matched = Self::matching(&users, filter)?;

        // stable, so ties keep insertion order
        matched.sort_by(|(a, _), (b, _)| sort.compare(a, b));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|(_, user)| user.into())
            .collect())
    }

    async fn find_profile(&self, id: ObjectId) -> UserResult<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned().map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: User) -> UserResult<ObjectId> {
        let mut users = self.users.write().await;
        let id = user.id;
        users.push(user);

        tracing::info!(user_id = %id, "Inserted user");
        Ok(id)
    }

    async fn update_one(
        &self,
        id: ObjectId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> UserResult<UpdateAck> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(UpdateAck {
                matched_count: 0,
                modified_count: 0,
            });
        };

        patch.apply(user, now);
        // updatedAt always moves, so a matched document is always modified
        Ok(UpdateAck {
            matched_count: 1,
            modified_count: 1,
        })
    }

    async fn delete_one(&self, id: ObjectId) -> UserResult<DeleteAck> {
        let mut users = self.users.write().await;
        let before = users.len();
        if let Some(pos) = users.iter().position(|u| u.id == id) {
            users.remove(pos);
        }
        Ok(DeleteAck {
            deleted_count: (before - users.len()) as u64,
        })
    }

    async fn find_by_id_and_code(&self, id: ObjectId, code: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.id == id && u.code_id.as_deref() == Some(code))
            .cloned())
    }

    async fn mark_active(&self, id: ObjectId, now: DateTime<Utc>) -> UserResult<UpdateAck> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(UpdateAck {
                matched_count: 0,
                modified_count: 0,
            });
        };

        user.is_active = true;
        user.updated_at = to_bson_datetime(now);
        Ok(UpdateAck {
            matched_count: 1,
            modified_count: 1,
        })
    }
}
