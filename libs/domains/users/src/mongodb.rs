//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;

use crate::error::UserResult;
use crate::models::{DeleteAck, UpdateAck, User, UserPatch, UserProfile, to_bson_datetime};
use crate::query::{Filter, SortSpec};
use crate::repository::UserRepository;

pub const USERS_COLLECTION: &str = "users";

/// Projection for every read decoded as [`UserProfile`]
fn profile_projection() -> Document {
    doc! { "password": 0 }
}

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<User>,
    profiles: Collection<UserProfile>,
}

impl MongoUserRepository {
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(&client.database("admin_api"));
    /// ```
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, USERS_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<User>(collection_name);
        let profiles = collection.clone_with_type::<UserProfile>();
        Self {
            collection,
            profiles,
        }
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Lookup indexes on `email` and `createdAt`.
    ///
    /// The email index is not unique; uniqueness is checked before insert.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().name("email_1".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "createdAt": -1 })
                .options(
                    IndexOptions::builder()
                        .name("createdAt_-1".to_string())
                        .build(),
                )
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;

        tracing::info!(collection = %self.collection.name(), "User indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        // count only; the match is never decoded
        let matching = self
            .collection
            .count_documents(doc! { "email": email })
            .limit(1)
            .await?;
        Ok(matching > 0)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &Filter) -> UserResult<u64> {
        let count = self
            .collection
            .count_documents(filter.to_document())
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: i64,
    ) -> UserResult<Vec<UserProfile>> {
        let options = FindOptions::builder()
            .skip(skip)
            .limit(limit)
            .sort((!sort.is_empty()).then(|| sort.to_document()))
            .projection(profile_projection())
            .build();

        let cursor = self
            .profiles
            .find(filter.to_document())
            .with_options(options)
            .await?;
        let users: Vec<UserProfile> = cursor.try_collect().await?;

        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_profile(&self, id: ObjectId) -> UserResult<Option<UserProfile>> {
        let user = self
            .profiles
            .find_one(doc! { "_id": id })
            .projection(profile_projection())
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert(&self, user: User) -> UserResult<ObjectId> {
        self.collection.insert_one(&user).await?;

        tracing::info!(user_id = %user.id, "User inserted");
        Ok(user.id)
    }

    #[instrument(skip(self, patch))]
    async fn update_one(
        &self,
        id: ObjectId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> UserResult<UpdateAck> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": patch.to_set_document(now) })
            .await?;

        tracing::info!(
            user_id = %id,
            matched = result.matched_count,
            modified = result.modified_count,
            "User updated"
        );
        Ok(UpdateAck {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    #[instrument(skip(self))]
    async fn delete_one(&self, id: ObjectId) -> UserResult<DeleteAck> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        tracing::info!(user_id = %id, deleted = result.deleted_count, "User delete issued");
        Ok(DeleteAck {
            deleted_count: result.deleted_count,
        })
    }

    #[instrument(skip(self, code))]
    async fn find_by_id_and_code(&self, id: ObjectId, code: &str) -> UserResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "_id": id, "codeId": code })
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn mark_active(&self, id: ObjectId, now: DateTime<Utc>) -> UserResult<UpdateAck> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "isActive": true, "updatedAt": to_bson_datetime(now) } },
            )
            .await?;

        Ok(UpdateAck {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }
}
