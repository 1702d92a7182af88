use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::pagination::PageMeta;

pub(crate) fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

pub(crate) fn to_chrono(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

/// User document as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    /// Outstanding activation code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_id: Option<String>,
    /// Activation deadline for `code_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_expired: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl User {
    /// New active user, as created by an administrator
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        let now = to_bson_datetime(now);
        Self {
            id: ObjectId::new(),
            name,
            email,
            password: password_hash,
            phone: None,
            address: None,
            image: None,
            is_active: true,
            code_id: None,
            code_expired: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// New inactive user waiting for `code` before `expires_at`
    pub fn pending(
        name: String,
        email: String,
        password_hash: String,
        code: String,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            is_active: false,
            code_id: Some(code),
            code_expired: Some(to_bson_datetime(expires_at)),
            ..Self::new(name, email, password_hash, now)
        }
    }
}

/// Stored user without the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub code_id: Option<String>,
    #[serde(default)]
    pub code_expired: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            image: user.image,
            is_active: user.is_active,
            code_id: user.code_id,
            code_expired: user.code_expired,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    #[schema(example = "65a1b2c3d4e5f60718293a4b")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub code_id: Option<String>,
    pub code_expired: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id.to_hex(),
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            address: profile.address,
            image: profile.image,
            is_active: profile.is_active,
            code_id: profile.code_id,
            code_expired: profile.code_expired.map(to_chrono),
            created_at: to_chrono(profile.created_at),
            updated_at: to_chrono(profile.updated_at),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserProfile::from(user).into()
    }
}

/// Administrator-created user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

/// Self-service sign-up
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ActivateRequest {
    #[serde(rename = "_id")]
    #[validate(length(min = 1, message = "_id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
}

/// Credentials; `username` is the account email
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[serde(rename = "_id")]
    #[validate(length(min = 1, message = "_id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

/// Fields an update may replace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

impl UserPatch {
    /// `$set` body; always bumps `updatedAt`
    pub fn to_set_document(&self, now: DateTime<Utc>) -> Document {
        let mut set = doc! { "updatedAt": to_bson_datetime(now) };
        let fields = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("image", &self.image),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                set.insert(key, value.clone());
            }
        }
        set
    }

    /// Apply to an in-memory user; returns whether any field changed
    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        if let Some(name) = &self.name {
            changed |= user.name != *name;
            user.name = name.clone();
        }
        for (slot, value) in [
            (&mut user.phone, &self.phone),
            (&mut user.address, &self.address),
            (&mut user.image, &self.image),
        ] {
            if let Some(value) = value {
                changed |= slot.as_deref() != Some(value.as_str());
                *slot = Some(value.clone());
            }
        }
        user.updated_at = to_bson_datetime(now);
        changed
    }
}

impl From<UpdateUser> for UserPatch {
    fn from(input: UpdateUser) -> Self {
        Self {
            name: input.name,
            phone: input.phone,
            address: input.address,
            image: input.image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    #[serde(rename = "_id")]
    #[schema(example = "65a1b2c3d4e5f60718293a4b")]
    pub id: String,
}

/// Store acknowledgement for an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Store acknowledgement for a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub result: Vec<UserResponse>,
    pub total_pages: u64,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivationResponse {
    pub activated: bool,
}
