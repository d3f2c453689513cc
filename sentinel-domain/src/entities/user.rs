// Operative roster entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{UserRole, UserStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub profile_image_url: Option<String>,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl NewUser {
    pub fn into_user(self, id: String, now: DateTime<Utc>) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            status: self.status,
            profile_image_url: self.profile_image_url,
            last_active: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Create or update payload before validation; on update every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub profile_image_url: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(value) = &self.username {
            user.username = value.clone();
        }
        if let Some(value) = &self.email {
            user.email = value.clone();
        }
        if let Some(value) = &self.first_name {
            user.first_name = Some(value.clone());
        }
        if let Some(value) = &self.last_name {
            user.last_name = Some(value.clone());
        }
        if let Some(value) = self.role {
            user.role = value;
        }
        if let Some(value) = self.status {
            user.status = value;
        }
        if let Some(value) = &self.profile_image_url {
            user.profile_image_url = Some(value.clone());
        }
        user.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub limit: Option<usize>,
}
