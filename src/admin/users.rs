use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Admin, AdminError, AdminResult, USERS, normalize_email, require};
use crate::store::{load_list, save_list};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl FromStr for Role {
    type Err = AdminError;

    fn from_str(raw: &str) -> AdminResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(AdminError::Invalid(format!("unsupported role: {other}"))),
        }
    }
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl Admin {
    pub async fn users(&self) -> AdminResult<Vec<User>> {
        Ok(load_list(self.store.as_ref(), USERS).await?)
    }

    pub async fn user(&self, user_id: &str) -> AdminResult<User> {
        self.users()
            .await?
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AdminError::NotFound(format!("user {user_id}")))
    }

    pub async fn register_user(&self, new: NewUser) -> AdminResult<User> {
        let name = require(&new.name, "name")?;
        let email = normalize_email(&new.email)?;

        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = load_list(self.store.as_ref(), USERS).await?;
        if users.iter().any(|u| u.email == email) {
            return Err(AdminError::Conflict(format!(
                "a user with email {email} already exists"
            )));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            role: new.role.unwrap_or_default(),
            is_active: true,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        save_list(self.store.as_ref(), USERS, &users).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Deletes the user together with their bookmarks.
    pub async fn delete_user(&self, user_id: &str) -> AdminResult<()> {
        {
            let _guard = self.write_lock.lock().await;
            let mut users: Vec<User> = load_list(self.store.as_ref(), USERS).await?;
            let before = users.len();
            users.retain(|u| u.id != user_id);
            if users.len() == before {
                return Err(AdminError::NotFound(format!("user {user_id}")));
            }
            save_list(self.store.as_ref(), USERS, &users).await?;
        }
        self.library.clear(user_id).await?;
        tracing::info!(user_id, "user deleted");
        Ok(())
    }

    pub async fn toggle_user_active(&self, user_id: &str) -> AdminResult<User> {
        self.update_user(user_id, |user| user.is_active = !user.is_active)
            .await
    }

    pub async fn set_user_role(&self, user_id: &str, role: Role) -> AdminResult<User> {
        self.update_user(user_id, |user| user.role = role).await
    }

    async fn update_user(&self, user_id: &str, apply: impl FnOnce(&mut User)) -> AdminResult<User> {
        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = load_list(self.store.as_ref(), USERS).await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AdminError::NotFound(format!("user {user_id}")))?;
        apply(user);
        let updated = user.clone();
        save_list(self.store.as_ref(), USERS, &users).await?;
        tracing::info!(
            user_id,
            role = ?updated.role,
            is_active = updated.is_active,
            "user updated"
        );
        Ok(updated)
    }
}
