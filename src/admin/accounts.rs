use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ADMINS, Admin, AdminError, AdminResult, normalize_email, require};
use crate::store::{load_list, save_list};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
}

impl Admin {
    pub async fn admins(&self) -> AdminResult<Vec<AdminAccount>> {
        Ok(load_list(self.store.as_ref(), ADMINS).await?)
    }

    pub async fn add_admin(&self, new: NewAdmin) -> AdminResult<AdminAccount> {
        let name = require(&new.name, "name")?;
        let email = normalize_email(&new.email)?;

        let _guard = self.write_lock.lock().await;
        let mut admins: Vec<AdminAccount> = load_list(self.store.as_ref(), ADMINS).await?;
        if admins.iter().any(|a| a.email == email) {
            return Err(AdminError::Conflict(format!(
                "an admin with email {email} already exists"
            )));
        }

        let account = AdminAccount {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            created_at: Utc::now(),
        };
        admins.push(account.clone());
        save_list(self.store.as_ref(), ADMINS, &admins).await?;
        tracing::info!(admin_id = %account.id, email = %account.email, "admin added");
        Ok(account)
    }

    pub async fn remove_admin(&self, admin_id: &str) -> AdminResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut admins: Vec<AdminAccount> = load_list(self.store.as_ref(), ADMINS).await?;
        let before = admins.len();
        admins.retain(|a| a.id != admin_id);
        if admins.len() == before {
            return Err(AdminError::NotFound(format!("admin {admin_id}")));
        }
        save_list(self.store.as_ref(), ADMINS, &admins).await?;
        tracing::info!(admin_id, "admin removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::admin::{AdminError, NewAdmin, test_admin};

    fn new_admin(email: &str) -> NewAdmin {
        NewAdmin {
            name: "Ops".to_owned(),
            email: email.to_owned(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> anyhow::Result<()> {
        let (admin, _) = test_admin();
        let first = admin.add_admin(new_admin("ops@example.com")).await?;
        assert_eq!(first.email, "ops@example.com");

        let err = admin
            .add_admin(new_admin("OPS@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Conflict(_)));
        assert_eq!(admin.admins().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn remove_unknown_admin_is_not_found() -> anyhow::Result<()> {
        let (admin, _) = test_admin();
        let account = admin.add_admin(new_admin("ops@example.com")).await?;
        assert!(matches!(
            admin.remove_admin("missing").await,
            Err(AdminError::NotFound(_))
        ));
        admin.remove_admin(&account.id).await?;
        assert!(admin.admins().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn name_is_required() {
        let (admin, _) = test_admin();
        let err = admin
            .add_admin(NewAdmin {
                name: " ".to_owned(),
                email: "ops@example.com".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }
}
