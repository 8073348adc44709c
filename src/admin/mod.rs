//! Back-office data: admin accounts, users, curated lists and overview stats.

mod accounts;
mod curated;
mod stats;
mod users;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::library::Library;
use crate::store::CollectionStore;

pub use accounts::{AdminAccount, NewAdmin};
pub use curated::{CuratedManga, MoveDirection, RankingEntry, Recommendation};
pub use stats::{BookmarkRow, Stats};
pub use users::{NewUser, Role, User};

const ADMINS: &str = "admins";
const USERS: &str = "users";
const RANKINGS: &str = "rankingList";
const RECOMMENDATIONS: &str = "recommendationList";

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AdminError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Invalid(_) => 400,
            Self::Conflict(_) => 409,
            Self::NotFound(_) => 404,
            Self::Store(_) => 500,
        }
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Repository over the admin collections. Mutations are serialized by one
/// lock so read-modify-write cycles do not interleave.
pub struct Admin {
    store: Arc<dyn CollectionStore>,
    library: Arc<Library>,
    write_lock: Mutex<()>,
}

impl Admin {
    pub fn new(store: Arc<dyn CollectionStore>, library: Arc<Library>) -> Self {
        Self {
            store,
            library,
            write_lock: Mutex::new(()),
        }
    }
}

fn normalize_email(raw: &str) -> AdminResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AdminError::Invalid(format!("invalid email: {raw:?}"))),
    }
}

fn require(value: &str, what: &str) -> AdminResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::Invalid(format!("{what} is required")));
    }
    Ok(value.to_owned())
}

#[cfg(test)]
pub(crate) fn test_admin() -> (Admin, Arc<Library>) {
    let store: Arc<dyn CollectionStore> = Arc::new(crate::store::MemoryStore::new());
    let library = Arc::new(Library::new(store.clone()));
    (Admin::new(store, library.clone()), library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email(" A@Example.com ").unwrap(), "a@example.com");
        assert!(matches!(normalize_email("nope"), Err(AdminError::Invalid(_))));
        assert!(normalize_email("@x").is_err());
    }

    #[test]
    fn error_statuses() {
        assert_eq!(AdminError::Conflict("x".into()).http_status(), 409);
        assert_eq!(AdminError::NotFound("user".into()).to_string(), "user not found");
        assert_eq!(AdminError::Store(anyhow::anyhow!("disk")).http_status(), 500);
    }
}
