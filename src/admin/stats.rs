use serde::Serialize;

use super::{Admin, AdminResult};
use crate::catalog::{Catalog, MangaQuery};
use crate::library::Bookmark;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub users: usize,
    pub admins: usize,
    pub bookmarks: usize,
    pub manga: u64,
}

/// One bookmark with the owning user's details, for the admin overview.
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkRow {
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    #[serde(flatten)]
    pub bookmark: Bookmark,
}

impl Admin {
    /// Counts from the store plus the catalog's manga total (0 when the
    /// catalog cannot be reached).
    pub async fn stats(&self, catalog: &dyn Catalog) -> AdminResult<Stats> {
        let users = self.users().await?.len();
        let admins = self.admins().await?.len();
        let bookmarks = self
            .library
            .all()
            .await?
            .iter()
            .map(|(_, list)| list.len())
            .sum();

        let manga = match catalog.manga_list(&MangaQuery::page(1, 1)).await {
            Ok(list) => list.total,
            Err(err) => {
                tracing::warn!(error = %err, "manga total unavailable");
                0
            }
        };

        Ok(Stats {
            users,
            admins,
            bookmarks,
            manga,
        })
    }

    /// Every user's bookmarks, newest first. Bookmarks of users that are no
    /// longer registered are still listed, without name or email.
    pub async fn all_bookmarks(&self) -> AdminResult<Vec<BookmarkRow>> {
        let users = self.users().await?;
        let mut rows = Vec::new();
        for (user_id, bookmarks) in self.library.all().await? {
            let user = users.iter().find(|u| u.id == user_id);
            rows.extend(bookmarks.into_iter().map(|bookmark| BookmarkRow {
                user_id: user_id.clone(),
                user_name: user.map(|u| u.name.clone()),
                user_email: user.map(|u| u.email.clone()),
                bookmark,
            }));
        }
        rows.sort_by(|a, b| b.bookmark.added_at.cmp(&a.bookmark.added_at));
        Ok(rows)
    }
}
