use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Admin, AdminError, AdminResult, RANKINGS, RECOMMENDATIONS, require};
use crate::catalog::MangaSummary;
use crate::store::{load_list, save_list};

/// The manga fields a curated list keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedManga {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_file_name: Option<String>,
}

impl From<&MangaSummary> for CuratedManga {
    fn from(summary: &MangaSummary) -> Self {
        Self {
            id: summary.id.clone(),
            title: summary.title.clone(),
            author: summary.author.clone(),
            cover_file_name: summary.cover_file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(flatten)]
    pub manga: CuratedManga,
    pub rank: u32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub manga: CuratedManga,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

fn renumber(entries: &mut [RankingEntry]) {
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
}

fn validated(manga: CuratedManga) -> AdminResult<CuratedManga> {
    Ok(CuratedManga {
        id: require(&manga.id, "manga id")?,
        title: require(&manga.title, "title")?,
        ..manga
    })
}

impl Admin {
    /// Ranking entries sorted by rank.
    pub async fn rankings(&self) -> AdminResult<Vec<RankingEntry>> {
        let mut entries: Vec<RankingEntry> = load_list(self.store.as_ref(), RANKINGS).await?;
        entries.sort_by_key(|e| e.rank);
        Ok(entries)
    }

    pub async fn add_ranking(&self, manga: CuratedManga) -> AdminResult<RankingEntry> {
        let manga = validated(manga)?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.rankings().await?;
        if entries.iter().any(|e| e.manga.id == manga.id) {
            return Err(AdminError::Conflict(format!(
                "{} is already in the ranking",
                manga.title
            )));
        }
        let entry = RankingEntry {
            manga,
            rank: entries.len() as u32 + 1,
            added_at: Utc::now(),
        };
        entries.push(entry.clone());
        save_list(self.store.as_ref(), RANKINGS, &entries).await?;
        tracing::info!(manga_id = %entry.manga.id, rank = entry.rank, "ranking entry added");
        Ok(entry)
    }

    pub async fn remove_ranking(&self, manga_id: &str) -> AdminResult<Vec<RankingEntry>> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.rankings().await?;
        let before = entries.len();
        entries.retain(|e| e.manga.id != manga_id);
        if entries.len() == before {
            return Err(AdminError::NotFound(format!("ranking entry {manga_id}")));
        }
        renumber(&mut entries);
        save_list(self.store.as_ref(), RANKINGS, &entries).await?;
        tracing::info!(manga_id, "ranking entry removed");
        Ok(entries)
    }

    /// Swaps the entry with its neighbour. Moving past either end leaves the
    /// ranking unchanged.
    pub async fn move_ranking(
        &self,
        manga_id: &str,
        direction: MoveDirection,
    ) -> AdminResult<Vec<RankingEntry>> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.rankings().await?;
        let index = entries
            .iter()
            .position(|e| e.manga.id == manga_id)
            .ok_or_else(|| AdminError::NotFound(format!("ranking entry {manga_id}")))?;

        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|i| *i < entries.len()),
        };
        let Some(target) = target else {
            return Ok(entries);
        };

        entries.swap(index, target);
        renumber(&mut entries);
        save_list(self.store.as_ref(), RANKINGS, &entries).await?;
        tracing::info!(manga_id, ?direction, "ranking entry moved");
        Ok(entries)
    }

    pub async fn recommendations(&self) -> AdminResult<Vec<Recommendation>> {
        Ok(load_list(self.store.as_ref(), RECOMMENDATIONS).await?)
    }

    pub async fn add_recommendation(&self, manga: CuratedManga) -> AdminResult<Recommendation> {
        let manga = validated(manga)?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.recommendations().await?;
        if entries.iter().any(|e| e.manga.id == manga.id) {
            return Err(AdminError::Conflict(format!(
                "{} is already recommended",
                manga.title
            )));
        }
        let entry = Recommendation {
            manga,
            added_at: Utc::now(),
        };
        entries.push(entry.clone());
        save_list(self.store.as_ref(), RECOMMENDATIONS, &entries).await?;
        tracing::info!(manga_id = %entry.manga.id, "recommendation added");
        Ok(entry)
    }

    pub async fn remove_recommendation(&self, manga_id: &str) -> AdminResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.recommendations().await?;
        let before = entries.len();
        entries.retain(|e| e.manga.id != manga_id);
        if entries.len() == before {
            return Err(AdminError::NotFound(format!("recommendation {manga_id}")));
        }
        save_list(self.store.as_ref(), RECOMMENDATIONS, &entries).await?;
        tracing::info!(manga_id, "recommendation removed");
        Ok(())
    }
}
