use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, admin_error, internal_error};
use crate::admin::{
    AdminAccount, BookmarkRow, CuratedManga, MoveDirection, NewAdmin, NewUser, RankingEntry,
    Recommendation, Role, Stats, User,
};
use crate::library::{Bookmark, NewBookmark, collection_name};

fn check_user_id(user_id: &str) -> Result<(), ApiError> {
    collection_name(user_id)
        .map(|_| ())
        .map_err(|err| (StatusCode::BAD_REQUEST, format!("{err:#}")))
}

pub(super) async fn list_bookmarks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    check_user_id(&user_id)?;
    let bookmarks = state.library.list(&user_id).await.map_err(internal_error)?;
    Ok(Json(bookmarks))
}

#[derive(Debug, Serialize)]
pub(super) struct AddBookmarkResponse {
    added: bool,
    bookmarks: Vec<Bookmark>,
}

pub(super) async fn add_bookmark(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(new): Json<NewBookmark>,
) -> Result<(StatusCode, Json<AddBookmarkResponse>), ApiError> {
    check_user_id(&user_id)?;
    if new.manga_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "manga id is required".to_owned()));
    }
    let added = state
        .library
        .add(&user_id, new)
        .await
        .map_err(internal_error)?;
    let bookmarks = state.library.list(&user_id).await.map_err(internal_error)?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(AddBookmarkResponse { added, bookmarks })))
}

pub(super) async fn remove_bookmark(
    State(state): State<AppState>,
    Path((user_id, manga_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    check_user_id(&user_id)?;
    let removed = state
        .library
        .remove(&user_id, &manga_id)
        .await
        .map_err(internal_error)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("bookmark {manga_id} not found")))
    }
}

pub(super) async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let stats = state
        .admin
        .stats(state.catalog.as_ref())
        .await
        .map_err(admin_error)?;
    Ok(Json(stats))
}

pub(super) async fn list_admins(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminAccount>>, ApiError> {
    Ok(Json(state.admin.admins().await.map_err(admin_error)?))
}

pub(super) async fn add_admin(
    State(state): State<AppState>,
    Json(new): Json<NewAdmin>,
) -> Result<(StatusCode, Json<AdminAccount>), ApiError> {
    let account = state.admin.add_admin(new).await.map_err(admin_error)?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub(super) async fn remove_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.admin.remove_admin(&id).await.map_err(admin_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.admin.users().await.map_err(admin_error)?))
}

pub(super) async fn register_user(
    State(state): State<AppState>,
    Json(new): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.admin.register_user(new).await.map_err(admin_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.admin.delete_user(&id).await.map_err(admin_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn toggle_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(
        state
            .admin
            .toggle_user_active(&id)
            .await
            .map_err(admin_error)?,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct RoleBody {
    role: String,
}

pub(super) async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RoleBody>,
) -> Result<Json<User>, ApiError> {
    let role: Role = body.role.parse().map_err(admin_error)?;
    Ok(Json(
        state
            .admin
            .set_user_role(&id, role)
            .await
            .map_err(admin_error)?,
    ))
}

pub(super) async fn list_rankings(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankingEntry>>, ApiError> {
    Ok(Json(state.admin.rankings().await.map_err(admin_error)?))
}

pub(super) async fn add_ranking(
    State(state): State<AppState>,
    Json(manga): Json<CuratedManga>,
) -> Result<(StatusCode, Json<RankingEntry>), ApiError> {
    let entry = state.admin.add_ranking(manga).await.map_err(admin_error)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(super) async fn remove_ranking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RankingEntry>>, ApiError> {
    Ok(Json(
        state.admin.remove_ranking(&id).await.map_err(admin_error)?,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct MoveBody {
    direction: MoveDirection,
}

pub(super) async fn move_ranking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MoveBody>,
) -> Result<Json<Vec<RankingEntry>>, ApiError> {
    Ok(Json(
        state
            .admin
            .move_ranking(&id, body.direction)
            .await
            .map_err(admin_error)?,
    ))
}

pub(super) async fn list_recommendations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    Ok(Json(
        state.admin.recommendations().await.map_err(admin_error)?,
    ))
}

pub(super) async fn add_recommendation(
    State(state): State<AppState>,
    Json(manga): Json<CuratedManga>,
) -> Result<(StatusCode, Json<Recommendation>), ApiError> {
    let entry = state
        .admin
        .add_recommendation(manga)
        .await
        .map_err(admin_error)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(super) async fn remove_recommendation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .admin
        .remove_recommendation(&id)
        .await
        .map_err(admin_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn all_bookmarks(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookmarkRow>>, ApiError> {
    Ok(Json(state.admin.all_bookmarks().await.map_err(admin_error)?))
}
