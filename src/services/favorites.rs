use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::favorites as favorite_db;
use crate::db::projects as project_db;
use crate::error::{AppError, AppResult};
use crate::models::favorites::FavoriteToggle;
use crate::models::projects;

/// Flip the caller's favorite on a project.
///
/// Both branches are single conditional writes: a delete that reports whether
/// a row existed, then an insert that ignores a row created concurrently.
pub async fn toggle_favorite(
    db: &DatabaseConnection,
    user_id: Uuid,
    project_id: Uuid,
) -> AppResult<FavoriteToggle> {
    if project_db::get_project_by_id(db, project_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Project {project_id} not found")));
    }

    if favorite_db::delete_favorite(db, user_id, project_id).await? > 0 {
        tracing::debug!(%user_id, %project_id, "Favorite removed");
        return Ok(FavoriteToggle { favorited: false });
    }

    favorite_db::insert_favorite(db, user_id, project_id).await?;
    tracing::debug!(%user_id, %project_id, "Favorite added");
    Ok(FavoriteToggle { favorited: true })
}

/// The caller's favorited projects, most recently favorited first.
pub async fn list_favorites(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<projects::Model>> {
    let favorites = favorite_db::get_favorites_by_user(db, user_id).await?;
    let ids: Vec<Uuid> = favorites.iter().map(|f| f.project_id).collect();

    let mut by_id: HashMap<Uuid, projects::Model> = project_db::get_projects_by_ids(db, ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(favorites
        .iter()
        .filter_map(|f| by_id.remove(&f.project_id))
        .collect())
}
