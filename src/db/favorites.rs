use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use crate::models::favorites;

/// Remove the (user, project) favorite if present. Returns rows removed (0 or 1).
pub async fn delete_favorite(
    db: &DatabaseConnection,
    user_id: Uuid,
    project_id: Uuid,
) -> Result<u64, DbErr> {
    let result = favorites::Entity::delete_many()
        .filter(favorites::Column::UserId.eq(user_id))
        .filter(favorites::Column::ProjectId.eq(project_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Insert the (user, project) favorite; a row that already exists is left alone.
/// Returns rows inserted (0 or 1).
pub async fn insert_favorite(
    db: &DatabaseConnection,
    user_id: Uuid,
    project_id: Uuid,
) -> Result<u64, DbErr> {
    let favorite = favorites::ActiveModel {
        user_id: Set(user_id),
        project_id: Set(project_id),
        created_at: Set(chrono::Utc::now()),
    };

    favorites::Entity::insert(favorite)
        .on_conflict(
            OnConflict::columns([favorites::Column::UserId, favorites::Column::ProjectId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
}

/// Ids of every user who favorited a project.
pub async fn get_favorite_user_ids(
    db: &DatabaseConnection,
    project_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    let rows = favorites::Entity::find()
        .filter(favorites::Column::ProjectId.eq(project_id))
        .order_by_asc(favorites::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|f| f.user_id).collect())
}

/// A user's favorites, most recent first.
pub async fn get_favorites_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<favorites::Model>, DbErr> {
    favorites::Entity::find()
        .filter(favorites::Column::UserId.eq(user_id))
        .order_by_desc(favorites::Column::CreatedAt)
        .all(db)
        .await
}
