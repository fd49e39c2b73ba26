use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::client_profiles;
use crate::models::users::{self, CreateUserFromAuth};

/// Fetch the user behind a token, creating the row on first sight (called by auth middleware).
pub async fn find_or_create_from_auth(
    db: &DatabaseConnection,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        name: Set(input.name),
        picture: Set(input.picture),
        location: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_user.insert(db).await
}

/// Load many users in one query, keyed by id.
pub async fn get_users_by_ids(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, users::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
}

/// Load the client profiles of many users in one query, keyed by user id.
pub async fn get_client_profiles_by_user_ids(
    db: &DatabaseConnection,
    user_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, client_profiles::Model>, DbErr> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = client_profiles::Entity::find()
        .filter(client_profiles::Column::UserId.is_in(user_ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|p| (p.user_id, p)).collect())
}
