use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheConfig, CacheData, keys};
use crate::db::users as user_db;
use crate::error::AppError;
use crate::models::users::{CurrentUser, UserResponse};

/// GET /api/auth/me: The authenticated user's profile and client profile.
pub async fn me(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    cache_config: web::Data<CacheConfig>,
) -> Result<HttpResponse, AppError> {
    let user = user.0;
    let cache_key = keys::user(&user.id.to_string());

    match cache.get::<CurrentUser>(&cache_key).await {
        Ok(Some(cached)) => return Ok(HttpResponse::Ok().json(cached)),
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache error: {}", e),
    }

    let mut profiles = user_db::get_client_profiles_by_user_ids(db.get_ref(), vec![user.id]).await?;
    let response = CurrentUser {
        client_profile: profiles.remove(&user.id),
        user: UserResponse::from(user),
    };

    if let Err(e) = cache
        .set(&cache_key, &response, Some(cache_config.user_ttl))
        .await
    {
        tracing::warn!("Failed to cache user {}: {}", response.user.id, e);
    }

    Ok(HttpResponse::Ok().json(response))
}
