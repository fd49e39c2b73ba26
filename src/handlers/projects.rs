use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheConfig, CacheData, keys};
use crate::error::AppError;
use crate::models::projects::{OwnProjectsQuery, ProjectFilters, ProjectPage, ProjectPayload};
use crate::services::favorites as favorite_service;
use crate::services::projects as project_service;

/// GET /api/projects: Public listing of open projects.
///
/// Query params: category, subcategory, budget_type, experience_level,
/// project_type, search, skills (comma separated), technologies,
/// min_budget / budgetMin, max_budget / budgetMax, is_urgent, is_featured,
/// sort_by / sortBy (newest | budget | proposals), page, limit.
pub async fn get_projects(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    cache_config: web::Data<CacheConfig>,
    query: web::Query<ProjectFilters>,
) -> Result<HttpResponse, AppError> {
    let filters = query.into_inner().normalized();
    let cache_key = keys::project_list(&serde_json::to_string(&filters).unwrap_or_default());

    match cache.get::<ProjectPage>(&cache_key).await {
        Ok(Some(cached)) => return Ok(HttpResponse::Ok().json(cached)),
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache error: {}", e),
    }

    let page = project_service::list_projects(db.get_ref(), filters).await?;

    if let Err(e) = cache
        .set(&cache_key, &page, Some(cache_config.project_list_ttl))
        .await
    {
        tracing::warn!("Failed to cache project listing: {}", e);
    }

    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/projects/{id_or_slug}: Public project page (counts a view).
pub async fn get_project(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let detail = project_service::view_project(db.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/projects: Post a new project (requires authentication).
pub async fn create_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    body: web::Json<ProjectPayload>,
) -> Result<HttpResponse, AppError> {
    let project = project_service::create_project(db.get_ref(), user.0.id, body.into_inner()).await?;
    cache.invalidate_project_listings().await;
    Ok(HttpResponse::Created().json(project))
}

/// PUT /api/projects/{id_or_slug}: Edit an open project (creator only).
pub async fn update_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<String>,
    body: web::Json<ProjectPayload>,
) -> Result<HttpResponse, AppError> {
    let project = project_service::update_project(
        db.get_ref(),
        &path.into_inner(),
        user.0.id,
        body.into_inner(),
    )
    .await?;
    cache.invalidate_project_listings().await;
    Ok(HttpResponse::Ok().json(project))
}

/// DELETE /api/projects/{id_or_slug}: Delete an open project (creator only).
pub async fn delete_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();
    project_service::delete_project(db.get_ref(), &key, user.0.id).await?;
    cache.invalidate_project_listings().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Project {key} deleted"),
    })))
}

/// POST /api/projects/{id_or_slug}/close: Stop accepting proposals (creator only).
pub async fn close_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let project = project_service::close_project(db.get_ref(), &path.into_inner(), user.0.id).await?;
    cache.invalidate_project_listings().await;
    Ok(HttpResponse::Ok().json(project))
}

/// GET /api/projects/mine: The caller's own postings, any status.
/// Query params: ?status=OPEN|CLOSED&page=1&limit=10
pub async fn get_my_projects(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<OwnProjectsQuery>,
) -> Result<HttpResponse, AppError> {
    let page = project_service::list_own_projects(db.get_ref(), user.0.id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/projects/mine/{id_or_slug}: One of the caller's postings, without counting a view.
pub async fn get_my_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let detail = project_service::get_own_project(db.get_ref(), user.0.id, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/projects/{id}/favorite: Flip the caller's favorite on a project.
pub async fn toggle_favorite(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let result = favorite_service::toggle_favorite(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/projects/favorites: The caller's favorited projects.
pub async fn get_favorites(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let projects = favorite_service::list_favorites(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(projects))
}
