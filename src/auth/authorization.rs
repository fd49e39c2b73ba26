use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::projects as project_db;
use crate::error::AppError;
use crate::models::projects::{Model, ProjectStatus};

/// Load a project by id or slug, or fail with `NotFound`.
pub async fn find_project(db: &DatabaseConnection, key: &str) -> Result<Model, AppError> {
    project_db::find_by_id_or_slug(db, key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {key} not found")))
}

/// Fail with `Forbidden` unless `user_id` created the project.
pub fn ensure_creator(project: &Model, user_id: Uuid) -> Result<(), AppError> {
    if project.creator_id != user_id {
        tracing::warn!(project_id = %project.id, %user_id, "Denied access to project owned by another user");
        return Err(AppError::Forbidden(
            "You don't have permission to modify this project".to_string(),
        ));
    }
    Ok(())
}

/// Preconditions shared by update, delete and close.
///
/// Checked in order: the project exists, it is still open, the caller created it.
/// A closed project is therefore reported as such to every caller.
pub async fn verify_project_editable(
    db: &DatabaseConnection,
    key: &str,
    user_id: Uuid,
) -> Result<Model, AppError> {
    let project = find_project(db, key).await?;

    if project.status != ProjectStatus::Open {
        return Err(AppError::InvalidState(format!(
            "Project is already {:?}. Only open projects can be modified.",
            project.status
        )));
    }

    ensure_creator(&project, user_id)?;

    Ok(project)
}
