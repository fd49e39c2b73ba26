//! Project use cases: listing, detail, and the owner-only mutations.
//!
//! Every function here takes the caller's id explicitly; extracting it from
//! the request is the handler's job.

use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::authorization::{ensure_creator, find_project, verify_project_editable};
use crate::db::favorites as favorite_db;
use crate::db::projects as project_db;
use crate::db::users as user_db;
use crate::error::{AppError, AppResult};
use crate::models::Pagination;
use crate::models::projects::{
    self, BudgetType, CreatorDetail, CreatorSummary, OwnProjectsQuery, ProjectDetail,
    ProjectFilters, ProjectPage, ProjectPayload, ProjectSummary, ProposalDetail, SortBy,
    UserSummary,
};
use crate::slug::{MAX_SLUG_ATTEMPTS, first_free_slug, slugify};

// ── Validation ──

/// Normalize the payload and check every rule, reporting all violations at once.
pub fn validate_payload(payload: ProjectPayload) -> AppResult<ProjectPayload> {
    let payload = payload.normalized();

    let mut errors = match payload.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    let hourly = payload.budget_type == BudgetType::Hourly;

    if payload.budget_type == BudgetType::Fixed && payload.budget.is_none() {
        errors.add(
            "budget",
            violation("required", "Budget is required for fixed price projects"),
        );
    }

    if !rate_ok(payload.min_budget, hourly) {
        errors.add(
            "min_budget",
            violation(
                "positive",
                "Minimum hourly rate is required and must be a positive number",
            ),
        );
    }
    if !rate_ok(payload.max_budget, hourly) {
        errors.add(
            "max_budget",
            violation(
                "positive",
                "Maximum hourly rate is required and must be a positive number",
            ),
        );
    }

    if let (Some(min), Some(max)) = (payload.min_budget, payload.max_budget) {
        if min > max {
            errors.add(
                "max_budget",
                violation(
                    "range",
                    "Maximum rate must be greater than or equal to minimum rate",
                ),
            );
        }
    }

    if errors.errors().is_empty() {
        Ok(payload)
    } else {
        Err(errors.into())
    }
}

/// A rate is fine when absent and optional, or present and strictly positive.
fn rate_ok(value: Option<f64>, required: bool) -> bool {
    match value {
        None => !required,
        Some(v) => v.is_finite() && v > 0.0,
    }
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

// ── Reads ──

/// Public marketplace listing: open projects only, filtered, ordered and paged.
pub async fn list_projects(
    db: &DatabaseConnection,
    filters: ProjectFilters,
) -> AppResult<ProjectPage> {
    let filters = filters.normalized();
    let paging = filters.pagination();
    let cond = project_db::listing_condition(&filters);

    // Count and page share one condition so `total` and `items` agree.
    let total = project_db::count_projects(db, cond.clone()).await?;
    let rows = project_db::find_projects_page(
        db,
        cond,
        filters.sort_by,
        paging.offset(),
        paging.limit(),
    )
    .await?;

    Ok(ProjectPage {
        items: with_creators(db, rows).await?,
        pagination: Pagination::new(paging.page(), paging.limit(), total),
    })
}

/// Owner dashboard listing: the caller's own projects, any status, newest first.
pub async fn list_own_projects(
    db: &DatabaseConnection,
    owner_id: Uuid,
    query: OwnProjectsQuery,
) -> AppResult<ProjectPage> {
    let paging = query.pagination();
    let cond = project_db::owner_condition(owner_id, query.status);

    let total = project_db::count_projects(db, cond.clone()).await?;
    let rows = project_db::find_projects_page(
        db,
        cond,
        Some(SortBy::Newest),
        paging.offset(),
        paging.limit(),
    )
    .await?;

    Ok(ProjectPage {
        items: rows
            .into_iter()
            .map(|project| ProjectSummary {
                project,
                user: None,
            })
            .collect(),
        pagination: Pagination::new(paging.page(), paging.limit(), total),
    })
}

/// Public project page. Counts as a view: `views` is incremented on every call.
pub async fn view_project(db: &DatabaseConnection, key: &str) -> AppResult<ProjectDetail> {
    let project = find_project(db, key).await?;
    project_db::increment_views(db, project.id).await?;

    let project = projects::Model {
        views: project.views + 1,
        ..project
    };
    load_detail(db, project).await
}

/// Owner dashboard detail. Not counted as a view.
pub async fn get_own_project(
    db: &DatabaseConnection,
    owner_id: Uuid,
    key: &str,
) -> AppResult<ProjectDetail> {
    let project = find_project(db, key).await?;
    ensure_creator(&project, owner_id)?;
    load_detail(db, project).await
}

/// Attach creator and client-profile summaries, one query per table.
async fn with_creators(
    db: &DatabaseConnection,
    rows: Vec<projects::Model>,
) -> Result<Vec<ProjectSummary>, DbErr> {
    let creator_ids: Vec<Uuid> = rows
        .iter()
        .map(|p| p.creator_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let users = user_db::get_users_by_ids(db, creator_ids.clone()).await?;
    let mut profiles = user_db::get_client_profiles_by_user_ids(db, creator_ids).await?;

    Ok(rows
        .into_iter()
        .map(|project| {
            let user = users.get(&project.creator_id).map(|u| CreatorSummary {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                client_profile: profiles.remove(&u.id).map(Into::into),
            });
            ProjectSummary { project, user }
        })
        .collect())
}

async fn load_detail(db: &DatabaseConnection, project: projects::Model) -> AppResult<ProjectDetail> {
    let proposals = project_db::get_proposals_for_project(db, project.id).await?;
    let proposal_ids: Vec<Uuid> = proposals.iter().map(|p| p.id).collect();

    let mut direct_attachments = Vec::new();
    let mut by_proposal: HashMap<Uuid, Vec<_>> = HashMap::new();
    for attachment in project_db::get_attachments(db, project.id, proposal_ids).await? {
        match attachment.proposal_id {
            Some(proposal_id) => by_proposal.entry(proposal_id).or_default().push(attachment),
            None => direct_attachments.push(attachment),
        }
    }

    let questions = project_db::get_questions_for_project(db, project.id).await?;
    let favorites = favorite_db::get_favorite_user_ids(db, project.id).await?;

    let mut user_ids: Vec<Uuid> = proposals.iter().map(|p| p.freelancer_id).collect();
    user_ids.push(project.creator_id);
    user_ids.sort();
    user_ids.dedup();

    let users = user_db::get_users_by_ids(db, user_ids).await?;
    let mut profiles = user_db::get_client_profiles_by_user_ids(db, vec![project.creator_id]).await?;

    let user = users.get(&project.creator_id).map(|u| CreatorDetail {
        id: u.id,
        name: u.name.clone(),
        email: u.email.clone(),
        picture: u.picture.clone(),
        location: u.location.clone(),
        client_profile: profiles.remove(&u.id),
    });

    let project_proposals = proposals
        .into_iter()
        .map(|proposal| ProposalDetail {
            freelancer: users.get(&proposal.freelancer_id).cloned().map(UserSummary::from),
            attachments: by_proposal.remove(&proposal.id).unwrap_or_default(),
            proposal,
        })
        .collect();

    Ok(ProjectDetail {
        project,
        user,
        project_proposals,
        attachments: direct_attachments,
        questions,
        favorites,
    })
}

// ── Writes ──

/// A write rejected by the unique index on `projects.slug`. Postgres names the
/// violated constraint in the message.
fn is_slug_conflict(err: &DbErr) -> bool {
    let message = match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => message,
        _ => err.to_string(),
    };
    message.contains(&format!("unique constraint \"{}\"", project_db::SLUG_INDEX))
}

async fn allocate_slug(
    db: &DatabaseConnection,
    base: &str,
    exclude_id: Option<Uuid>,
) -> Result<String, DbErr> {
    let taken = project_db::taken_slugs(db, base, exclude_id).await?;
    Ok(first_free_slug(base, &taken))
}

/// Create an open project owned by `owner_id`.
///
/// A concurrent create can claim the chosen slug between lookup and insert;
/// the unique index rejects the loser, which then re-allocates.
pub async fn create_project(
    db: &DatabaseConnection,
    owner_id: Uuid,
    payload: ProjectPayload,
) -> AppResult<projects::Model> {
    let payload = validate_payload(payload)?;
    let base = slugify(&payload.title);

    let mut attempt = 1;
    loop {
        let slug = allocate_slug(db, &base, None).await?;
        match project_db::insert_project(db, &payload, slug.clone(), owner_id).await {
            Ok(project) => {
                tracing::info!(project_id = %project.id, slug = %project.slug, %owner_id, "Project created");
                return Ok(project);
            }
            Err(e) if is_slug_conflict(&e) && attempt < MAX_SLUG_ATTEMPTS => {
                tracing::warn!(%slug, attempt, "Slug taken concurrently, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Replace the editable fields of an open project the caller owns.
///
/// The slug is only regenerated when the title normalizes differently.
pub async fn update_project(
    db: &DatabaseConnection,
    key: &str,
    user_id: Uuid,
    payload: ProjectPayload,
) -> AppResult<projects::Model> {
    let existing = verify_project_editable(db, key, user_id).await?;
    let payload = validate_payload(payload)?;

    let base = slugify(&payload.title);
    let title_changed = base != slugify(&existing.title);

    let mut attempt = 1;
    loop {
        let slug = if title_changed {
            allocate_slug(db, &base, Some(existing.id)).await?
        } else {
            existing.slug.clone()
        };

        match project_db::update_open_project(db, existing.id, user_id, &payload, slug.clone()).await {
            Ok(0) => {
                return Err(AppError::InvalidState(
                    "Project is no longer open and cannot be modified".to_string(),
                ));
            }
            Ok(_) => break,
            Err(e) if title_changed && is_slug_conflict(&e) && attempt < MAX_SLUG_ATTEMPTS => {
                tracing::warn!(%slug, attempt, "Slug taken concurrently, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let updated = project_db::get_project_by_id(db, existing.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", existing.id)))?;

    tracing::info!(project_id = %updated.id, slug = %updated.slug, "Project updated");
    Ok(updated)
}

/// Permanently delete an open project the caller owns. Dependent rows go
/// with it through the schema's cascading foreign keys.
pub async fn delete_project(db: &DatabaseConnection, key: &str, user_id: Uuid) -> AppResult<()> {
    let project = verify_project_editable(db, key, user_id).await?;

    if project_db::delete_open_project(db, project.id, user_id).await? == 0 {
        return Err(AppError::InvalidState(
            "Project is no longer open and cannot be deleted".to_string(),
        ));
    }

    tracing::info!(project_id = %project.id, "Project deleted");
    Ok(())
}

/// Close an open project the caller owns. There is no way back to open.
pub async fn close_project(
    db: &DatabaseConnection,
    key: &str,
    user_id: Uuid,
) -> AppResult<projects::Model> {
    let project = verify_project_editable(db, key, user_id).await?;

    if project_db::close_open_project(db, project.id, user_id).await? == 0 {
        return Err(AppError::InvalidState("Project is not open".to_string()));
    }

    let closed = project_db::get_project_by_id(db, project.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project.id)))?;

    tracing::info!(project_id = %closed.id, "Project closed");
    Ok(closed)
}
