use sea_orm::sea_query::extension::postgres::PgBinOper;
use sea_orm::sea_query::{Expr, ExprTrait, Func, NullOrdering, SimpleExpr};
use sea_orm::*;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::projects::{self, ProjectFilters, ProjectPayload, ProjectStatus, SortBy};
use crate::models::{attachments, proposals, questions};

// ── Conditions ──

/// Name of the unique index on `projects.slug`.
pub const SLUG_INDEX: &str = "idx_projects_slug";

/// Build the public listing predicate. Always restricted to open projects.
///
/// The filter struct is destructured field by field so that adding a filter
/// without handling it here is a compile error.
pub fn listing_condition(filters: &ProjectFilters) -> Condition {
    let ProjectFilters {
        category,
        subcategory,
        budget_type,
        experience_level,
        project_type,
        search,
        skills_required,
        technologies,
        min_budget,
        max_budget,
        is_urgent,
        is_featured,
        sort_by: _,
        page: _,
        limit: _,
    } = filters;

    let mut cond = Condition::all().add(projects::Column::Status.eq(ProjectStatus::Open));

    if let Some(category) = category {
        cond = cond.add(projects::Column::Category.eq(category.as_str()));
    }
    if let Some(subcategory) = subcategory {
        cond = cond.add(projects::Column::Subcategory.eq(subcategory.as_str()));
    }
    if let Some(budget_type) = budget_type {
        cond = cond.add(projects::Column::BudgetType.eq(*budget_type));
    }
    if let Some(level) = experience_level {
        cond = cond.add(projects::Column::ExperienceLevel.eq(*level));
    }
    if let Some(project_type) = project_type {
        cond = cond.add(projects::Column::ProjectType.eq(project_type.as_str()));
    }
    if let Some(is_urgent) = is_urgent {
        cond = cond.add(projects::Column::IsUrgent.eq(*is_urgent));
    }
    if let Some(is_featured) = is_featured {
        cond = cond.add(projects::Column::IsFeatured.eq(*is_featured));
    }

    if let Some(search) = search {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        let mut any = Condition::any();
        for column in [
            projects::Column::Title,
            projects::Column::Description,
            projects::Column::Category,
            projects::Column::Subcategory,
        ] {
            any = any.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.as_str()));
        }
        cond = cond.add(any);
    }

    if !skills_required.is_empty() {
        cond = cond.add(overlaps(projects::Column::SkillsRequired, skills_required));
    }
    if !technologies.is_empty() {
        cond = cond.add(overlaps(projects::Column::Technologies, technologies));
    }

    // Range overlap: the project's range must not lie entirely outside the requested one.
    if let Some(lo) = min_budget {
        cond = cond.add(
            Condition::any()
                .add(projects::Column::MinBudget.gte(*lo))
                .add(projects::Column::MaxBudget.gte(*lo)),
        );
    }
    if let Some(hi) = max_budget {
        cond = cond.add(
            Condition::any()
                .add(projects::Column::MaxBudget.lte(*hi))
                .add(projects::Column::MinBudget.lte(*hi)),
        );
    }

    cond
}

/// Condition for the owner dashboard: the caller's projects, any status unless one is given.
pub fn owner_condition(owner_id: Uuid, status: Option<ProjectStatus>) -> Condition {
    let cond = Condition::all().add(projects::Column::CreatorId.eq(owner_id));
    match status {
        Some(status) => cond.add(projects::Column::Status.eq(status)),
        None => cond,
    }
}

/// Postgres `&&`: true when the array column shares at least one element with `values`.
fn overlaps(column: projects::Column, values: &[String]) -> SimpleExpr {
    Expr::col(column).binary(PgBinOper::Overlap, Expr::val(values.to_vec()))
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `None` is the marketplace default: featured, then urgent, then newest.
fn apply_order(
    query: Select<projects::Entity>,
    sort_by: Option<SortBy>,
) -> Select<projects::Entity> {
    let query = match sort_by {
        None => query
            .order_by_desc(projects::Column::IsFeatured)
            .order_by_desc(projects::Column::IsUrgent)
            .order_by_desc(projects::Column::CreatedAt),
        Some(SortBy::Newest) => query.order_by_desc(projects::Column::CreatedAt),
        Some(SortBy::Budget) => query
            .order_by_with_nulls(projects::Column::MaxBudget, Order::Desc, NullOrdering::Last)
            .order_by_with_nulls(projects::Column::MinBudget, Order::Desc, NullOrdering::Last)
            .order_by_desc(projects::Column::CreatedAt),
        Some(SortBy::Proposals) => query
            .order_by_desc(projects::Column::Proposals)
            .order_by_desc(projects::Column::CreatedAt),
    };

    // Final tie-break keeps page boundaries stable.
    query.order_by_desc(projects::Column::Id)
}

// ── Reads ──

/// Count the projects matching `cond`.
pub async fn count_projects(db: &DatabaseConnection, cond: Condition) -> Result<u64, DbErr> {
    projects::Entity::find().filter(cond).count(db).await
}

/// One page of projects matching `cond`, ordered by `sort_by`.
pub fn page_query(
    cond: Condition,
    sort_by: Option<SortBy>,
    offset: u64,
    limit: u64,
) -> Select<projects::Entity> {
    apply_order(projects::Entity::find().filter(cond), sort_by)
        .offset(offset)
        .limit(limit)
}

/// Fetch one page of projects matching `cond`.
pub async fn find_projects_page(
    db: &DatabaseConnection,
    cond: Condition,
    sort_by: Option<SortBy>,
    offset: u64,
    limit: u64,
) -> Result<Vec<projects::Model>, DbErr> {
    page_query(cond, sort_by, offset, limit).all(db).await
}

/// Fetch a single project by id or slug. An id match wins over a slug that
/// happens to look like the same UUID.
pub async fn find_by_id_or_slug(
    db: &DatabaseConnection,
    key: &str,
) -> Result<Option<projects::Model>, DbErr> {
    if let Ok(id) = Uuid::parse_str(key) {
        if let Some(project) = get_project_by_id(db, id).await? {
            return Ok(Some(project));
        }
    }

    projects::Entity::find()
        .filter(projects::Column::Slug.eq(key))
        .one(db)
        .await
}

/// Fetch a single project by ID.
pub async fn get_project_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<projects::Model>, DbErr> {
    projects::Entity::find_by_id(id).one(db).await
}

/// Fetch projects by id, in no particular order.
pub async fn get_projects_by_ids(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<Vec<projects::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    projects::Entity::find()
        .filter(projects::Column::Id.is_in(ids))
        .all(db)
        .await
}

#[derive(Debug, FromQueryResult)]
struct SlugRow {
    slug: String,
}

/// Slugs already in use that could collide with `base` (`base` itself and `base-*`).
///
/// `exclude_id` leaves the project being edited out of the set.
pub async fn taken_slugs(
    db: &DatabaseConnection,
    base: &str,
    exclude_id: Option<Uuid>,
) -> Result<HashSet<String>, DbErr> {
    let mut query = projects::Entity::find()
        .select_only()
        .column(projects::Column::Slug)
        .filter(
            Condition::any()
                .add(projects::Column::Slug.eq(base))
                .add(projects::Column::Slug.like(format!("{}-%", escape_like(base)))),
        );

    if let Some(id) = exclude_id {
        query = query.filter(projects::Column::Id.ne(id));
    }

    let rows = query.into_model::<SlugRow>().all(db).await?;
    Ok(rows.into_iter().map(|r| r.slug).collect())
}

pub async fn get_proposals_for_project(
    db: &DatabaseConnection,
    project_id: Uuid,
) -> Result<Vec<proposals::Model>, DbErr> {
    proposals::Entity::find()
        .filter(proposals::Column::ProjectId.eq(project_id))
        .order_by_desc(proposals::Column::CreatedAt)
        .all(db)
        .await
}

/// Attachments of a project itself plus those of the given proposals, in one query.
pub async fn get_attachments(
    db: &DatabaseConnection,
    project_id: Uuid,
    proposal_ids: Vec<Uuid>,
) -> Result<Vec<attachments::Model>, DbErr> {
    let mut cond = Condition::any().add(attachments::Column::ProjectId.eq(project_id));
    if !proposal_ids.is_empty() {
        cond = cond.add(attachments::Column::ProposalId.is_in(proposal_ids));
    }

    attachments::Entity::find()
        .filter(cond)
        .order_by_asc(attachments::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn get_questions_for_project(
    db: &DatabaseConnection,
    project_id: Uuid,
) -> Result<Vec<questions::Model>, DbErr> {
    questions::Entity::find()
        .filter(questions::Column::ProjectId.eq(project_id))
        .order_by_asc(questions::Column::CreatedAt)
        .all(db)
        .await
}

// ── Writes ──

/// Bump the view counter in place (`views = views + 1`).
pub async fn increment_views(db: &DatabaseConnection, id: Uuid) -> Result<(), DbErr> {
    projects::Entity::update_many()
        .col_expr(
            projects::Column::Views,
            Expr::col(projects::Column::Views).add(1),
        )
        .filter(projects::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(())
}

/// Insert a new open project owned by `owner_id`.
pub async fn insert_project(
    db: &DatabaseConnection,
    input: &ProjectPayload,
    slug: String,
    owner_id: Uuid,
) -> Result<projects::Model, DbErr> {
    let now = chrono::Utc::now();
    let input = input.clone();

    let new_project = projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(slug),
        title: Set(input.title),
        description: Set(input.description),
        category: Set(input.category),
        subcategory: Set(input.subcategory),
        budget_type: Set(input.budget_type),
        budget: Set(input.budget),
        min_budget: Set(input.min_budget),
        max_budget: Set(input.max_budget),
        deadline: Set(input.deadline),
        estimated_duration: Set(input.estimated_duration),
        skills_required: Set(input.skills_required),
        technologies: Set(input.technologies),
        experience_level: Set(input.experience_level),
        project_type: Set(input.project_type),
        tags: Set(input.tags),
        is_urgent: Set(input.is_urgent),
        is_featured: Set(false),
        status: Set(ProjectStatus::Open),
        views: Set(0),
        proposals: Set(0),
        creator_id: Set(owner_id),
        created_at: Set(now),
        updated_at: Set(now),
        posted_at: Set(Some(now)),
        closed_at: Set(None),
    };

    new_project.insert(db).await
}

/// Overwrite the editable fields of a project, but only while it is open and
/// owned by `owner_id`. Returns the number of rows updated (0 or 1).
///
/// Ownership, status, counters and creation timestamps are left untouched.
pub async fn update_open_project(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: Uuid,
    input: &ProjectPayload,
    slug: String,
) -> Result<u64, DbErr> {
    let input = input.clone();

    let changes = projects::ActiveModel {
        slug: Set(slug),
        title: Set(input.title),
        description: Set(input.description),
        category: Set(input.category),
        subcategory: Set(input.subcategory),
        budget_type: Set(input.budget_type),
        budget: Set(input.budget),
        min_budget: Set(input.min_budget),
        max_budget: Set(input.max_budget),
        deadline: Set(input.deadline),
        estimated_duration: Set(input.estimated_duration),
        skills_required: Set(input.skills_required),
        technologies: Set(input.technologies),
        experience_level: Set(input.experience_level),
        project_type: Set(input.project_type),
        tags: Set(input.tags),
        is_urgent: Set(input.is_urgent),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = projects::Entity::update_many()
        .set(changes)
        .filter(projects::Column::Id.eq(id))
        .filter(projects::Column::CreatorId.eq(owner_id))
        .filter(projects::Column::Status.eq(ProjectStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete a project, but only while it is open and owned by `owner_id`.
/// Returns the number of rows removed (0 or 1).
pub async fn delete_open_project(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: Uuid,
) -> Result<u64, DbErr> {
    let result = projects::Entity::delete_many()
        .filter(projects::Column::Id.eq(id))
        .filter(projects::Column::CreatorId.eq(owner_id))
        .filter(projects::Column::Status.eq(ProjectStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Mark an open project owned by `owner_id` as closed. Returns rows updated (0 or 1).
pub async fn close_open_project(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: Uuid,
) -> Result<u64, DbErr> {
    let now = chrono::Utc::now();

    let result = projects::Entity::update_many()
        .col_expr(projects::Column::Status, Expr::value(ProjectStatus::Closed))
        .col_expr(projects::Column::ClosedAt, Expr::value(now))
        .col_expr(projects::Column::UpdatedAt, Expr::value(now))
        .filter(projects::Column::Id.eq(id))
        .filter(projects::Column::CreatorId.eq(owner_id))
        .filter(projects::Column::Status.eq(ProjectStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
