use sea_orm::entity::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::{PaginationQuery, attachments, client_profiles, proposals, questions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetType {
    #[sea_orm(string_value = "FIXED")]
    #[serde(alias = "fixed")]
    Fixed,
    #[sea_orm(string_value = "HOURLY")]
    #[serde(alias = "hourly")]
    Hourly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    #[sea_orm(string_value = "BEGINNER")]
    #[serde(alias = "beginner")]
    Beginner,
    #[sea_orm(string_value = "INTERMEDIATE")]
    #[serde(alias = "intermediate")]
    Intermediate,
    #[sea_orm(string_value = "ADVANCED")]
    #[serde(alias = "advanced")]
    Advanced,
}

/// Lifecycle status. Only `Open` projects accept edits, deletion or closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "OPEN")]
    #[serde(alias = "open")]
    Open,
    #[sea_orm(string_value = "CLOSED")]
    #[serde(alias = "closed")]
    Closed,
}

/// SeaORM entity for the `projects` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub budget_type: BudgetType,
    pub budget: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub min_budget: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub max_budget: Option<f64>,
    pub deadline: Option<Date>,
    pub estimated_duration: Option<String>,
    pub skills_required: Vec<String>,
    pub technologies: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub project_type: String,
    pub tags: Vec<String>,
    pub is_urgent: bool,
    pub is_featured: bool,
    pub status: ProjectStatus,
    pub views: i32,
    pub proposals: i32,
    pub creator_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub posted_at: Option<DateTimeUtc>,
    pub closed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatorId",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::proposals::Entity")]
    Proposals,
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::questions::Entity")]
    Questions,
    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::proposals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposals.def()
    }
}

impl Related<super::attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── Request DTOs ──

/// Body of `POST /api/projects` and `PUT /api/projects/{id}`.
///
/// Field-level rules are declared here; the budget rules depend on
/// `budget_type` and are checked in `services::projects::validate_payload`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectPayload {
    #[validate(length(min = 5, max = 100, message = "Title must be between 5 and 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 50,
        max = 2000,
        message = "Description must be between 50 and 2000 characters"
    ))]
    pub description: String,
    #[validate(length(min = 1, message = "Please select a category"))]
    pub category: String,
    pub subcategory: Option<String>,
    pub budget_type: BudgetType,
    pub budget: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub deadline: Option<Date>,
    pub estimated_duration: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one skill is required"))]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub experience_level: ExperienceLevel,
    #[validate(length(min = 1, message = "Please select project type"))]
    pub project_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_urgent: bool,
}

impl ProjectPayload {
    /// Trim every string, turn blank optionals into `None` and drop blank list entries.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            subcategory: non_blank(self.subcategory),
            budget: non_blank(self.budget),
            estimated_duration: non_blank(self.estimated_duration),
            skills_required: clean_list(self.skills_required),
            technologies: clean_list(self.technologies),
            project_type: self.project_type.trim().to_string(),
            tags: clean_list(self.tags),
            ..self
        }
    }
}

/// Query string of `GET /api/projects`.
///
/// Every field is optional; `services::projects` turns the set ones into one
/// SQL condition. The browse page sends `budgetMin`/`budgetMax`/`sortBy`,
/// which are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFilters {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub budget_type: Option<BudgetType>,
    pub experience_level: Option<ExperienceLevel>,
    pub project_type: Option<String>,
    pub search: Option<String>,
    #[serde(default, alias = "skills", deserialize_with = "comma_separated")]
    pub skills_required: Vec<String>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub technologies: Vec<String>,
    #[serde(alias = "budgetMin")]
    pub min_budget: Option<f64>,
    #[serde(alias = "budgetMax")]
    pub max_budget: Option<f64>,
    pub is_urgent: Option<bool>,
    pub is_featured: Option<bool>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<SortBy>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ProjectFilters {
    pub fn normalized(self) -> Self {
        Self {
            category: non_blank(self.category),
            subcategory: non_blank(self.subcategory),
            project_type: non_blank(self.project_type),
            search: non_blank(self.search),
            skills_required: clean_list(self.skills_required),
            technologies: clean_list(self.technologies),
            ..self
        }
    }

    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Explicit ordering for the browse page. Without it listings are ordered
/// featured first, then urgent, then newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Newest,
    Budget,
    Proposals,
}

/// Query string of `GET /api/projects/mine`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnProjectsQuery {
    pub status: Option<ProjectStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl OwnProjectsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

// ── Response DTOs ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfileSummary {
    pub company_name: Option<String>,
    pub average_rating: Option<f64>,
    pub total_reviews: i32,
}

impl From<client_profiles::Model> for ClientProfileSummary {
    fn from(p: client_profiles::Model) -> Self {
        Self {
            company_name: p.company_name,
            average_rating: p.average_rating,
            total_reviews: p.total_reviews,
        }
    }
}

/// Creator block attached to every listing item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub client_profile: Option<ClientProfileSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Model,
    pub user: Option<CreatorSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPage {
    pub items: Vec<ProjectSummary>,
    pub pagination: super::Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
}

impl From<super::users::Model> for UserSummary {
    fn from(u: super::users::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            picture: u.picture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorDetail {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
    pub location: Option<String>,
    pub client_profile: Option<client_profiles::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub proposal: proposals::Model,
    pub freelancer: Option<UserSummary>,
    pub attachments: Vec<attachments::Model>,
}

/// Full project page payload returned by `GET /api/projects/{id_or_slug}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Model,
    pub user: Option<CreatorDetail>,
    pub project_proposals: Vec<ProposalDetail>,
    pub attachments: Vec<attachments::Model>,
    pub questions: Vec<questions::Model>,
    /// Ids of the users who favorited the project.
    pub favorites: Vec<Uuid>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// `skills=rust,go` → `["rust", "go"]`.
fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| {
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default())
}
