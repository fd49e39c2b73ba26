use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `projects` table and its columns.
#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Slug,
    Title,
    Description,
    Category,
    Subcategory,
    BudgetType,
    Budget,
    MinBudget,
    MaxBudget,
    Deadline,
    EstimatedDuration,
    SkillsRequired,
    Technologies,
    ExperienceLevel,
    ProjectType,
    Tags,
    IsUrgent,
    IsFeatured,
    Status,
    Views,
    Proposals,
    CreatorId,
    CreatedAt,
    UpdatedAt,
    PostedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

fn text_array(col: Projects) -> ColumnDef {
    ColumnDef::new(col)
        .array(ColumnType::Text)
        .not_null()
        .default(Expr::cust("'{}'"))
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::Slug).string().not_null())
                    .col(ColumnDef::new(Projects::Title).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text().not_null())
                    .col(ColumnDef::new(Projects::Category).string().not_null())
                    .col(ColumnDef::new(Projects::Subcategory).string().null())
                    .col(ColumnDef::new(Projects::BudgetType).string().not_null())
                    .col(ColumnDef::new(Projects::Budget).string().null())
                    .col(ColumnDef::new(Projects::MinBudget).double().null())
                    .col(ColumnDef::new(Projects::MaxBudget).double().null())
                    .col(ColumnDef::new(Projects::Deadline).date().null())
                    .col(ColumnDef::new(Projects::EstimatedDuration).string().null())
                    .col(text_array(Projects::SkillsRequired))
                    .col(text_array(Projects::Technologies))
                    .col(ColumnDef::new(Projects::ExperienceLevel).string().not_null())
                    .col(ColumnDef::new(Projects::ProjectType).string().not_null())
                    .col(text_array(Projects::Tags))
                    .col(
                        ColumnDef::new(Projects::IsUrgent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Projects::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string()
                            .not_null()
                            .default("OPEN"),
                    )
                    .col(ColumnDef::new(Projects::Views).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Projects::Proposals)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Projects::CreatorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Projects::PostedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Projects::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_creator_id")
                            .from(Projects::Table, Projects::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Backs slug allocation: a concurrent duplicate fails the insert.
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_slug")
                    .table(Projects::Table)
                    .col(Projects::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Owner dashboard.
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_creator_id")
                    .table(Projects::Table)
                    .col(Projects::CreatorId)
                    .to_owned(),
            )
            .await?;

        // Public listing: open projects, newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_status_created_at")
                    .table(Projects::Table)
                    .col(Projects::Status)
                    .col(Projects::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_category")
                    .table(Projects::Table)
                    .col(Projects::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}
