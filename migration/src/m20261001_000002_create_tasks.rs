// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 流水线任务表迁移
///
/// 每一行对应一个批次中的 (行业, 目标日期) 工作单元
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::IndustryId).integer().not_null())
                    .col(ColumnDef::new(Tasks::TargetDate).date().not_null())
                    .col(ColumnDef::new(Tasks::Status).string().not_null())
                    .col(ColumnDef::new(Tasks::BatchId).string().not_null())
                    .col(
                        ColumnDef::new(Tasks::PostsScraped)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tasks::PostsProcessed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tasks::IdeasGenerated)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tasks::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tasks::MaxRetries)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(ColumnDef::new(Tasks::ErrorMessage).text())
                    .col(ColumnDef::new(Tasks::FailedFrom).string())
                    .col(
                        ColumnDef::new(Tasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Tasks::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tasks::CompletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Coordinator candidate selection and in-flight counts
        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_status_created_at")
                    .table(Tasks::Table)
                    .col(Tasks::Status)
                    .col(Tasks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Duplicate batch detection in the task creator
        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_target_date_industry")
                    .table(Tasks::Table)
                    .col(Tasks::TargetDate)
                    .col(Tasks::IndustryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_batch_id")
                    .table(Tasks::Table)
                    .col(Tasks::BatchId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    IndustryId,
    TargetDate,
    Status,
    BatchId,
    PostsScraped,
    PostsProcessed,
    IdeasGenerated,
    RetryCount,
    MaxRetries,
    ErrorMessage,
    FailedFrom,
    CreatedAt,
    UpdatedAt,
    StartedAt,
    CompletedAt,
}
