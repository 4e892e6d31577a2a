// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 协调器租约表迁移
///
/// 主键为 kind，保证每种协调器同一时刻最多只有一行租约
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CoordinatorLeases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoordinatorLeases::Kind)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CoordinatorLeases::Token).string().not_null())
                    .col(
                        ColumnDef::new(CoordinatorLeases::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CoordinatorLeases::AcquiredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CoordinatorLeases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CoordinatorLeases {
    Table,
    Kind,
    Token,
    ExpiresAt,
    AcquiredAt,
}
