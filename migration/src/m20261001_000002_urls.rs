//! 短链接表迁移
//!
//! 创建 urls 表：
//! - slug 唯一索引（唯一性的最终裁决者）
//! - owner_id 外键指向 users，并建索引用于按所有者列表查询

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Urls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Urls::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Urls::Destination).text().not_null())
                    .col(ColumnDef::new(Urls::Slug).string_len(32).not_null())
                    .col(ColumnDef::new(Urls::OwnerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Urls::VisitCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Urls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_urls_owner_id")
                            .from(Urls::Table, Urls::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_slug")
                    .table(Urls::Table)
                    .col(Urls::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按所有者 + 创建时间列表
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_owner_created")
                    .table(Urls::Table)
                    .col(Urls::OwnerId)
                    .col(Urls::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_owner_created").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_slug").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Urls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Urls {
    #[sea_orm(iden = "urls")]
    Table,
    Id,
    Destination,
    Slug,
    OwnerId,
    VisitCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
}
