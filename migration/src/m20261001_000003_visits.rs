//! 访问记录表迁移
//!
//! 每次重定向写入一行，随 urls 级联删除。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Visits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Visits::UrlId).big_integer().not_null())
                    .col(ColumnDef::new(Visits::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(Visits::UserAgent).string_len(255).null())
                    .col(ColumnDef::new(Visits::Referer).string_len(2048).null())
                    .col(
                        ColumnDef::new(Visits::VisitedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_visits_url_id")
                            .from(Visits::Table, Visits::UrlId)
                            .to(Urls::Table, Urls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 单链接时间序列查询（统计 + 历史分页）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visits_url_time")
                    .table(Visits::Table)
                    .col(Visits::UrlId)
                    .col(Visits::VisitedAt)
                    .to_owned(),
            )
            .await?;

        // 全局访问视图按时间倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visits_visited_at")
                    .table(Visits::Table)
                    .col(Visits::VisitedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_visits_visited_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_visits_url_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Visits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Visits {
    #[sea_orm(iden = "visits")]
    Table,
    Id,
    UrlId,
    IpAddress,
    UserAgent,
    Referer,
    VisitedAt,
}

#[derive(DeriveIden)]
enum Urls {
    #[sea_orm(iden = "urls")]
    Table,
    Id,
}
