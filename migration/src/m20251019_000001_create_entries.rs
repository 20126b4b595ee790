use sea_orm_migration::prelude::*;

/// Entries (抽奖登记记录)
#[derive(DeriveIden)]
enum Entries {
    Table,
    Id,
    Timestamp,
    Username,
    Amount,
    Image,
    Prize,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// id 使用文本主键：允许客户端自带 id（旧数据沿用前端生成的字符串），
/// 未提供时由服务端生成 UUID v4。空字符串 id 在写入前即被拒绝。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Entries::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::Username).text().not_null())
                    .col(ColumnDef::new(Entries::Amount).text().not_null())
                    .col(
                        ColumnDef::new(Entries::Image)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Entries::Prize)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Entries::CreatedAt)
                            .timestamp_with_time_zone()
                            .null()
                            .default(Expr::cust("NOW()")),
                    )
                    .check(Expr::cust("id <> ''"))
                    .to_owned(),
            )
            .await?;

        // 列表 / 今日查询均按 timestamp 倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_entries_timestamp")
                    .table(Entries::Table)
                    .col(Entries::Timestamp)
                    .to_owned(),
            )
            .await?;

        // 后台按金额筛选
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_entries_amount")
                    .table(Entries::Table)
                    .col(Entries::Amount)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Entries::Table).to_owned())
            .await?;

        Ok(())
    }
}
