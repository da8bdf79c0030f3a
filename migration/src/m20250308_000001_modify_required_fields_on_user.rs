use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 需要强制非空的用户字段
const REQUIRED_COLUMNS: [Users; 4] = [
    Users::FirstName,
    Users::LastName,
    Users::Email,
    Users::PasswordHash,
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 旧数据的姓名可能为空，先回填空字符串
        for column in [Users::FirstName, Users::LastName] {
            let backfill = Query::update()
                .table(Users::Table)
                .value(column, "")
                .and_where(Expr::col(column).is_null())
                .to_owned();
            manager.exec_stmt(backfill).await?;
        }

        // SQLite 不支持 ALTER COLUMN，非空约束由实体层保证
        if manager.get_database_backend() == DatabaseBackend::Sqlite {
            return Ok(());
        }

        for column in REQUIRED_COLUMNS {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .modify_column(ColumnDef::new(column).string().not_null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() == DatabaseBackend::Sqlite {
            return Ok(());
        }

        for column in REQUIRED_COLUMNS.into_iter().rev() {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .modify_column(ColumnDef::new(column).string().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    FirstName,
    LastName,
    Email,
    PasswordHash,
}
