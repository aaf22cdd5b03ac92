use sea_orm_migration::{prelude::*, schema::*, sea_orm::ConnectionTrait};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Movies::Table)
                    .add_column(string(Movies::TitleFolded).default(""))
                    .to_owned(),
            )
            .await?;

        // SQLite's lower() only folds ASCII, so existing rows are folded here.
        let db = manager.get_connection();
        let backend = manager.get_database_backend();
        let select =
            Query::select().columns([Movies::Id, Movies::Title]).from(Movies::Table).to_owned();
        for row in db.query_all(backend.build(&select)).await? {
            let id: String = row.try_get("", "id")?;
            let title: String = row.try_get("", "title")?;
            let update = Query::update()
                .table(Movies::Table)
                .value(Movies::TitleFolded, title.to_lowercase())
                .and_where(Expr::col(Movies::Id).eq(id))
                .to_owned();
            db.execute(backend.build(&update)).await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_title_folded")
                    .table(Movies::Table)
                    .col(Movies::TitleFolded)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_movies_title_folded").table(Movies::Table).to_owned())
            .await?;
        manager
            .alter_table(Table::alter().table(Movies::Table).drop_column(Movies::TitleFolded).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    TitleFolded,
}
