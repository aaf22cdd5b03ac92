pub use sea_orm_migration::prelude::*;

mod m20220101_000001_create_movies;
mod m20220102_000001_add_movie_rating_index;
mod m20220103_000001_add_movie_title_folded;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_create_movies::Migration),
            Box::new(m20220102_000001_add_movie_rating_index::Migration),
            Box::new(m20220103_000001_add_movie_title_folded::Migration),
        ]
    }
}
