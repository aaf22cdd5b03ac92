use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "movies")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    /// `title` lowercased with Unicode rules; searched instead of `lower(title)`.
    #[serde(skip)]
    pub title_folded: String,
    pub genre: String,
    pub release_year: i32,
    pub duration_minutes: i32,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Case folding shared by stored titles and title searches.
pub fn fold_title(title: &str) -> String {
    title.to_lowercase()
}
