use std::collections::BTreeMap;

use sea_orm::Value;
use serde::Serialize;

use crate::{entities::movie, models::MovieUpdate};

/// Fields a client may change after creation. `id` and `imagePath` are fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MovieField {
    Title,
    Genre,
    ReleaseYear,
    DurationMinutes,
    Rating,
}

impl MovieField {
    pub const MUTABLE: [MovieField; 5] = [
        MovieField::Title,
        MovieField::Genre,
        MovieField::ReleaseYear,
        MovieField::DurationMinutes,
        MovieField::Rating,
    ];

    pub fn column(self) -> movie::Column {
        match self {
            MovieField::Title => movie::Column::Title,
            MovieField::Genre => movie::Column::Genre,
            MovieField::ReleaseYear => movie::Column::ReleaseYear,
            MovieField::DurationMinutes => movie::Column::DurationMinutes,
            MovieField::Rating => movie::Column::Rating,
        }
    }

    fn stored(self, model: &movie::Model) -> Value {
        match self {
            MovieField::Title => model.title.clone().into(),
            MovieField::Genre => model.genre.clone().into(),
            MovieField::ReleaseYear => model.release_year.into(),
            MovieField::DurationMinutes => model.duration_minutes.into(),
            MovieField::Rating => model.rating.into(),
        }
    }

    fn incoming(self, update: &MovieUpdate) -> Option<Value> {
        match self {
            MovieField::Title => update.title.clone().map(Value::from),
            MovieField::Genre => update.genre.clone().map(Value::from),
            MovieField::ReleaseYear => update.release_year.map(Value::from),
            MovieField::DurationMinutes => update.duration_minutes.map(Value::from),
            MovieField::Rating => update.rating.map(Value::from),
        }
    }
}

/// Partial update: only the fields whose incoming value differs from storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieChanges {
    changes: BTreeMap<MovieField, Value>,
}

impl MovieChanges {
    pub fn between(stored: &movie::Model, update: &MovieUpdate) -> Self {
        let changes = MovieField::MUTABLE
            .into_iter()
            .filter_map(|field| {
                let new = field.incoming(update)?;
                (new != field.stored(stored)).then_some((field, new))
            })
            .collect();

        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn fields(&self) -> Vec<MovieField> {
        self.changes.keys().copied().collect()
    }

    /// The new title, when the title is among the changes.
    pub fn title(&self) -> Option<&str> {
        match self.changes.get(&MovieField::Title) {
            Some(Value::String(Some(title))) => Some(title.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MovieField, &Value)> {
        self.changes.iter().map(|(field, value)| (*field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> movie::Model {
        movie::Model {
            id: "MOV0001".into(),
            title: "Inception".into(),
            title_folded: "inception".into(),
            genre: "Sci-Fi".into(),
            release_year: 2010,
            duration_minutes: 148,
            rating: 8.8,
            image_path: Some("image-1-abc-inception.jpg".into()),
        }
    }

    fn full_update(model: &movie::Model) -> MovieUpdate {
        MovieUpdate {
            id: model.id.clone(),
            title: Some(model.title.clone()),
            genre: Some(model.genre.clone()),
            release_year: Some(model.release_year),
            duration_minutes: Some(model.duration_minutes),
            rating: Some(model.rating),
        }
    }

    #[test]
    fn identical_payload_has_no_changes() {
        let model = stored();
        assert!(MovieChanges::between(&model, &full_update(&model)).is_empty());
    }

    #[test]
    fn only_differing_fields_are_kept() {
        let model = stored();
        let update = MovieUpdate { rating: Some(9.1), ..full_update(&model) };
        let changes = MovieChanges::between(&model, &update);

        assert_eq!(changes.fields(), vec![MovieField::Rating]);
        let (field, value) = changes.iter().next().unwrap();
        assert_eq!(field, MovieField::Rating);
        assert_eq!(value, &Value::from(9.1));
        assert_eq!(changes.title(), None);
    }

    #[test]
    fn changed_title_is_exposed_for_folding() {
        let model = stored();
        let update = MovieUpdate { title: Some("Đất Rừng".into()), ..full_update(&model) };
        assert_eq!(MovieChanges::between(&model, &update).title(), Some("Đất Rừng"));
    }

    #[test]
    fn absent_fields_are_not_changes() {
        let model = stored();
        let update = MovieUpdate {
            id: model.id.clone(),
            genre: Some("Thriller".into()),
            ..Default::default()
        };
        assert_eq!(MovieChanges::between(&model, &update).fields(), vec![MovieField::Genre]);
    }

    #[test]
    fn fields_serialize_with_their_json_names() {
        let json = serde_json::to_string(&MovieField::MUTABLE).unwrap();
        assert_eq!(json, r#"["title","genre","releaseYear","durationMinutes","rating"]"#);
    }
}
