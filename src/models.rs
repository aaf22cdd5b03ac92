use serde::{Deserialize, Serialize};

use crate::{changes::MovieField, entities::movie};

/// One entry of the `movies` array posted to `/create`.
///
/// Ids are never taken from the client; the allocator assigns them.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDraft {
    pub title: String,
    pub genre: String,
    #[serde(deserialize_with = "lenient::int")]
    pub release_year: i32,
    #[serde(deserialize_with = "lenient::int")]
    pub duration_minutes: i32,
    #[serde(deserialize_with = "lenient::float")]
    pub rating: f64,
    /// Original filename of the upload that belongs to this movie.
    #[serde(default)]
    pub image_key: Option<String>,
    #[serde(skip)]
    pub image_path: Option<String>,
}

impl MovieDraft {
    pub fn into_model(self, id: String) -> movie::Model {
        movie::Model {
            id,
            title_folded: movie::fold_title(&self.title),
            title: self.title,
            genre: self.genre,
            release_year: self.release_year,
            duration_minutes: self.duration_minutes,
            rating: self.rating,
            image_path: self.image_path,
        }
    }
}

/// Body of `PUT /update`. Absent fields are left as stored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieUpdate {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub release_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub duration_minutes: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub message: String,
    pub changed: Vec<MovieField>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    pub deleted: u64,
}

/// Browser forms post numbers as strings; accept either.
mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Num(f64),
        Text(String),
    }

    impl Number {
        fn to_f64(&self) -> Option<f64> {
            match self {
                Number::Num(n) => Some(*n),
                Number::Text(s) => s.trim().parse().ok(),
            }
            .filter(|n: &f64| n.is_finite())
        }

        fn to_i32(&self) -> Option<i32> {
            let n = self.to_f64()?;
            (n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64).then_some(n as i32)
        }
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
        let raw = Number::deserialize(d)?;
        raw.to_i32().ok_or_else(|| D::Error::custom("expected a whole number"))
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let raw = Number::deserialize(d)?;
        raw.to_f64().ok_or_else(|| D::Error::custom("expected a number"))
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        match Option::<Number>::deserialize(d)? {
            None => Ok(None),
            Some(raw) => raw.to_i32().map(Some).ok_or_else(|| D::Error::custom("expected a whole number")),
        }
    }

    pub fn opt_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Number>::deserialize(d)? {
            None => Ok(None),
            Some(raw) => raw.to_f64().map(Some).ok_or_else(|| D::Error::custom("expected a number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_accepts_numeric_strings() {
        let draft: MovieDraft = serde_json::from_str(
            r#"{"title":"Mắt Biếc","genre":"Drama","releaseYear":"2019","durationMinutes":117,"rating":"7.5"}"#,
        )
        .unwrap();
        assert_eq!(draft.release_year, 2019);
        assert_eq!(draft.duration_minutes, 117);
        assert_eq!(draft.rating, 7.5);
        assert!(draft.image_key.is_none());
    }

    #[test]
    fn draft_ignores_client_ids_and_image_paths() {
        let draft: MovieDraft = serde_json::from_str(
            r#"{"id":"MOV9999","imagePath":"x.png","title":"A","genre":"B","releaseYear":2000,"durationMinutes":90,"rating":5}"#,
        )
        .unwrap();
        assert!(draft.image_path.is_none());
        assert_eq!(draft.into_model("MOV0001".into()).id, "MOV0001");
    }

    #[test]
    fn draft_rejects_fractional_year() {
        let res: Result<MovieDraft, _> = serde_json::from_str(
            r#"{"title":"A","genre":"B","releaseYear":2000.5,"durationMinutes":90,"rating":5}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn update_leaves_missing_fields_empty() {
        let update: MovieUpdate =
            serde_json::from_str(r#"{"id":"MOV0001","rating":8.1,"genre":null}"#).unwrap();
        assert_eq!(update.rating, Some(8.1));
        assert!(update.genre.is_none());
        assert!(update.title.is_none());
        assert!(update.release_year.is_none());
    }
}
