use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entities::movie;

pub const ID_PREFIX: &str = "MOV";

/// Numeric suffix of a movie id, or `None` for anything not shaped `MOV<digits>`.
pub fn parse_sequence(id: &str) -> Option<u64> {
    let digits = id.strip_prefix(ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn format_movie_id(n: u64) -> String {
    format!("{ID_PREFIX}{n:04}")
}

/// `max(suffix) + 1` over the well-formed ids, `1` when there are none.
/// `None` once the highest suffix is `u64::MAX`.
pub fn next_from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Option<u64> {
    match ids.into_iter().filter_map(parse_sequence).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Scans the stored ids and returns the next free sequence number.
///
/// Holds no lock: callers that insert afterwards must do so on the same
/// transaction and rely on the primary key to reject a concurrent duplicate.
pub async fn next_id_number<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let ids: Vec<String> = movie::Entity::find()
        .select_only()
        .column(movie::Column::Id)
        .filter(movie::Column::Id.starts_with(ID_PREFIX))
        .into_tuple()
        .all(conn)
        .await?;

    next_from_ids(ids.iter().map(String::as_str))
        .ok_or_else(|| DbErr::Custom("movie id sequence exhausted".into()))
}
