use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    response::Html,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    AppState,
    changes::MovieChanges,
    entities::movie,
    error::{AppError, AppResult},
    extract::{self, Query},
    messages,
    models::{CreatedResponse, DeletedResponse, MovieDraft, MovieUpdate, UpdatedResponse},
    query::{self, MovieQuery, SearchParams},
    uploads::{self, PendingUpload},
};

pub async fn index() -> Html<String> {
    Html(crate::templates::index_page())
}

/// `POST /create`: multipart with a `movies` JSON array and one `image` per movie.
pub async fn create(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<CreatedResponse>> {
    let mut movies_json: Option<String> = None;
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(messages::invalid_upload(e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "movies" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(messages::invalid_upload(e)))?;
                movies_json = Some(text);
            },
            "image" => {
                let original_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(messages::invalid_upload(e)))?;
                images.push(PendingUpload { field: name.clone(), original_name, bytes });
            },
            _ => {},
        }
    }

    let mut drafts: Vec<MovieDraft> = match movies_json.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(messages::invalid_movies(e)))?,
    };
    if drafts.is_empty() {
        return Err(AppError::BadRequest(messages::NO_MOVIES_PROVIDED.to_string()));
    }

    let images = uploads::pair_uploads(&drafts, images)?;

    let mut stored = Vec::with_capacity(images.len());
    for (draft, image) in drafts.iter_mut().zip(&images) {
        match state.uploads.save(image).await {
            Ok(name) => {
                draft.image_path = Some(name.clone());
                stored.push(name);
            },
            Err(err) => {
                state.uploads.discard(&stored).await;
                return Err(err.into());
            },
        }
    }

    let created = match state.movies.create_many(&drafts).await {
        Ok(created) => created,
        Err(err) => {
            state.uploads.discard(&stored).await;
            return Err(err);
        },
    };

    info!(count = created.len(), "created movies");
    Ok(Json(CreatedResponse {
        message: messages::created(created.len()),
        ids: created.into_iter().map(|m| m.id).collect(),
    }))
}

/// `GET /read`: filtered search.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<movie::Model>>> {
    let query = MovieQuery::from_params(&params);
    debug!(?query, "searching movies");

    let movies = state.movies.find(query.condition()).await?;
    if movies.is_empty() {
        return Err(AppError::NotFound(messages::NO_RESULTS.to_string()));
    }
    Ok(Json(movies))
}

#[derive(Debug, Deserialize)]
pub struct IdSearch {
    #[serde(default)]
    id: String,
}

/// `GET /read/for/update` and `GET /read/for/delete`: id substring lookup.
pub async fn find_by_id_fragment(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdSearch>,
) -> AppResult<Json<Vec<movie::Model>>> {
    let movies = state.movies.find(query::id_contains(q.id.trim())).await?;
    if movies.is_empty() {
        return Err(AppError::NotFound(messages::MOVIE_NOT_FOUND.to_string()));
    }
    Ok(Json(movies))
}

/// `PUT /update`: writes only the fields that differ from the stored record.
pub async fn update(
    State(state): State<Arc<AppState>>,
    extract::Json(update): extract::Json<MovieUpdate>,
) -> AppResult<Json<UpdatedResponse>> {
    let id = update.id.as_str();

    let existing = state
        .movies
        .find_one(movie::Column::Id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(messages::unknown_movie_id(id)))?;

    let changes = MovieChanges::between(&existing, &update);
    if changes.is_empty() {
        debug!(id, "update without changes");
        return Ok(Json(UpdatedResponse { message: messages::no_changes(id), changed: Vec::new() }));
    }

    let matched = state.movies.update_one(id, &changes).await?;
    if matched == 0 {
        return Err(AppError::NotFound(messages::unknown_movie_id(id)));
    }

    info!(id, changed = ?changes.fields(), "updated movie");
    Ok(Json(UpdatedResponse { message: messages::updated(id), changed: changes.fields() }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    id: String,
}

/// `DELETE /delete?id=`: exact id.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DeleteQuery>,
) -> AppResult<Json<DeletedResponse>> {
    let deleted = state.movies.delete_one(&q.id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(messages::NOTHING_TO_DELETE.to_string()));
    }

    info!(id = %q.id, "deleted movie");
    Ok(Json(DeletedResponse { message: messages::DELETED_ONE.to_string(), deleted }))
}

/// `DELETE /delete/all`
pub async fn delete_all(State(state): State<Arc<AppState>>) -> AppResult<Json<DeletedResponse>> {
    let deleted = state.movies.delete_all().await?;
    if deleted == 0 {
        return Err(AppError::NotFound(messages::NOTHING_TO_DELETE.to_string()));
    }

    info!(deleted, "deleted all movies");
    Ok(Json(DeletedResponse { message: messages::deleted_all(deleted), deleted }))
}
