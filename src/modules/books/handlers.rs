//! HTTP adapters for the book catalog: decode the request, call the store,
//! translate the outcome to a status code and JSON body.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use stacks_http::error::ApiError;

use super::models::{Book, BookPatch, NewBook};
use super::store::{BookStore, StoreError};

pub type SharedStore = Arc<dyn BookStore>;

/// Routes for the books module, relative to its mount point.
pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/", post(create_book).get(list_books))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

/// Path ids must be unsigned decimal integers; anything else is a client
/// error, not a lookup miss.
fn parse_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    let id: u64 = raw
        .parse()
        .map_err(|err| ApiError::bad_request(message, format!("invalid book id '{raw}': {err}")))?;
    i64::try_from(id)
        .map_err(|_| ApiError::bad_request(message, format!("book id '{raw}' out of range")))
}

async fn create_book(
    State(store): State<SharedStore>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    const MESSAGE: &str = "Unable to add new book to library.";

    let Json(new_book) = payload.map_err(|err| ApiError::bad_request(MESSAGE, err))?;
    new_book
        .validate()
        .map_err(|err| ApiError::bad_request(MESSAGE, err))?;

    let book = store
        .create(new_book)
        .await
        .map_err(|err| ApiError::bad_request(MESSAGE, err))?;

    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    const MESSAGE: &str = "Unable to find book.";

    let id = parse_id(&id, MESSAGE)?;
    match store.get(id).await {
        Ok(book) => Ok(Json(book)),
        Err(err @ StoreError::NotFound(_)) => Err(ApiError::not_found(MESSAGE, err)),
        Err(err) => Err(ApiError::internal(MESSAGE, err)),
    }
}

async fn list_books(State(store): State<SharedStore>) -> Result<Json<Vec<Book>>, ApiError> {
    let books = store
        .list()
        .await
        .map_err(|err| ApiError::internal("Unable to fetch all books from library.", err))?;

    Ok(Json(books))
}

async fn update_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    const MESSAGE: &str = "Unable to update book.";

    let id = parse_id(&id, MESSAGE)?;
    let Json(patch) = payload.map_err(|err| ApiError::bad_request(MESSAGE, err))?;

    match store.update(id, patch).await {
        Ok(book) => Ok(Json(book)),
        Err(err @ StoreError::NotFound(_)) => {
            Err(ApiError::not_found("Unable to find book to update.", err))
        }
        Err(err) => Err(ApiError::bad_request("Failed to update book record.", err)),
    }
}

async fn delete_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    const MESSAGE: &str = "Unable to delete book.";

    let id = parse_id(&id, MESSAGE)?;
    match store.delete(id).await {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(err @ StoreError::NotFound(_)) => {
            Err(ApiError::not_found("Unable to find book to delete.", err))
        }
        Err(err) => Err(ApiError::bad_request("Failed to delete book record.", err)),
    }
}
