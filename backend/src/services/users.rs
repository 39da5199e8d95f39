use crate::app_state::AppState;
use crate::error::IngestError;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::record::CanonicalRecord;
use log::error;

/// HTTP handler for `GET /users`: every stored record, in insertion order.
pub async fn process(state: web::Data<AppState>) -> impl Responder {
    match list_users(&state).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => {
            error!("Could not list users: {}", e);
            e.error_response()
        }
    }
}

pub async fn list_users(state: &AppState) -> Result<Vec<CanonicalRecord>, IngestError> {
    let store = state.store.clone();
    Ok(tokio::task::spawn_blocking(move || store.list()).await??)
}
