use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tierkms_auth::Credential;

use super::types::KeyBody;
use super::CREDENTIAL_HEADER;
use crate::error::KmsError;
use crate::service::KmsService;

pub async fn handle_wrap(
    State(service): State<Arc<KmsService>>,
    Path(tier_id): Path<String>,
    body: Result<Json<KeyBody>, JsonRejection>,
) -> Result<Json<KeyBody>, KmsError> {
    let Json(body) = body.map_err(|e| KmsError::BadRequest(e.body_text()))?;
    let key = service.wrap(&tier_id, &body.key)?;
    Ok(Json(KeyBody { key }))
}

pub async fn handle_unwrap(
    State(service): State<Arc<KmsService>>,
    Path(tier_id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<KeyBody>, JsonRejection>,
) -> Result<Json<KeyBody>, KmsError> {
    let Json(body) = body.map_err(|e| KmsError::BadRequest(e.body_text()))?;
    // A header that is not valid UTF-8 cannot name a tier; treat it as absent.
    let credential = Credential::from_header(
        headers
            .get(CREDENTIAL_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let key = service.unwrap(&tier_id, &body.key, credential.as_ref())?;
    Ok(Json(KeyBody { key }))
}

pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
