use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};

use super::super::AppState;
use crate::core::bots::{BotError, UploadRequest, UploadedFile};

type ApiResult = Result<Json<serde_json::Value>, BotError>;

pub async fn list_bots_endpoint(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> ApiResult {
    let bots = state.controller.list_for_owner(&username).await?;
    Ok(Json(serde_json::json!({ "success": true, "bots": bots })))
}

pub async fn upload_bot_endpoint(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let mut multipart =
        multipart.map_err(|e| BotError::Validation(format!("Invalid upload: {}", e.body_text())))?;

    let mut request = UploadRequest::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("username") => request.owner = Some(field.text().await.map_err(invalid_upload)?),
            Some("bot_name") => request.name = Some(field.text().await.map_err(invalid_upload)?),
            Some("bot_file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid_upload)?;
                request.file = Some(UploadedFile { file_name, bytes });
            }
            _ => {}
        }
    }

    let bot_id = state.uploads.upload(request).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Bot uploaded successfully",
        "bot_id": bot_id,
    })))
}

fn invalid_upload(e: MultipartError) -> BotError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return BotError::TooLarge(format!("Upload too large: {}", e.body_text()));
    }
    BotError::Validation(format!("Invalid upload: {}", e.body_text()))
}

pub async fn start_bot_endpoint(
    Path(bot_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult {
    state.controller.start(&bot_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Bot {} started", bot_id),
    })))
}

pub async fn stop_bot_endpoint(
    Path(bot_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult {
    state.controller.stop(&bot_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Bot {} stopped", bot_id),
    })))
}

pub async fn delete_bot_endpoint(
    Path(bot_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult {
    state.controller.delete(&bot_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Bot {} deleted", bot_id),
    })))
}

pub async fn bot_logs_endpoint(
    Path(bot_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult {
    let logs = state.controller.logs(&bot_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "logs": logs })))
}

pub async fn bot_status_endpoint(
    Path(bot_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult {
    let report = state.controller.status(&bot_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "status": report.status,
        "cpu": report.cpu,
        "memory": report.memory,
    })))
}
