use axum::Json;

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "status": "running",
        "service": "botherd",
    }))
}
