//! Crop disease prediction proxy.

use axum::{Json, extract::Multipart, extract::State};

use crate::error::{AppError, Result};
use crate::services::inference::Prediction;
use crate::state::AppState;

/// `POST /predict` - forwards the uploaded image to the model service.
///
/// Answers 501 when no model service is configured, so a frontend can
/// detect the feature's absence instead of timing out.
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Prediction>> {
    let inference = state
        .inference()
        .ok_or(AppError::NotConfigured("Prediction service"))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Malformed multipart body".to_owned()))?
    {
        // Take the first file field regardless of its name; clients send
        // it as either "file" or "image".
        if field.file_name().is_none() {
            continue;
        }

        let file_name = field
            .file_name()
            .unwrap_or("upload.jpg")
            .to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("image/jpeg")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::BadRequest("Could not read uploaded file".to_owned()))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_owned()));
        }

        let prediction = inference
            .predict(file_name, content_type, bytes.to_vec())
            .await?;
        return Ok(Json(prediction));
    }

    Err(AppError::BadRequest("No image file provided".to_owned()))
}
