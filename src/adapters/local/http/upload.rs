use super::{ApiError, AppState};
use crate::application::{UploadError, UploadReceipt};
use crate::domain::{Asset, AssetError};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;

/// `POST /upload`: store the `file` part and answer with where it will be streamed from.
pub async fn handle(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadReceipt>, ApiError> {
    // Not a multipart body at all: same answer as a form without a file.
    let Ok(mut multipart) = multipart else {
        return Err(AssetError::NoFile.into());
    };

    while let Some(field) = multipart.next_field().await.map_err(UploadError::from)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let asset = Asset::from_upload_name(&file_name)?;
        let receipt = state.uploads.accept(asset, field).await?;
        return Ok(Json(receipt));
    }

    Err(AssetError::NoFile.into())
}
