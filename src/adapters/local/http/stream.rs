use super::{ApiError, AppState};
use crate::domain::Asset;
use axum::extract::{Path, Request, State};
use axum::response::{IntoResponse, Response};
use std::path::{Component, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

/// `GET /stream/<asset-id>/<file>`: serve a produced HLS file unless its asset expired.
pub async fn handle(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    let relative = PathBuf::from(&path);
    if !path_is_valid(&relative) {
        return Err(ApiError::not_found());
    }
    let Some(asset_id) = relative.components().find_map(|component| match component {
        Component::Normal(name) => name.to_str(),
        _ => None,
    }) else {
        return Err(ApiError::not_found());
    };

    let key = Asset::key_for_stream(asset_id);
    if state.tracker.get(&key).is_none() {
        // Nothing will ever sweep an untracked asset, so it is not served either.
        debug!(asset = %key, "Stream request for untracked asset");
        return Err(ApiError::not_found());
    }
    if state.tracker.is_expired(&key, state.clock.now()) {
        return Err(ApiError::gone());
    }

    match ServeFile::new(state.hls_dir.join(relative))
        .oneshot(request)
        .await
    {
        Ok(response) => Ok(response.into_response()),
        Err(never) => match never {},
    }
}

/// Relative, at least `<asset-id>/<file>`, and no way out of the output root.
fn path_is_valid(path: &std::path::Path) -> bool {
    let mut depth = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth >= 2
}
