//! Brief analysis handlers.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use brief_models::{BriefPackage, BriefPreferences, CreativeIntent, MediaReference};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Inbound analysis request.
#[derive(Debug, Deserialize)]
pub struct CreateBriefRequest {
    pub query: String,

    #[serde(default)]
    pub assets: Vec<MediaReference>,

    #[serde(default)]
    pub intent: CreativeIntent,

    #[serde(default)]
    pub preferences: BriefPreferences,

    /// Session key for duplicate suppression; a newer request for the
    /// same session cancels the one still in flight.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Run the full analysis pipeline and return the brief package.
///
/// Degraded analysis (some analyzers exhausted) is still a success;
/// only structural problems with the request itself are rejected.
pub async fn create_brief(
    State(state): State<AppState>,
    Json(request): Json<CreateBriefRequest>,
) -> ApiResult<Json<BriefPackage>> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    info!(
        asset_count = request.assets.len(),
        intent = %request.intent.as_str(),
        "Received brief request"
    );

    let package = state
        .engine
        .run(
            request.query,
            &request.assets,
            request.intent,
            request.preferences,
            request.session_id.as_deref(),
        )
        .await?;

    Ok(Json(package))
}
