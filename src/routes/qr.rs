use axum::{body::Bytes, extract::State, Json};
use tracing::{error, warn};

use crate::{
    dto::api_dto::{GenerateQrRequest, GenerateQrResponse},
    error::{Error, Result},
    AppState,
};

/// An absent or blank body means "use the defaults"; anything else must be
/// a well-formed request object.
pub async fn generate_qr(State(state): State<AppState>, body: Bytes) -> Result<Json<GenerateQrResponse>> {
    let payload = parse_request(&body)?;
    let text = state
        .qr_service
        .resolve_target(payload.text.as_deref(), payload.channel_username.as_deref());

    let qr_code = state.qr_service.generate_data_url(&text).map_err(|e| {
        error!(error = ?e, "QR generation error");
        Error::Internal("Failed to generate QR code".into())
    })?;

    Ok(Json(GenerateQrResponse {
        success: true,
        qr_code,
        text,
    }))
}

fn parse_request(body: &[u8]) -> Result<GenerateQrRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateQrRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected generate-qr body");
        Error::BadRequest("Invalid request body".into())
    })
}
