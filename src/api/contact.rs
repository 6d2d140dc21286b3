use crate::api::AppState;
use crate::api::schemas::contact::MessageResponse;
use crate::domain::submission::ContactForm;
use crate::error::{AppError, Result};
use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};

/// Accepts a contact form submission.
///
/// The body is read as raw bytes so that a missing or malformed body is reported as missing
/// fields rather than as an extractor rejection.
///
/// # Errors
/// Returns `AppError::Validation` for incomplete forms, `AppError::Persistence` if the
/// submission cannot be saved, and `AppError::Delivery` if a storage-less deployment cannot
/// relay it.
pub async fn send(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let form = ContactForm::from_json(&body);

    state.contact_service.submit(form).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Message sent successfully!"))))
}

/// Answers every non-POST method on the submission route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
