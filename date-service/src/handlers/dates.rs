use crate::dates::denormalize;
use crate::dtos::{DateRecordResponse, SubmitDateForm};
use crate::errors::RecordError;
use crate::startup::AppState;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::IntoResponse,
    Form,
};
use service_core::error::AppError;

pub async fn submit_date(
    State(state): State<AppState>,
    form: Result<Form<SubmitDateForm>, FormRejection>,
) -> Result<impl IntoResponse, AppError> {
    // A body that is not a readable form carries no date, which is a validation failure.
    let input = match form {
        Ok(Form(form)) => form.date.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable submit-date body");
            String::new()
        }
    };
    let record = state.records.create(&input).await?;

    let body = serde_json::to_string(&DateRecordResponse::from(record)).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to serialize record: {}", e))
    })?;

    Ok(format!("Date stored successfully: {}", body))
}

pub async fn get_date(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .records
        .fetch(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Item not found.")))?;

    let formatted = denormalize(&record.stored_date).map_err(RecordError::from)?;

    Ok(format!("Date for ID {}: {}", id, formatted))
}

pub async fn test_page() -> &'static str {
    "Hello, this is a test!"
}
