//! Defines the endpoints for transaction receipt attachments.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    attachment::store::{delete_attachment, list_attachments, read_attachment, save_attachment},
    database_id::TransactionId,
    transaction::core::get_transaction,
};

/// A route handler for uploading attachments to a transaction.
///
/// Accepts one or more files in a multipart form; each is stored under the
/// transaction's directory with a timestamp-prefixed name.
pub async fn upload_attachment_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    mut multipart: Multipart,
) -> Result<Response, Error> {
    {
        // The store is transaction-scoped; refuse uploads for transactions
        // that do not exist.
        let connection = state.connection()?;
        get_transaction(transaction_id, &connection)?;
    }

    let mut saved = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        let original_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or(Error::MissingField("file"))?;
        let content = field
            .bytes()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;

        saved.push(save_attachment(
            &state.attachment_dir,
            transaction_id,
            &original_name,
            &content,
        )?);
    }

    if saved.is_empty() {
        return Err(Error::MissingField("file"));
    }

    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

/// A route handler for listing a transaction's attachments.
pub async fn list_attachments_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let attachments = list_attachments(&state.attachment_dir, transaction_id)?;

    Ok(Json(attachments).into_response())
}

/// A route handler for downloading one attachment.
pub async fn download_attachment_endpoint(
    State(state): State<AppState>,
    Path((transaction_id, file_name)): Path<(TransactionId, String)>,
) -> Result<Response, Error> {
    let (content, content_type) =
        read_attachment(&state.attachment_dir, transaction_id, &file_name)?;

    Ok(([(header::CONTENT_TYPE, content_type)], content).into_response())
}

/// A route handler for deleting one attachment.
pub async fn delete_attachment_endpoint(
    State(state): State<AppState>,
    Path((transaction_id, file_name)): Path<(TransactionId, String)>,
) -> Result<Response, Error> {
    delete_attachment(&state.attachment_dir, transaction_id, &file_name)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
