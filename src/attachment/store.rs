//! The on-disk attachment store.
//!
//! Each transaction gets its own directory under the configured attachment
//! root; files keep their original name behind a millisecond-timestamp
//! prefix so re-uploading the same receipt never collides.

use std::{fs, path::{Path, PathBuf}};

use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId};

/// A stored attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// The stored file name, timestamp prefix included.
    pub file_name: String,
    /// The file size in bytes.
    pub size: u64,
    /// The content type inferred from the file extension.
    pub content_type: String,
}

/// Infer a content type from the file extension.
///
/// The table is fixed; anything unknown is served as a plain download.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

fn transaction_dir(base: &Path, transaction_id: TransactionId) -> PathBuf {
    base.join(transaction_id.to_string())
}

/// Keep letters, digits, dots, dashes, and underscores; everything else
/// becomes an underscore. Strips any path components the client sent.
fn sanitize_file_name(original: &str) -> String {
    let base_name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    base_name
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_') {
                character
            } else {
                '_'
            }
        })
        .collect()
}

/// Reject names that could escape the transaction's directory.
fn validate_stored_name(file_name: &str) -> Result<(), Error> {
    if file_name.is_empty()
        || file_name.contains(['/', '\\'])
        || file_name == "."
        || file_name == ".."
    {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Persist `content` for a transaction under a collision-resistant name.
///
/// # Errors
/// Returns [Error::Io] if the directory or file cannot be written.
pub fn save_attachment(
    base: &Path,
    transaction_id: TransactionId,
    original_name: &str,
    content: &[u8],
) -> Result<Attachment, Error> {
    let directory = transaction_dir(base, transaction_id);
    fs::create_dir_all(&directory).map_err(|error| Error::Io(error.to_string()))?;

    let timestamp = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let file_name = format!("{timestamp}_{}", sanitize_file_name(original_name));

    fs::write(directory.join(&file_name), content)
        .map_err(|error| Error::Io(error.to_string()))?;

    Ok(Attachment {
        content_type: content_type_for(&file_name).to_owned(),
        size: content.len() as u64,
        file_name,
    })
}

/// List a transaction's attachments, sorted by file name (and therefore by
/// upload time, thanks to the timestamp prefix).
///
/// A transaction that never had an upload simply has no directory and lists
/// as empty.
///
/// # Errors
/// Returns [Error::Io] if the directory exists but cannot be read.
pub fn list_attachments(
    base: &Path,
    transaction_id: TransactionId,
) -> Result<Vec<Attachment>, Error> {
    let directory = transaction_dir(base, transaction_id);
    if !directory.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&directory).map_err(|error| Error::Io(error.to_string()))?;

    let mut attachments = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| Error::Io(error.to_string()))?;
        let metadata = entry
            .metadata()
            .map_err(|error| Error::Io(error.to_string()))?;
        if !metadata.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        attachments.push(Attachment {
            content_type: content_type_for(&file_name).to_owned(),
            size: metadata.len(),
            file_name,
        });
    }

    attachments.sort_by(|left, right| left.file_name.cmp(&right.file_name));

    Ok(attachments)
}

/// Read one attachment's content and content type.
///
/// # Errors
/// Returns [Error::NotFound] if the file does not exist (or the name tries
/// to leave the transaction's directory), or [Error::Io] if it cannot be
/// read.
pub fn read_attachment(
    base: &Path,
    transaction_id: TransactionId,
    file_name: &str,
) -> Result<(Vec<u8>, &'static str), Error> {
    validate_stored_name(file_name)?;

    let path = transaction_dir(base, transaction_id).join(file_name);
    match fs::read(&path) {
        Ok(content) => Ok((content, content_type_for(file_name))),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound),
        Err(error) => Err(Error::Io(error.to_string())),
    }
}

/// Delete one attachment.
///
/// # Errors
/// Returns [Error::NotFound] if the file does not exist, or [Error::Io] if
/// it cannot be removed.
pub fn delete_attachment(
    base: &Path,
    transaction_id: TransactionId,
    file_name: &str,
) -> Result<(), Error> {
    validate_stored_name(file_name)?;

    let path = transaction_dir(base, transaction_id).join(file_name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound),
        Err(error) => Err(Error::Io(error.to_string())),
    }
}

#[cfg(test)]
mod store_tests {
    use crate::Error;

    use super::{
        content_type_for, delete_attachment, list_attachments, read_attachment, save_attachment,
    };

    fn temp_base(name: &str) -> std::path::PathBuf {
        let base = std::env::temp_dir().join("anggaran_attachment_tests").join(name);
        let _ = std::fs::remove_dir_all(&base);
        base
    }

    #[test]
    fn content_types_come_from_the_fixed_table() {
        assert_eq!(content_type_for("kwitansi.pdf"), "application/pdf");
        assert_eq!(content_type_for("foto.JPG"), "image/jpeg");
        assert_eq!(content_type_for("misc.bin"), "application/octet-stream");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }

    #[test]
    fn saved_files_are_listed_and_readable() {
        let base = temp_base("save_list");

        let saved = save_attachment(&base, 7, "kwitansi.pdf", b"%PDF-").unwrap();
        assert!(saved.file_name.ends_with("_kwitansi.pdf"));
        assert_eq!(saved.content_type, "application/pdf");

        let listed = list_attachments(&base, 7).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_name, saved.file_name);
        assert_eq!(listed[0].size, 5);

        let (content, content_type) = read_attachment(&base, 7, &saved.file_name).unwrap();
        assert_eq!(content, b"%PDF-");
        assert_eq!(content_type, "application/pdf");
    }

    #[test]
    fn attachments_are_scoped_per_transaction() {
        let base = temp_base("scoped");
        save_attachment(&base, 1, "a.txt", b"a").unwrap();

        assert!(list_attachments(&base, 2).unwrap().is_empty());
    }

    #[test]
    fn client_supplied_paths_are_flattened() {
        let base = temp_base("sanitize");

        let saved = save_attachment(&base, 1, "../../etc/passwd", b"x").unwrap();

        assert!(saved.file_name.ends_with("_passwd"));
        assert!(!saved.file_name.contains('/'));
    }

    #[test]
    fn traversal_names_cannot_be_read_or_deleted() {
        let base = temp_base("traversal");

        assert_eq!(
            read_attachment(&base, 1, "../secret"),
            Err(Error::NotFound)
        );
        assert_eq!(delete_attachment(&base, 1, ".."), Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_the_file() {
        let base = temp_base("delete");
        let saved = save_attachment(&base, 3, "nota.png", b"png").unwrap();

        delete_attachment(&base, 3, &saved.file_name).unwrap();

        assert!(list_attachments(&base, 3).unwrap().is_empty());
        assert_eq!(
            delete_attachment(&base, 3, &saved.file_name),
            Err(Error::NotFound)
        );
    }
}
