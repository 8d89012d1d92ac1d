use bytes::Bytes;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::error::{BotError, BotResult};
use super::record::{BotRecord, derive_bot_id, file_type_of};
use super::store::RecordStore;

pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Raw upload fields. Any of them may be missing; validation happens in the handler.
#[derive(Default)]
pub struct UploadRequest {
    pub owner: Option<String>,
    pub name: Option<String>,
    pub file: Option<UploadedFile>,
}

/// Stores uploaded scripts under `<uploads>/<owner>/` and creates their records.
pub struct UploadHandler {
    store: Arc<RecordStore>,
    uploads_dir: PathBuf,
}

impl UploadHandler {
    pub fn new(store: Arc<RecordStore>, uploads_dir: PathBuf) -> Self {
        Self { store, uploads_dir }
    }

    pub async fn upload(&self, request: UploadRequest) -> BotResult<String> {
        let owner = non_blank(request.owner);
        let name = non_blank(request.name);
        let (Some(owner), Some(name), Some(file)) = (owner, name, request.file) else {
            return Err(BotError::Validation(
                "username, bot_name and bot_file are required".to_string(),
            ));
        };
        ensure_path_safe("username", &owner)?;
        ensure_path_safe("bot_name", &name)?;

        let created_at = Utc::now();
        let bot_id = derive_bot_id(&owner, &name, created_at);
        let file_type = file_type_of(&file.file_name);

        let owner_dir = self.uploads_dir.join(&owner);
        tokio::fs::create_dir_all(&owner_dir).await?;
        let stored_name = if file_type.is_empty() {
            bot_id.clone()
        } else {
            format!("{}.{}", bot_id, file_type)
        };
        let file_path = owner_dir.join(stored_name);
        tokio::fs::write(&file_path, &file.bytes).await?;

        let record = BotRecord::new(
            bot_id.clone(),
            name,
            owner,
            file_path,
            file_type,
            created_at,
        );

        let _txn = self.store.lock().await;
        let mut records = self.store.load().await?;
        records.insert(bot_id.clone(), record);
        self.store.save(&records).await?;

        info!(
            bot = %bot_id,
            "Stored uploaded bot ({} bytes from '{}')",
            file.bytes.len(),
            file.file_name
        );
        Ok(bot_id)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Owner and name end up in directory and file names.
fn ensure_path_safe(field: &str, value: &str) -> BotResult<()> {
    if value == "." || value == ".." || value.contains(['/', '\\']) || value.contains('\0') {
        return Err(BotError::Validation(format!(
            "{} must not contain path separators",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bots::record::BotStatus;

    async fn handler(tmp: &tempfile::TempDir) -> (UploadHandler, Arc<RecordStore>) {
        let store = Arc::new(
            RecordStore::open(tmp.path().join("bots.json"))
                .await
                .unwrap(),
        );
        (
            UploadHandler::new(store.clone(), tmp.path().join("uploads")),
            store,
        )
    }

    fn request(owner: &str, name: &str, file_name: &str) -> UploadRequest {
        UploadRequest {
            owner: Some(owner.to_string()),
            name: Some(name.to_string()),
            file: Some(UploadedFile {
                file_name: file_name.to_string(),
                bytes: Bytes::from_static(b"print('hi')\n"),
            }),
        }
    }

    #[tokio::test]
    async fn upload_stores_file_and_creates_stopped_record() {
        let tmp = tempfile::tempdir().unwrap();
        let (handler, store) = handler(&tmp).await;

        let id = handler
            .upload(request("alice", "echoBot", "echo.py"))
            .await
            .unwrap();
        assert!(id.starts_with("alice_echoBot_"));
        let suffix = id.trim_start_matches("alice_echoBot_");
        assert!(!suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()));

        let records = store.load().await.unwrap();
        let record = &records[&id];
        assert_eq!(record.status, BotStatus::Stopped);
        assert_eq!(record.file_type, "py");
        assert_eq!(record.owner, "alice");
        assert_eq!(
            record.file_path,
            tmp.path().join("uploads").join("alice").join(format!("{id}.py"))
        );
        assert_eq!(
            std::fs::read_to_string(&record.file_path).unwrap(),
            "print('hi')\n"
        );
    }

    #[tokio::test]
    async fn whitespace_in_name_never_reaches_the_id() {
        let tmp = tempfile::tempdir().unwrap();
        let (handler, _) = handler(&tmp).await;

        let id = handler
            .upload(request("alice", "echo   bot", "run.js"))
            .await
            .unwrap();
        assert!(id.starts_with("alice_echo_bot_"));
        assert!(!id.chars().any(char::is_whitespace));
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let (handler, store) = handler(&tmp).await;

        let mut no_file = request("alice", "bot", "a.py");
        no_file.file = None;
        let blank_owner = request("   ", "bot", "a.py");

        for req in [no_file, blank_owner, UploadRequest::default()] {
            let err = handler.upload(req).await.unwrap_err();
            assert!(matches!(err, BotError::Validation(_)));
        }
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn path_like_owner_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let (handler, _) = handler(&tmp).await;

        for owner in ["..", "a/b", "a\\b"] {
            let err = handler
                .upload(request(owner, "bot", "a.py"))
                .await
                .unwrap_err();
            assert!(matches!(err, BotError::Validation(_)), "owner {owner}");
        }
    }

    #[tokio::test]
    async fn extensionless_upload_keeps_bare_id_name() {
        let tmp = tempfile::tempdir().unwrap();
        let (handler, store) = handler(&tmp).await;

        let id = handler.upload(request("bob", "tool", "runme")).await.unwrap();
        let record = &store.load().await.unwrap()[&id];
        assert_eq!(record.file_type, "");
        assert_eq!(record.file_path.file_name().unwrap(), id.as_str());
    }
}
