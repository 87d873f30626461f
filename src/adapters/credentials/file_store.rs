use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::{
    domain::credential::Credential,
    ports::credential_store::{CredentialError, CredentialStore},
};

/// Credential persisted as one JSON file. Saves go through a sibling temp file
/// and a rename, so an interrupted run never leaves a truncated token behind.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "token.json".into());
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> error_stack::Result<Option<Credential>, CredentialError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No credential file");
                return Ok(None);
            }
            Err(e) => {
                return Err(report!(e))
                    .change_context(CredentialError::Unreadable)
                    .attach_printable_lazy(|| format!("Path: {}", self.path.display()))
            }
        };

        serde_json::from_str::<Credential>(&contents)
            .map(Some)
            .change_context(CredentialError::Malformed)
            .attach_printable_lazy(|| format!("Path: {}", self.path.display()))
    }

    #[instrument(skip(self, credential), fields(path = %self.path.display()))]
    fn save(&self, credential: &Credential) -> error_stack::Result<(), CredentialError> {
        let json =
            serde_json::to_string_pretty(credential).change_context(CredentialError::Persist)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .change_context(CredentialError::Persist)
                .attach_printable_lazy(|| format!("Could not create {}", parent.display()))?;
        }

        let temp_path = self.temp_path();
        let write_temp = || -> io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            restrict_permissions(&file)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()
        };

        write_temp()
            .and_then(|_| fs::rename(&temp_path, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp_path);
                report!(e)
            })
            .change_context(CredentialError::Persist)
            .attach_printable_lazy(|| format!("Path: {}", self.path.display()))?;

        tracing::debug!("Credential saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::fixtures::{credential, now};

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("token.json"));
        let cred = credential(Some(now()));

        store.save(&cred).unwrap();

        assert_eq!(store.load().unwrap(), Some(cred));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        store.save(&credential(None)).unwrap();

        let mut newer = credential(Some(now()));
        newer.access_token = "ya29.newer".to_string();
        store.save(&newer).unwrap();

        assert_eq!(store.load().unwrap().unwrap().access_token, "ya29.newer");
    }

    #[test]
    fn test_garbage_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, b"\x80\x04\x95pickle").unwrap();
        let store = FileCredentialStore::new(&path);

        let report = store.load().unwrap_err();

        assert!(matches!(
            report.current_context(),
            CredentialError::Malformed | CredentialError::Unreadable
        ));
    }

    #[test]
    fn test_json_without_token_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, r#"{"refresh_token": "1//x"}"#).unwrap();

        let report = FileCredentialStore::new(&path).load().unwrap_err();

        assert_eq!(report.current_context(), &CredentialError::Malformed);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        store.save(&credential(None)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
