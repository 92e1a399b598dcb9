use std::path::Path;
use crate::config::{Config, ConfigBackend, FileBackend};
use crate::core::{GpError, Result};
use super::auth::email_from_auth;
use super::resolve;

/// One stored identity. `email` is `None` when the stored string no longer parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    raw: String,
    email: Option<String>,
}

impl CredentialRecord {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let email = email_from_auth(&raw).ok();
        Self { raw, email }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// All stored accounts plus the selected one. Every mutation is flushed to the
/// backend before returning.
pub struct CredentialStore {
    backend: Box<dyn ConfigBackend>,
    config: Config,
    records: Vec<CredentialRecord>,
}

impl CredentialStore {
    /// Read the config file at `path`; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(FileBackend::new(path.as_ref()))
    }

    pub fn load(backend: impl ConfigBackend + 'static) -> Result<Self> {
        let path = backend.path().to_path_buf();
        let contents = backend.read().map_err(|err| GpError::ConfigUnreadable {
            path: path.clone(),
            message: err.to_string(),
        })?;

        let mut config = match contents {
            Some(text) => Config::parse(&text, &path)?,
            None => Config::default(),
        };

        let records: Vec<_> = config.credentials.iter().map(|raw| CredentialRecord::new(raw.as_str())).collect();
        for (index, record) in records.iter().enumerate() {
            if record.email.is_none() {
                tracing::warn!(position = index + 1, "stored credential is not a valid auth string");
            }
        }

        if !config.selected.is_empty() && !records.iter().any(|r| r.email() == Some(config.selected.as_str())) {
            tracing::warn!(selected = %config.selected, "selected account is not stored, clearing selection");
            config.selected.clear();
        }

        Ok(Self {
            backend: Box::new(backend),
            config,
            records,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        self.backend.path()
    }

    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn selected(&self) -> Option<&CredentialRecord> {
        if self.config.selected.is_empty() {
            return None;
        }
        self.find(&self.config.selected).map(|index| &self.records[index])
    }

    /// Store a raw auth string and return its email. Re-adding an email
    /// replaces the old entry in place. The first account added becomes the
    /// selected one.
    pub fn add_credential(&mut self, raw: &str) -> Result<String> {
        let raw = raw.trim();
        let email = email_from_auth(raw)?;
        let record = CredentialRecord {
            raw: raw.to_string(),
            email: Some(email.clone()),
        };

        match self.find(&email) {
            Some(index) => {
                self.config.credentials[index] = record.raw.clone();
                self.records[index] = record;
            }
            None => {
                self.config.credentials.push(record.raw.clone());
                self.records.push(record);
            }
        }

        if self.config.selected.is_empty() {
            self.config.selected = email.clone();
        }

        self.persist()?;
        Ok(email)
    }

    pub fn remove_credential(&mut self, email: &str) -> Result<()> {
        let index = self.find(email).ok_or_else(|| GpError::NotFound(email.to_string()))?;

        self.records.remove(index);
        self.config.credentials.remove(index);
        if self.config.selected == email {
            self.config.selected.clear();
        }

        self.persist()
    }

    pub fn set_selected(&mut self, email: &str) -> Result<()> {
        self.find(email).ok_or_else(|| GpError::NotFound(email.to_string()))?;
        self.config.selected = email.to_string();
        self.persist()
    }

    /// See [`resolve::resolve_identifier`]
    pub fn resolve_identifier(&self, query: &str) -> Result<String> {
        resolve::resolve_identifier(&self.records, query)
    }

    fn find(&self, email: &str) -> Option<usize> {
        self.records.iter().position(|r| r.email() == Some(email))
    }

    fn persist(&self) -> Result<()> {
        let path = self.backend.path();
        let text = self.config.to_toml(path)?;
        self.backend.write(&text).map_err(|err| GpError::PersistFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryBackend;

    fn auth(email: &str, token: &str) -> String {
        format!("androidId=1&Email={}&Token={token}", email.replace('@', "%40"))
    }

    fn store() -> CredentialStore {
        CredentialStore::load(MemoryBackend::new()).unwrap()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = store();
        assert!(store.records().is_empty());
        assert_eq!(store.config().selected, "");
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_load_unparsable_fails() {
        let result = CredentialStore::load(MemoryBackend::with_contents("credentials = 42"));
        assert!(matches!(result, Err(GpError::ConfigUnreadable { .. })));
    }

    #[test]
    fn test_add_then_resolve() {
        let mut store = store();
        store.add_credential(&auth("alice@x.com", "1")).unwrap();
        let email = store.add_credential(&auth("bob@y.org", "2")).unwrap();

        assert_eq!(email, "bob@y.org");
        assert_eq!(store.resolve_identifier("bob@y.org").unwrap(), "bob@y.org");
        assert_eq!(store.config().selected, "alice@x.com");
    }

    #[test]
    fn test_add_existing_email_overwrites_in_place() {
        let mut store = store();
        store.add_credential(&auth("alice@x.com", "old")).unwrap();
        store.add_credential(&auth("bob@y.org", "2")).unwrap();
        store.add_credential(&auth("alice@x.com", "new")).unwrap();

        assert_eq!(store.records().len(), 2);
        assert_eq!(store.records()[0].email(), Some("alice@x.com"));
        assert!(store.records()[0].raw().ends_with("Token=new"));
        assert_eq!(store.config().credentials[0], store.records()[0].raw());
    }

    #[test]
    fn test_add_invalid_rejected_without_persisting() {
        let mut store = store();
        let err = store.add_credential("Token=abc").unwrap_err();
        assert!(matches!(err, GpError::InvalidAuthString(_)));
        assert!(store.records().is_empty());
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut store = store();
        store.add_credential(&auth("alice@x.com", "1")).unwrap();
        store.add_credential(&auth("bob@y.org", "2")).unwrap();
        store.set_selected("bob@y.org").unwrap();

        store.remove_credential("bob@y.org").unwrap();
        assert_eq!(store.config().selected, "");
        assert_eq!(store.records().len(), 1);

        store.remove_credential("alice@x.com").unwrap();
        assert!(store.config().credentials.is_empty());
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let mut store = store();
        store.add_credential(&auth("alice@x.com", "1")).unwrap();
        store.add_credential(&auth("bob@y.org", "2")).unwrap();

        store.remove_credential("bob@y.org").unwrap();
        assert_eq!(store.config().selected, "alice@x.com");
    }

    #[test]
    fn test_unknown_email_not_found() {
        let mut store = store();
        assert!(matches!(store.remove_credential("x@y.z"), Err(GpError::NotFound(_))));
        assert!(matches!(store.set_selected("x@y.z"), Err(GpError::NotFound(_))));
    }

    #[test]
    fn test_persist_failure_surfaces() {
        let mut store = CredentialStore::load(MemoryBackend::new().read_only()).unwrap();
        let err = store.add_credential(&auth("alice@x.com", "1")).unwrap_err();
        assert!(matches!(err, GpError::PersistFailed { .. }));
        // in-memory state is still updated
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn test_save_load_cycle_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpcli.config");

        let mut store = CredentialStore::open(&path).unwrap();
        store.add_credential(&auth("carol@z.net", "3")).unwrap();
        store.add_credential(&auth("alice@x.com", "1")).unwrap();
        store.set_selected("alice@x.com").unwrap();
        let saved = store.config().clone();

        let reloaded = CredentialStore::open(&path).unwrap();
        assert_eq!(reloaded.config(), &saved);
        assert_eq!(reloaded.resolve_identifier("1").unwrap(), "carol@z.net");
        assert_eq!(reloaded.selected().and_then(CredentialRecord::email), Some("alice@x.com"));
    }

    #[test]
    fn test_dangling_selection_cleared_on_load() {
        let backend = MemoryBackend::with_contents("credentials = []\nselected = \"ghost@x.com\"\n");
        let store = CredentialStore::load(backend).unwrap();
        assert_eq!(store.config().selected, "");
    }
}
