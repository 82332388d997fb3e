//! Local account backend
//!
//! Records registration details in the profile store and keeps an audit
//! trail of account changes.

use super::{Account, ProfileStore, RegistrationForm, UserProfile};
use crate::audit;
use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct LocalAccount {
    profile: Arc<dyn ProfileStore>,
    audit_log: Option<PathBuf>,
}

impl LocalAccount {
    pub fn new(profile: Arc<dyn ProfileStore>) -> Self {
        Self {
            profile,
            audit_log: None,
        }
    }

    /// Append account changes to this file
    pub fn with_audit_log(mut self, path: PathBuf) -> Self {
        self.audit_log = Some(path);
        self
    }

    fn audit(&self, entry: &str) {
        if let Some(path) = &self.audit_log {
            if let Err(e) = audit::log(path, entry) {
                warn!("⚠️ Failed to write audit log: {}", e);
            }
        }
    }
}

#[async_trait]
impl Account for LocalAccount {
    async fn register(&self, form: &RegistrationForm) -> VoiceResult<()> {
        if !form.email.contains('@') {
            return Err(VoiceError::collaborator(
                "account",
                format!("'{}' is not a valid email address", form.email),
            ));
        }
        if form.password.chars().count() < 6 {
            return Err(VoiceError::collaborator(
                "account",
                "password must be at least 6 characters",
            ));
        }

        self.profile.update(&mut |p: &mut UserProfile| {
            p.fullname = form.full_name.clone();
            p.email = form.email.clone();
            p.emergency_email = form.emergency_email.clone();
            p.signed_in = true;
        })?;
        info!("👤 Registered {}", form.email);
        self.audit(&format!("REGISTER {}", form.email));
        Ok(())
    }

    async fn log_out(&self) -> VoiceResult<()> {
        let profile = self.profile.update(&mut |p: &mut UserProfile| p.signed_in = false)?;
        info!("👋 Logged out {}", profile.email);
        self.audit(&format!("LOG_OUT {}", profile.email));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::JsonProfileStore;

    fn form() -> RegistrationForm {
        RegistrationForm {
            full_name: "jane doe".into(),
            email: "jane@mail.com".into(),
            password: "secret1".into(),
            emergency_email: "mum@mail.com".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_log_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonProfileStore::new(dir.path().join("profile.json")));
        let audit_path = dir.path().join("audit.log");
        let account = LocalAccount::new(store.clone()).with_audit_log(audit_path.clone());

        account.register(&form()).await.unwrap();
        let profile = store.load().unwrap();
        assert!(profile.signed_in);
        assert_eq!(profile.emergency_email, "mum@mail.com");

        account.log_out().await.unwrap();
        assert!(!store.load().unwrap().signed_in);

        let audit = std::fs::read_to_string(audit_path).unwrap();
        assert!(audit.contains("REGISTER jane@mail.com"));
        assert!(audit.contains("LOG_OUT jane@mail.com"));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonProfileStore::new(dir.path().join("profile.json")));
        let account = LocalAccount::new(store);
        let mut bad = form();
        bad.email = "janemail.com".into();
        assert!(matches!(
            account.register(&bad).await,
            Err(VoiceError::Collaborator { .. })
        ));
    }
}
