//! User lookups the digest needs: rate settings and where to send the email.

use anyhow::{Context, Result};
use gigmate_core::PartialRateSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use crate::error::{DigestError, DigestResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContact {
    pub email: String,
    pub full_name: Option<String>,
}

pub trait UserDirectory {
    /// Stored rate settings, `None` when the user never saved any.
    fn settings(
        &self,
        user_id: &str,
    ) -> impl Future<Output = DigestResult<Option<PartialRateSettings>>> + Send;

    /// Delivery address. Fails when the user is unknown or has no email.
    fn contact(&self, user_id: &str) -> impl Future<Output = DigestResult<UserContact>> + Send;
}

/// One entry of `users.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub mileage_rate_cents: Option<i64>,
    #[serde(default)]
    pub tax_rate_bps: Option<i64>,
}

impl UserRecord {
    fn rates(&self) -> Option<PartialRateSettings> {
        if self.mileage_rate_cents.is_none() && self.tax_rate_bps.is_none() {
            return None;
        }
        Some(PartialRateSettings {
            mileage_rate_cents: self.mileage_rate_cents,
            tax_rate_bps: self.tax_rate_bps,
        })
    }
}

/// Read `users.json`. A missing file means no known users.
pub fn load_users(path: impl AsRef<Path>) -> Result<Vec<UserRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}

/// Directory backed by a fixed list of users
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, UserRecord>,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for InMemoryDirectory {
    async fn settings(&self, user_id: &str) -> DigestResult<Option<PartialRateSettings>> {
        Ok(self.users.get(user_id).and_then(UserRecord::rates))
    }

    async fn contact(&self, user_id: &str) -> DigestResult<UserContact> {
        let user = self
            .users
            .get(user_id)
            .ok_or_else(|| DigestError::Directory(format!("unknown user {user_id}")))?;

        let email = user
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DigestError::MissingContact(user_id.to_string()))?;

        Ok(UserContact {
            email: email.to_string(),
            full_name: user.full_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        let json = r#"[
            { "id": "u1", "email": "ana@example.com", "full_name": "Ana Ruiz", "tax_rate_bps": 1800 },
            { "id": "u2", "email": "  " },
            { "id": "u3", "email": "kim@example.com" }
        ]"#;
        InMemoryDirectory::new(serde_json::from_str(json).unwrap())
    }

    #[tokio::test]
    async fn test_contact_lookup() {
        let dir = directory();
        let c = dir.contact("u1").await.unwrap();
        assert_eq!(c.email, "ana@example.com");
        assert_eq!(c.full_name.as_deref(), Some("Ana Ruiz"));

        assert!(matches!(dir.contact("u2").await, Err(DigestError::MissingContact(_))));
        assert!(matches!(dir.contact("nobody").await, Err(DigestError::Directory(_))));
    }

    #[tokio::test]
    async fn test_settings_are_partial() {
        let dir = directory();
        let s = dir.settings("u1").await.unwrap().unwrap();
        assert_eq!(s.mileage_rate_cents, None);
        assert_eq!(s.tax_rate_bps, Some(1800));
        assert_eq!(dir.settings("u3").await.unwrap(), None);
    }

    #[test]
    fn test_missing_users_file() {
        let users = load_users("/nonexistent/gigmate/users.json").unwrap();
        assert!(users.is_empty());
        let dir = InMemoryDirectory::new(users);
        assert!(dir.is_empty());
        assert_eq!(dir.len(), 0);
        assert_eq!(directory().len(), 3);
    }
}
