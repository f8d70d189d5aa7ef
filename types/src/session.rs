use jiff::Timestamp;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE_NAME: &str = "volunteer_admin_session";

/// The staff member a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "emailid")]
    pub email: String,
}

impl AdminIdentity {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string()
    }
}

/// A logged-in admin as held by the server. Never sent to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub identity: AdminIdentity,
    #[serde(with = "secret_string")]
    pub access_token: SecretString,
    pub expires_at: Timestamp,
}

impl AdminSession {
    pub fn new(identity: AdminIdentity, access_token: SecretString, expires_at: Timestamp) -> Self {
        Self {
            identity,
            access_token,
            expires_at,
        }
    }

    /// Attributed to admin-only actions as `requesterId`.
    pub fn requester_id(&self) -> &str {
        &self.identity.id
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            identity: self.identity.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// What the browser may know about its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub identity: AdminIdentity,
    pub expires_at: Timestamp,
}

mod secret_string {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use secrecy::ExposeSecret;
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn identity() -> AdminIdentity {
        AdminIdentity {
            id: "admin-1".into(),
            name: String::new(),
            email: "ops@example.org".into(),
        }
    }

    #[test]
    fn requester_is_identity_id() {
        let session = AdminSession::new(identity(), "t0k".to_string().into(), Timestamp::UNIX_EPOCH);
        assert_eq!(session.requester_id(), "admin-1");
        assert_eq!(session.identity.display_name(), "ops@example.org");
        assert_eq!(session.identity.initial(), "O");
    }

    #[test]
    fn expiry_is_inclusive() {
        let expires_at: Timestamp = "2026-01-01T00:00:00Z".parse().unwrap();
        let session = AdminSession::new(identity(), "t".to_string().into(), expires_at);

        assert!(!session.is_expired_at("2025-12-31T23:59:59Z".parse().unwrap()));
        assert!(session.is_expired_at(expires_at));
    }

    #[test]
    fn info_omits_token() {
        let session = AdminSession::new(identity(), "secret-token".to_string().into(), Timestamp::UNIX_EPOCH);
        let json = serde_json::to_string(&session.info()).unwrap();
        assert!(!json.contains("secret-token"));

        let stored = serde_json::to_string(&session).unwrap();
        let back: AdminSession = serde_json::from_str(&stored).unwrap();
        assert_eq!(back.access_token.expose_secret(), "secret-token");
    }
}
