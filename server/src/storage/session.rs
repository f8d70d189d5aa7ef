use jiff::{SignedDuration, Timestamp};
use secrecy::SecretString;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use types::{AdminIdentity, AdminSession, Error, Result};
use uuid::Uuid;

use crate::token::TokenSigner;

/// Server-side session table keyed by session id.
///
/// The browser only ever holds the signed id; the access token issued by the
/// volunteer API stays here.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, AdminSession>>>,
    signer: TokenSigner,
    ttl: SignedDuration,
}

impl SessionStore {
    pub fn new(signing_secret: SecretString, ttl: SignedDuration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            signer: TokenSigner::new(signing_secret),
            ttl,
        }
    }

    /// Store a new session and return its cookie token.
    ///
    /// The session lives for the configured TTL, or less when the volunteer
    /// API reports an earlier expiry for its token.
    pub async fn create(
        &self,
        identity: AdminIdentity,
        access_token: SecretString,
        remote_expiry: Option<Timestamp>,
    ) -> Result<String> {
        self.purge_expired().await;

        let now = Timestamp::now();
        let local_expiry = now.checked_add(self.ttl)?;
        let expires_at = match remote_expiry {
            Some(remote) => remote.min(local_expiry),
            None => local_expiry,
        };

        let id = Uuid::now_v7();
        let token = self.signer.sign(id)?;
        let admin = identity.id.clone();

        self.sessions
            .write()
            .await
            .insert(id, AdminSession::new(identity, access_token, expires_at));

        let active = self.active_count().await;
        tracing::info!(%admin, %expires_at, active, "session created");

        Ok(token)
    }

    /// Find a live session by cookie token. Expired sessions are dropped.
    pub async fn find_token(&self, token: &str) -> Result<AdminSession> {
        let id = self.signer.verify(token)?;

        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::unauthorized("session not found"))?;

        if session.is_expired_at(Timestamp::now()) {
            self.sessions.write().await.remove(&id);
            tracing::debug!(admin = %session.identity.id, "session expired");
            return Err(Error::unauthorized("session expired, please sign in again"));
        }

        Ok(session)
    }

    pub async fn delete_token(&self, token: &str) -> Result<()> {
        let id = self.signer.verify(token)?;
        if let Some(session) = self.sessions.write().await.remove(&id) {
            tracing::info!(admin = %session.identity.id, "session ended");
        }
        Ok(())
    }

    async fn purge_expired(&self) {
        let now = Timestamp::now();
        self.sessions
            .write()
            .await
            .retain(|_, session| !session.is_expired_at(now));
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn store() -> SessionStore {
        SessionStore::new("signing-key".to_string().into(), SignedDuration::from_hours(1))
    }

    fn identity() -> AdminIdentity {
        AdminIdentity {
            id: "admin-7".into(),
            name: "Priya".into(),
            email: "priya@example.org".into(),
        }
    }

    #[tokio::test]
    async fn created_session_is_found_by_token() {
        let store = store();
        let token = store
            .create(identity(), "remote-token".to_string().into(), None)
            .await
            .unwrap();

        let session = store.find_token(&token).await.unwrap();
        assert_eq!(session.requester_id(), "admin-7");
        assert_eq!(session.access_token.expose_secret(), "remote-token");
        assert!(session.expires_at > Timestamp::now());
    }

    #[tokio::test]
    async fn remote_expiry_caps_lifetime() {
        let store = store();
        let soon = Timestamp::now().checked_add(SignedDuration::from_mins(5)).unwrap();
        let token = store
            .create(identity(), "t".to_string().into(), Some(soon))
            .await
            .unwrap();

        assert_eq!(store.find_token(&token).await.unwrap().expires_at, soon);
    }

    #[tokio::test]
    async fn expired_session_is_unauthorized_and_removed() {
        let store = store();
        let past = Timestamp::now().checked_sub(SignedDuration::from_secs(1)).unwrap();
        let token = store
            .create(identity(), "t".to_string().into(), Some(past))
            .await
            .unwrap();

        let error = store.find_token(&token).await.unwrap_err();
        assert!(error.is_unauthorized());
        assert_eq!(store.active_count().await, 0);
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let store = store();
        let token = store
            .create(identity(), "t".to_string().into(), None)
            .await
            .unwrap();

        store.delete_token(&token).await.unwrap();
        assert!(store.find_token(&token).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn creating_purges_expired_sessions() {
        let store = store();
        let past = Timestamp::now().checked_sub(SignedDuration::from_secs(1)).unwrap();
        store
            .create(identity(), "old".to_string().into(), Some(past))
            .await
            .unwrap();
        store
            .create(identity(), "new".to_string().into(), None)
            .await
            .unwrap();

        assert_eq!(store.active_count().await, 1);
    }
}
