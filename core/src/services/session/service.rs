//! Session service implementation

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use cg_shared::config::JwtConfig;

use crate::context::RequestContext;
use crate::domain::entities::session::{AccessClaims, RefreshClaims, TokenPair};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::SessionRepository;

/// Issues, validates, refreshes and revokes session credentials
///
/// Access credentials are verified by signature alone. The shared store is
/// consulted for revocation on refresh and in [`SessionService::authenticate`].
pub struct SessionService<R: SessionRepository + ?Sized> {
    repository: Arc<R>,
    config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
}

impl<R: SessionRepository + ?Sized> SessionService<R> {
    /// Creates a new session service
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::Validation)` - a secret is empty or both secrets are equal
    pub fn new(repository: Arc<R>, config: JwtConfig) -> DomainResult<Self> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(DomainError::Validation {
                message: "Credential signing secrets must not be empty".to_string(),
            });
        }
        if !config.has_distinct_secrets() {
            return Err(DomainError::Validation {
                message: "Access and refresh credentials must use distinct secrets".to_string(),
            });
        }
        if config.is_using_default_secret() {
            tracing::warn!("Session credentials are signed with a built-in default secret");
        }

        // Expiry is checked explicitly after decoding, without leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            repository,
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            config,
            validation,
        })
    }

    /// Start a new session for `user_id` on the client identified by `fingerprint`
    pub fn issue_session(&self, user_id: i64, fingerprint: &str) -> DomainResult<TokenPair> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        let access_token = self.sign_access(user_id, &session_id, fingerprint, now)?;
        let refresh_claims = RefreshClaims {
            uid: user_id,
            ssid: session_id.clone(),
            iat: now,
            exp: now + self.config.refresh_token_expiry,
            iss: self.config.issuer.clone(),
        };
        let refresh_token = self.sign(&refresh_claims, &self.refresh_encoding)?;

        tracing::info!(
            user_id = user_id,
            session_id = %session_id,
            event = "session_issued",
            "Issued session credentials"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            session_id,
            access_expires_in: self.config.access_token_expiry,
            refresh_expires_in: self.config.refresh_token_expiry,
        })
    }

    /// Verify signature, expiry and client fingerprint of an access credential
    pub fn validate_access(&self, token: &str, fingerprint: &str) -> DomainResult<AccessClaims> {
        let claims: AccessClaims = self.decode(token, &self.access_decoding, "access")?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::InvalidToken.into());
        }

        if claims.user_agent != fingerprint {
            tracing::warn!(
                user_id = claims.uid,
                session_id = %claims.ssid,
                event = "fingerprint_mismatch",
                "Access credential presented by a different client"
            );
            return Err(TokenError::FingerprintMismatch.into());
        }

        Ok(claims)
    }

    /// Whether a revocation sentinel exists for `session_id`
    pub async fn check_session_revoked(
        &self,
        ctx: &RequestContext,
        session_id: &str,
    ) -> DomainResult<bool> {
        ctx.run(self.repository.is_revoked(session_id)).await?
    }

    /// Validate an access credential and reject revoked sessions
    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        token: &str,
        fingerprint: &str,
    ) -> DomainResult<AccessClaims> {
        let claims = self.validate_access(token, fingerprint)?;
        if self.check_session_revoked(ctx, &claims.ssid).await? {
            return Err(TokenError::SessionRevoked.into());
        }
        Ok(claims)
    }

    /// Exchange a refresh credential for a new access credential
    ///
    /// The refresh credential itself is not reissued.
    pub async fn refresh(
        &self,
        ctx: &RequestContext,
        refresh_token: &str,
        fingerprint: &str,
    ) -> DomainResult<String> {
        let claims: RefreshClaims = self.decode(refresh_token, &self.refresh_decoding, "refresh")?;

        let now = Utc::now().timestamp();
        if claims.exp <= now {
            return Err(TokenError::InvalidToken.into());
        }

        if self.check_session_revoked(ctx, &claims.ssid).await? {
            tracing::warn!(
                user_id = claims.uid,
                session_id = %claims.ssid,
                event = "refresh_revoked_session",
                "Refresh attempted on a revoked session"
            );
            return Err(TokenError::SessionRevoked.into());
        }

        let access_token = self.sign_access(claims.uid, &claims.ssid, fingerprint, now)?;
        tracing::debug!(user_id = claims.uid, session_id = %claims.ssid, "Refreshed access credential");
        Ok(access_token)
    }

    /// Revoke `session_id`
    ///
    /// The sentinel outlives every refresh credential issued for the session.
    pub async fn revoke(&self, ctx: &RequestContext, session_id: &str) -> DomainResult<()> {
        let ttl = self.config.refresh_token_expiry.max(1) as u64;
        ctx.run(self.repository.mark_revoked(session_id, ttl))
            .await??;

        tracing::info!(session_id = %session_id, event = "session_revoked", "Revoked session");
        Ok(())
    }

    /// Reissue the access credential when it is about to expire
    ///
    /// Returns `None` while more than the renewal window remains.
    pub fn renew_if_expiring(&self, claims: &AccessClaims) -> DomainResult<Option<String>> {
        let now = Utc::now().timestamp();
        if claims.remaining_seconds(now) >= self.config.renew_window {
            return Ok(None);
        }
        self.sign_access(claims.uid, &claims.ssid, &claims.user_agent, now)
            .map(Some)
    }

    fn sign_access(
        &self,
        user_id: i64,
        session_id: &str,
        fingerprint: &str,
        now: i64,
    ) -> DomainResult<String> {
        let claims = AccessClaims {
            uid: user_id,
            ssid: session_id.to_string(),
            user_agent: fingerprint.to_string(),
            iat: now,
            exp: now + self.config.access_token_expiry,
            iss: self.config.issuer.clone(),
        };
        self.sign(&claims, &self.access_encoding)
    }

    fn sign<T: Serialize>(&self, claims: &T, key: &EncodingKey) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign credential");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    fn decode<T: DeserializeOwned>(
        &self,
        token: &str,
        key: &DecodingKey,
        kind: &'static str,
    ) -> Result<T, TokenError> {
        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(kind = kind, error = %e, "Rejected credential");
                TokenError::InvalidToken
            })
    }
}

/// Extract the credential from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        None
    } else {
        Some(token)
    }
}
