//! Integration test of the login flow through the public API:
//! code delivery, verification, session issue, refresh and logout.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use cg_core::{
        CodeError, CodeRecord, CodeService, CodeServiceConfig, CodeStore, DomainError,
        RequestContext, SessionRepository, SessionService, SmsError, SmsSender, TemplateArg,
        TokenError, VerifyOutcome,
    };
    use cg_shared::config::JwtConfig;

    // Store keeping records in a map
    #[derive(Default)]
    struct MapCodeStore {
        records: RwLock<HashMap<(String, String), CodeRecord>>,
    }

    #[async_trait]
    impl CodeStore for MapCodeStore {
        async fn store(&self, scope: &str, recipient: &str, code: &str) -> Result<(), CodeError> {
            let mut records = self.records.write().await;
            let key = (scope.to_string(), recipient.to_string());
            if records.contains_key(&key) {
                return Err(CodeError::SendTooFrequent);
            }
            records.insert(key, CodeRecord::new(code));
            Ok(())
        }

        async fn verify(
            &self,
            scope: &str,
            recipient: &str,
            input: &str,
        ) -> Result<VerifyOutcome, CodeError> {
            let mut records = self.records.write().await;
            let key = (scope.to_string(), recipient.to_string());
            let record = records.get_mut(&key).ok_or(CodeError::NotFound)?;
            let outcome = record.try_verify(input)?;
            if outcome.is_matched() {
                records.remove(&key);
            }
            Ok(outcome)
        }
    }

    // Sender remembering the last delivered arguments
    #[derive(Default)]
    struct Inbox {
        last: RwLock<Option<(String, Vec<TemplateArg>)>>,
    }

    #[async_trait]
    impl SmsSender for Inbox {
        async fn send(
            &self,
            _ctx: &RequestContext,
            template_id: &str,
            args: &[TemplateArg],
            _recipients: &[String],
        ) -> Result<(), SmsError> {
            *self.last.write().await = Some((template_id.to_string(), args.to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct SetSessionRepository {
        revoked: RwLock<HashSet<String>>,
    }

    #[async_trait]
    impl SessionRepository for SetSessionRepository {
        async fn mark_revoked(&self, session_id: &str, _ttl: u64) -> Result<(), DomainError> {
            self.revoked.write().await.insert(session_id.to_string());
            Ok(())
        }

        async fn is_revoked(&self, session_id: &str) -> Result<bool, DomainError> {
            Ok(self.revoked.read().await.contains(session_id))
        }
    }

    #[tokio::test]
    async fn test_complete_login_flow() {
        let ctx = RequestContext::background();
        let inbox = Arc::new(Inbox::default());
        let codes = CodeService::new(
            Arc::new(MapCodeStore::default()),
            inbox.clone(),
            CodeServiceConfig::default(),
        );
        let sessions = SessionService::new(
            Arc::new(SetSessionRepository::default()),
            JwtConfig::new("flow-access", "flow-refresh"),
        )
        .unwrap();

        codes.send(&ctx, "login", "+15550001").await.unwrap();
        let (template_id, args) = inbox.last.read().await.clone().unwrap();
        assert_eq!(template_id, "verify_code");
        let code = args[0].value.clone();

        assert_eq!(
            codes.verify(&ctx, "login", "+15550001", &code).await.unwrap(),
            VerifyOutcome::Matched
        );
        assert_eq!(
            codes.verify(&ctx, "login", "+15550001", &code).await,
            Err(DomainError::Code(CodeError::NotFound))
        );

        let pair = sessions.issue_session(1001, "app/1.0").unwrap();
        let claims = sessions
            .authenticate(&ctx, &pair.access_token, "app/1.0")
            .await
            .unwrap();
        assert_eq!(claims.uid, 1001);

        let access = sessions.refresh(&ctx, &pair.refresh_token, "app/1.0").await.unwrap();
        assert!(sessions.validate_access(&access, "app/1.0").is_ok());

        sessions.revoke(&ctx, &pair.session_id).await.unwrap();
        assert_eq!(
            sessions.refresh(&ctx, &pair.refresh_token, "app/1.0").await,
            Err(DomainError::Token(TokenError::SessionRevoked))
        );
    }
}
