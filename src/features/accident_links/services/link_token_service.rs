use chrono::{Duration, Utc};
use minijinja::context;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accident_links::dtos::{CreateAccidentLinkDto, IssuedLinkDto};
use crate::features::accident_links::models::{
    generate_token, hash_token, AccidentLink, BoundIdentity, LinkTokenStatus,
};
use crate::features::accident_links::stores::LinkTokenStore;
use crate::modules::messaging::{DeepLinkTransport, PhoneRule};
use crate::shared::templates::{render_template, LINK_INVITE};

/// Issues, validates and consumes accident form links
pub struct LinkTokenService {
    store: Arc<dyn LinkTokenStore>,
    transport: Arc<dyn DeepLinkTransport>,
    phone_rule: PhoneRule,
    frontend_url: String,
    ttl: Duration,
}

impl LinkTokenService {
    pub fn new(
        store: Arc<dyn LinkTokenStore>,
        transport: Arc<dyn DeepLinkTransport>,
        phone_rule: PhoneRule,
        frontend_url: impl Into<String>,
        ttl: std::time::Duration,
    ) -> Self {
        Self {
            store,
            transport,
            phone_rule,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::hours(24)),
        }
    }

    /// URL of the public accident form for a token
    pub fn form_url(&self, token: &str) -> String {
        format!(
            "{}/accident-form?token={}",
            self.frontend_url,
            urlencoding::encode(token)
        )
    }

    /// Issue a link for a client and compose the WhatsApp invite
    pub async fn issue(&self, dto: CreateAccidentLinkDto) -> Result<IssuedLinkDto> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let phone = self
            .phone_rule
            .canonicalize(&dto.phone)
            .map_err(AppError::Validation)?;

        let email = dto
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let token = generate_token();
        let form_url = self.form_url(&token);

        let message = render_template(LINK_INVITE, context! { name => &name, form_url => &form_url })?;
        let wa_link = self.transport.build_link(&phone, &message)?;

        let now = Utc::now();
        let link = AccidentLink {
            id: Uuid::now_v7(),
            token_hash: hash_token(&token),
            client_name: name,
            client_email: email,
            client_phone: phone,
            expires_at: now + self.ttl,
            consumed_at: None,
            created_at: now,
        };

        self.store.insert(&link).await?;

        info!("Issued accident link {} expiring at {}", link.id, link.expires_at);

        Ok(IssuedLinkDto {
            link_id: link.id,
            token,
            form_url,
            wa_link,
            expires_at: link.expires_at,
        })
    }

    /// Check a token without changing it
    pub async fn validate(&self, token: &str) -> Result<BoundIdentity> {
        let link = self
            .store
            .find_by_hash(&hash_token(token))
            .await?
            .ok_or_else(|| AppError::InvalidToken("Link is not recognised".to_string()))?;

        match link.status(Utc::now()) {
            LinkTokenStatus::Valid => Ok(link.identity()),
            status => {
                debug!("Rejected link {} with status {:?}", link.id, status);
                Err(rejection(status))
            }
        }
    }

    /// Mark a token as used. Only one caller can succeed for a given token.
    pub async fn consume(&self, token: &str) -> Result<BoundIdentity> {
        let token_hash = hash_token(token);

        if let Some(link) = self.store.consume(&token_hash, Utc::now()).await? {
            info!("Consumed accident link {}", link.id);
            return Ok(link.identity());
        }

        // Work out why the compare-and-set did not apply
        match self.store.find_by_hash(&token_hash).await? {
            Some(link) => match link.status(Utc::now()) {
                LinkTokenStatus::Valid => Err(rejection(LinkTokenStatus::Consumed)),
                status => Err(rejection(status)),
            },
            None => Err(AppError::InvalidToken("Link is not recognised".to_string())),
        }
    }
}

fn rejection(status: LinkTokenStatus) -> AppError {
    match status {
        LinkTokenStatus::Consumed => AppError::InvalidToken("Link has already been used".to_string()),
        LinkTokenStatus::Expired => AppError::InvalidToken("Link has expired".to_string()),
        LinkTokenStatus::Valid => AppError::InvalidToken("Link is not usable".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::accident_links::stores::InMemoryLinkTokenStore;
    use crate::modules::messaging::WhatsAppLinks;
    use crate::shared::test_helpers::{link_dto, test_link_service};

    #[tokio::test]
    async fn test_issue_returns_form_and_whatsapp_links() {
        let service = test_link_service();
        let issued = service.issue(link_dto("A", "+27821234567")).await.unwrap();

        assert_eq!(issued.token.len(), 32);
        assert_eq!(
            issued.form_url,
            format!("https://ais.example.com/accident-form?token={}", issued.token)
        );
        assert!(issued.wa_link.starts_with("https://wa.me/27821234567?text="));
        assert!(issued.wa_link.contains(&issued.token));
    }

    #[tokio::test]
    async fn test_issue_rejects_phone_outside_rule() {
        let service = test_link_service();
        let err = service
            .issue(link_dto("A", "+44 20 7946 0958"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_issue_canonicalizes_national_number() {
        let service = test_link_service();
        let issued = service.issue(link_dto("B", "071 234 5678")).await.unwrap();
        let identity = service.validate(&issued.token).await.unwrap();
        assert_eq!(identity.phone, "27712345678");
    }

    #[tokio::test]
    async fn test_validate_is_a_pure_read() {
        let service = test_link_service();
        let issued = service.issue(link_dto("A", "+27821234567")).await.unwrap();

        let first = service.validate(&issued.token).await.unwrap();
        let second = service.validate(&issued.token).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "A");
        assert_eq!(first.link_id, issued.link_id);
    }

    #[tokio::test]
    async fn test_validate_fails_after_consume() {
        let service = test_link_service();
        let issued = service.issue(link_dto("A", "+27821234567")).await.unwrap();

        service.consume(&issued.token).await.unwrap();

        for _ in 0..3 {
            let err = service.validate(&issued.token).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidToken(ref m) if m.contains("already been used")));
        }

        let err = service.consume(&issued.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_validate_unknown_token() {
        let service = test_link_service();
        let err = service.validate("0123456789abcdef0123456789abcdef").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_expired_link_is_rejected() {
        let service = LinkTokenService::new(
            Arc::new(InMemoryLinkTokenStore::new()),
            Arc::new(WhatsAppLinks::default()),
            PhoneRule::new(Some("27".to_string()), 9),
            "https://ais.example.com",
            std::time::Duration::ZERO,
        );
        let issued = service.issue(link_dto("A", "+27821234567")).await.unwrap();

        let err = service.validate(&issued.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken(ref m) if m.contains("expired")));

        let err = service.consume(&issued.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken(ref m) if m.contains("expired")));
    }
}
