use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for an issued accident form link
#[derive(Debug, Clone, FromRow)]
pub struct AccidentLink {
    pub id: Uuid,
    pub token_hash: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkTokenStatus {
    Valid,
    Consumed,
    Expired,
}

/// Client identity a link was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundIdentity {
    pub link_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
}

impl AccidentLink {
    /// Consumption wins over expiry so a used link reports as used
    pub fn status(&self, now: DateTime<Utc>) -> LinkTokenStatus {
        if self.consumed_at.is_some() {
            LinkTokenStatus::Consumed
        } else if now >= self.expires_at {
            LinkTokenStatus::Expired
        } else {
            LinkTokenStatus::Valid
        }
    }

    pub fn identity(&self) -> BoundIdentity {
        BoundIdentity {
            link_id: self.id,
            name: self.client_name.clone(),
            email: self.client_email.clone(),
            phone: self.client_phone.clone(),
        }
    }
}

/// New opaque link token (32 lowercase hex chars)
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Hash under which a token is stored and looked up
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_in: Duration, consumed: bool) -> AccidentLink {
        let now = Utc::now();
        AccidentLink {
            id: Uuid::now_v7(),
            token_hash: hash_token("t"),
            client_name: "A".to_string(),
            client_email: None,
            client_phone: "27821234567".to_string(),
            expires_at: now + expires_in,
            consumed_at: consumed.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn test_status() {
        let now = Utc::now();
        assert_eq!(link(Duration::hours(1), false).status(now), LinkTokenStatus::Valid);
        assert_eq!(link(Duration::hours(-1), false).status(now), LinkTokenStatus::Expired);
        assert_eq!(link(Duration::hours(1), true).status(now), LinkTokenStatus::Consumed);
        assert_eq!(link(Duration::hours(-1), true).status(now), LinkTokenStatus::Consumed);
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token(" abc "));
        assert_ne!(hash, hash_token("abd"));
    }
}
