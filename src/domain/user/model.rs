use chrono::{DateTime, Utc};

/// A managed user record.
///
/// `internal_id` is the caller-supplied unique key; `consent_identifier`
/// stays `None` until the user has been registered with the consent
/// manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Storage key (UUID)
    pub id: String,
    /// Caller-supplied unique identifier
    pub internal_id: String,
    pub email: String,
    /// Remote identifier issued by the consent manager
    pub consent_identifier: Option<String>,
    /// Extra columns carried verbatim from bulk import
    pub attributes: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
