use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Referral,
    Social,
    Email,
    Ads,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

/// A sales lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub source: LeadSource,
    /// Qualification score, 0-100.
    pub score: u8,
    #[serde(default)]
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_lead() {
        let json = r#"{
            "id": "l1",
            "name": "Ada",
            "email": "ada@example.com",
            "source": "referral",
            "score": 72,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-02T10:00:00Z"
        }"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.source, LeadSource::Referral);
        assert_eq!(lead.status, LeadStatus::New);
        assert!(lead.phone.is_none());
        assert!(lead.updated_at > lead.created_at);
    }
}
