//! Agent domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of an agent.
///
/// `Learning` and `Deploying` only appear in seeded or configured data; the
/// toggle action moves between `Online` and `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Online,
    #[default]
    Offline,
    Learning,
    Deploying,
}

impl AgentStatus {
    /// The status after a toggle. `Online` goes offline, everything else comes online.
    pub fn toggled(self) -> Self {
        match self {
            AgentStatus::Online => AgentStatus::Offline,
            AgentStatus::Offline | AgentStatus::Learning | AgentStatus::Deploying => {
                AgentStatus::Online
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Online => "online",
            AgentStatus::Offline => "offline",
            AgentStatus::Learning => "learning",
            AgentStatus::Deploying => "deploying",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An AI agent shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Store-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Role or title describing what the agent does
    #[serde(default)]
    pub role: String,
    /// Personality / tone descriptor
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub status: AgentStatus,
    /// Ordered skill labels
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Caller-supplied fields for a new agent. The id is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl NewAgent {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn into_agent(self, id: String) -> Agent {
        Agent {
            id,
            name: self.name,
            role: self.role,
            personality: self.personality,
            status: self.status,
            skills: self.skills,
        }
    }
}

/// The two agents a fresh dashboard starts with.
pub fn default_seed_agents() -> Vec<Agent> {
    vec![
        Agent {
            id: "1".to_string(),
            name: "Alpha".to_string(),
            role: "Sales Assistant".to_string(),
            personality: "Friendly and persuasive".to_string(),
            status: AgentStatus::Online,
            skills: vec!["Lead qualification".to_string(), "Follow-ups".to_string()],
        },
        Agent {
            id: "2".to_string(),
            name: "Bravo".to_string(),
            role: "Support Specialist".to_string(),
            personality: "Patient and precise".to_string(),
            status: AgentStatus::Offline,
            skills: vec!["Troubleshooting".to_string(), "Documentation".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involution_on_binary_states() {
        for status in [AgentStatus::Online, AgentStatus::Offline] {
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn test_rich_states_toggle_online() {
        assert_eq!(AgentStatus::Learning.toggled(), AgentStatus::Online);
        assert_eq!(AgentStatus::Deploying.toggled(), AgentStatus::Online);
    }

    #[test]
    fn test_seed_agents() {
        let seeds = default_seed_agents();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].name, "Alpha");
        assert_eq!(seeds[0].status, AgentStatus::Online);
        assert_eq!(seeds[1].id, "2");
        assert_eq!(seeds[1].status, AgentStatus::Offline);
    }

    #[test]
    fn test_new_agent_from_partial_json() {
        let agent: NewAgent = serde_json::from_str(r#"{"name": "Charlie"}"#).unwrap();
        assert_eq!(agent.name, "Charlie");
        assert_eq!(agent.status, AgentStatus::Offline);
        assert!(agent.skills.is_empty());
    }
}
