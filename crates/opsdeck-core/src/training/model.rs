use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OpsdeckError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingFileKind {
    Pdf,
    Url,
}

impl fmt::Display for TrainingFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingFileKind::Pdf => f.write_str("pdf"),
            TrainingFileKind::Url => f.write_str("url"),
        }
    }
}

impl FromStr for TrainingFileKind {
    type Err = OpsdeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(TrainingFileKind::Pdf),
            "url" => Ok(TrainingFileKind::Url),
            other => Err(OpsdeckError::invalid_input(format!(
                "unknown training file type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingFile {
    pub id: String,
    pub name: String,
    /// Human-readable size such as "2.4 MB"; empty for URLs.
    pub size: String,
    #[serde(rename = "type")]
    pub kind: TrainingFileKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrainingFile {
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "type")]
    pub kind: TrainingFileKind,
}

impl NewTrainingFile {
    pub fn pdf(name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            kind: TrainingFileKind::Pdf,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            name: url.into(),
            size: String::new(),
            kind: TrainingFileKind::Url,
        }
    }

    pub(crate) fn into_file(self, id: String) -> TrainingFile {
        TrainingFile {
            id,
            name: self.name,
            size: self.size,
            kind: self.kind,
        }
    }
}
