use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized projection of one scorer result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub email: String,
    /// Always finite; 0 when the scorer gave nothing usable.
    pub score: f64,
}

/// Per-resume record within a batch. One failure never aborts its siblings.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResumeOutcome {
    Scored {
        index: usize,
        success: bool,
        data: Value,
    },
    Failed {
        index: usize,
        success: bool,
        error: String,
    },
}

impl ResumeOutcome {
    pub fn scored(index: usize, data: Value) -> Self {
        ResumeOutcome::Scored {
            index,
            success: true,
            data,
        }
    }

    pub fn failed(index: usize, error: impl Into<String>) -> Self {
        ResumeOutcome::Failed {
            index,
            success: false,
            error: error.into(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ResumeOutcome::Scored { index, .. } | ResumeOutcome::Failed { index, .. } => *index,
        }
    }

    /// The scorer result when this resume was scored successfully.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ResumeOutcome::Scored { data, .. } => Some(data),
            ResumeOutcome::Failed { .. } => None,
        }
    }
}

/// Response of a batch evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Candidates at or above the threshold, highest score first.
    pub qualifying: Vec<CandidateRecord>,
    /// Number of uploaded resumes, scored or not.
    pub total: usize,
}
