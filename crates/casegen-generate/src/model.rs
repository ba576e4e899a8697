use serde::{Deserialize, Serialize};

/// Result of one `Generator::generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Accepted data groups, in generation order.
    pub groups: Vec<String>,
    /// Number of groups the caller asked for.
    pub requested: usize,
    /// Group builds performed, including rejected duplicates.
    pub attempts: usize,
    pub duplicates_rejected: usize,
}

impl GenerationOutcome {
    /// Soft failure when duplicate avoidance ran out of attempts.
    pub fn shortfall(&self) -> Option<Shortfall> {
        (self.groups.len() < self.requested).then(|| Shortfall {
            requested: self.requested,
            produced: self.groups.len(),
            attempts: self.attempts,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall().is_none()
    }

    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            requested: self.requested,
            produced: self.groups.len(),
            attempts: self.attempts,
            duplicates_rejected: self.duplicates_rejected,
            shortfall: self.shortfall(),
        }
    }
}

/// Fewer unique groups than requested could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub requested: usize,
    pub produced: usize,
    pub attempts: usize,
}

/// Serializable digest of a generation call, written into run manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub requested: usize,
    pub produced: usize,
    pub attempts: usize,
    pub duplicates_rejected: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<Shortfall>,
}
