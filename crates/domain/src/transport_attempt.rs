use super::{DnsError, TransportKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success { reply: String },
    Failure { error: DnsError },
}

/// Diagnostic record of one transport try within a query.
#[derive(Debug, Clone, Serialize)]
pub struct TransportAttempt {
    pub transport: TransportKind,
    pub started_at: DateTime<Utc>,
    pub timeout_ms: u64,
    pub elapsed_ms: u64,
    pub outcome: AttemptOutcome,
}

impl TransportAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }

    pub fn error(&self) -> Option<&DnsError> {
        match &self.outcome {
            AttemptOutcome::Failure { error } => Some(error),
            AttemptOutcome::Success { .. } => None,
        }
    }
}
