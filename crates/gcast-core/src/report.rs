//! Human-readable broadcast summaries handed back to whoever triggered the run.

use std::fmt;

use crate::error::BroadcastError;
use crate::types::BroadcastResult;

/// Final report of a broadcast run: either the counts of a run that reached
/// the end, or an explicit error when the run could not start.
#[derive(Debug, Clone)]
pub enum BroadcastReport {
    Completed(BroadcastResult),
    Failed { code: &'static str, message: String },
}

impl From<BroadcastResult> for BroadcastReport {
    fn from(result: BroadcastResult) -> Self {
        BroadcastReport::Completed(result)
    }
}

impl From<&BroadcastError> for BroadcastReport {
    fn from(err: &BroadcastError) -> Self {
        BroadcastReport::Failed {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<crate::error::Result<BroadcastResult>> for BroadcastReport {
    fn from(run: crate::error::Result<BroadcastResult>) -> Self {
        match run {
            Ok(result) => result.into(),
            Err(err) => (&err).into(),
        }
    }
}

impl fmt::Display for BroadcastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastReport::Completed(r) => {
                let headline = if r.cancelled {
                    "⚠️ Broadcast Cancelled"
                } else {
                    "✅ Broadcast Completed"
                };
                writeln!(f, "{headline}")?;
                writeln!(f)?;
                writeln!(f, "👥 Total Users: {}", r.total_recipients)?;
                writeln!(f, "📤 Delivered: {}", r.delivered)?;
                writeln!(f, "❌ Failed: {}", r.failed)?;
                write!(f, "⏱ Duration: {:.2}s", r.elapsed_secs())
            }
            BroadcastReport::Failed { code, message } => {
                writeln!(f, "❌ Broadcast Failed")?;
                writeln!(f)?;
                write!(f, "{message} ({code})")
            }
        }
    }
}
