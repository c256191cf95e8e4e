//! Mutation phases.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stage of the mutator pipeline an external generator runs in.
///
/// `Load` runs before targets are selected and variables resolved; `Init`
/// runs after. The phase decides which [`PhasePolicy`](crate::PhasePolicy)
/// guards the generator's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Load,
    Init,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown phase '{0}', expected 'load' or 'init'")]
pub struct UnknownPhase(pub String);

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Init => "init",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load" => Ok(Phase::Load),
            "init" => Ok(Phase::Init),
            other => Err(UnknownPhase(other.to_string())),
        }
    }
}
