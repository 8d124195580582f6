use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline state of a job application, matching the backend's label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationState {
    #[default]
    Todo,
    Applied,
    InProgress,
    Rejected,
    Accepted,
    Dropped,
}

impl ApplicationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationState::Todo => "todo",
            ApplicationState::Applied => "applied",
            ApplicationState::InProgress => "in-progress",
            ApplicationState::Rejected => "rejected",
            ApplicationState::Accepted => "accepted",
            ApplicationState::Dropped => "dropped",
        }
    }

    pub fn all() -> &'static [ApplicationState] {
        &[
            ApplicationState::Todo,
            ApplicationState::Applied,
            ApplicationState::InProgress,
            ApplicationState::Rejected,
            ApplicationState::Accepted,
            ApplicationState::Dropped,
        ]
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(ApplicationState::Todo),
            "applied" => Ok(ApplicationState::Applied),
            "in-progress" => Ok(ApplicationState::InProgress),
            "rejected" => Ok(ApplicationState::Rejected),
            "accepted" => Ok(ApplicationState::Accepted),
            "dropped" => Ok(ApplicationState::Dropped),
            other => Err(format!("Unknown application state: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_label() {
        for state in ApplicationState::all() {
            assert_eq!(
                state.as_str().parse::<ApplicationState>().expect("parse"),
                *state
            );
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ApplicationState::InProgress).expect("serialize");
        assert_eq!(json, "\"in-progress\"");
    }
}
