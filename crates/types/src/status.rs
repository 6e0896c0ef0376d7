//! Board health derived from GENERAL_BOARD_STATUS reports

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status shown for a board that has not reported yet
pub const DEAD_STATUS: &str = "DEAD";

/// Status shown for a board that stopped reporting
pub const DEAD_FROM_TIMEOUT_STATUS: &str = "DEAD_FROM_TIMEOUT";

/// Status values that count as healthy
const HEALTHY_STATUSES: [&str; 2] = ["E_NOMINAL", "RECEIVED_MSG_NO_STATUS"];

/// Binary health state of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardHealth {
    Healthy,
    Unhealthy,
}

impl BoardHealth {
    /// Map a reported status string to a health state
    pub fn from_status(status: &str) -> Self {
        if HEALTHY_STATUSES.contains(&status) {
            BoardHealth::Healthy
        } else {
            BoardHealth::Unhealthy
        }
    }

    pub fn is_healthy(self) -> bool {
        self == BoardHealth::Healthy
    }

    pub fn color(self) -> StatusColor {
        match self {
            BoardHealth::Healthy => StatusColor::Green,
            BoardHealth::Unhealthy => StatusColor::Red,
        }
    }

    /// Numeric form used when plotting health as a series
    pub fn as_value(self) -> f64 {
        match self {
            BoardHealth::Healthy => 1.0,
            BoardHealth::Unhealthy => 0.0,
        }
    }
}

/// Display color for a status widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Green,
    Red,
}

impl StatusColor {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusColor::Green => "green",
            StatusColor::Red => "red",
        }
    }
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(BoardHealth::from_status("E_NOMINAL"), BoardHealth::Healthy);
        assert_eq!(
            BoardHealth::from_status("RECEIVED_MSG_NO_STATUS"),
            BoardHealth::Healthy
        );
        assert_eq!(BoardHealth::from_status("E_BUS_OVER_CURRENT"), BoardHealth::Unhealthy);
        assert_eq!(BoardHealth::from_status(DEAD_STATUS), BoardHealth::Unhealthy);
    }

    #[test]
    fn test_colors() {
        assert_eq!(BoardHealth::Healthy.color().as_str(), "green");
        assert_eq!(BoardHealth::Unhealthy.color().to_string(), "red");
        assert_eq!(BoardHealth::Healthy.as_value(), 1.0);
    }
}
