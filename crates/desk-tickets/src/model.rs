//! Shared value objects across record kinds

use serde::{Deserialize, Serialize};

/// Urgency of a record, shared by all four kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

/// Technical category for incidents and problems.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Hardware,
    Software,
    Network,
    Access,
    Database,
    Application,
    Other,
}

/// Device class an incident relates to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedDevice {
    Printer,
    Router,
    Switch,
    #[default]
    Computer,
    Laptop,
    Server,
    Other,
}

/// Change-management classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Standard,
    #[default]
    Normal,
    Emergency,
}
