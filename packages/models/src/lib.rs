#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Closed vocabularies used across the road asset system.
//!
//! Every status, severity and role field is one of these enums. They are
//! serialized as `snake_case` strings, both on the wire and in the database,
//! where matching `CHECK` constraints guard the same value sets.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Operational status of an asset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssetStatus {
    /// In normal use.
    InService,
    /// Temporarily out of use for maintenance work.
    UnderMaintenance,
    /// Damaged and awaiting repair.
    Damaged,
    /// Permanently retired.
    Decommissioned,
}

impl AssetStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::InService,
            Self::UnderMaintenance,
            Self::Damaged,
            Self::Decommissioned,
        ]
    }
}

/// How urgent an incident is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentSeverity {
    /// Cosmetic, no traffic impact
    Low,
    /// Degrades the road but traffic flows
    Medium,
    /// Traffic is restricted
    High,
    /// Immediate danger to road users
    Critical,
}

impl IncidentSeverity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }
}

/// Physical damage observed on the asset involved in an incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DamageLevel {
    /// No visible damage.
    None,
    /// Surface damage only.
    Minor,
    /// Structural damage, still usable.
    Moderate,
    /// Unusable until repaired.
    Severe,
}

impl DamageLevel {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::None, Self::Minor, Self::Moderate, Self::Severe]
    }
}

/// Where an incident is in its handling workflow.
///
/// Transitions between these values are not enforced; callers may set any
/// status on update.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingStatus {
    /// Newly reported, not yet checked.
    Reported,
    /// Confirmed on site.
    Verified,
    /// Repair work is under way.
    InProgress,
    /// Repair finished.
    Resolved,
    /// Archived.
    Closed,
}

impl ProcessingStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Reported,
            Self::Verified,
            Self::InProgress,
            Self::Resolved,
            Self::Closed,
        ]
    }
}

/// Lifecycle status of a maintenance or repair task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    /// Created, nobody assigned.
    Pending,
    /// Assigned to an execution unit.
    Assigned,
    /// Work started.
    InProgress,
    /// Work finished.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Assigned,
            Self::InProgress,
            Self::Completed,
            Self::Cancelled,
        ]
    }
}

/// Scheduling priority of a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl TaskPriority {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Normal, Self::High, Self::Urgent]
    }
}

/// Role of a system user, as issued by the authentication service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Technician,
    Viewer,
}

impl UserRole {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Admin, Self::Manager, Self::Technician, Self::Viewer]
    }
}
