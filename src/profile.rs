//! User profiles driving the discovery pipeline.
//!
//! A profile is read-only input to discovery: it is created at registration
//! by the surrounding platform and only consumed here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a platform user within the ecosystem.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileRole {
    /// Startup founder looking for funding and programmes.
    Founder,
    /// Investor looking for deal flow.
    Funder,
    /// Platform administrator.
    Admin,
    /// Accelerator, incubator or community operator.
    EcosystemBuilder,
}

/// A user profile as seen by the discovery pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    /// Platform user id.
    pub user_id: Uuid,
    /// Role of the user.
    pub role: ProfileRole,
    /// Primary sector of interest (e.g. "FinTech").
    pub sector: Option<String>,
    /// Location (e.g. "Malaysia", "Kuala Lumpur").
    pub location: Option<String>,
    /// Free-form interests.
    #[serde(default)]
    pub interests: Vec<String>,
    /// Startup stage for founders (e.g. "seed", "Series A").
    pub stage: Option<String>,
    /// Investment range for funders (e.g. "RM500k - RM2M").
    pub investment_range: Option<String>,
}

impl UserProfile {
    /// Create a minimal profile for the given role.
    #[must_use]
    pub fn new(user_id: Uuid, role: ProfileRole) -> Self {
        Self {
            user_id,
            role,
            sector: None,
            location: None,
            interests: Vec::new(),
            stage: None,
            investment_range: None,
        }
    }

    /// Set the sector.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the startup stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Set the investment range.
    #[must_use]
    pub fn with_investment_range(mut self, range: impl Into<String>) -> Self {
        self.investment_range = Some(range.into());
        self
    }

    /// Sector in lowercase for case-insensitive matching.
    #[must_use]
    pub fn sector_lower(&self) -> Option<String> {
        self.sector.as_ref().map(|s| s.to_lowercase())
    }

    /// Location in lowercase for case-insensitive matching.
    #[must_use]
    pub fn location_lower(&self) -> Option<String> {
        self.location.as_ref().map(|l| l.to_lowercase())
    }
}
