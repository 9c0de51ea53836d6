//! Deployment environment and which provider environment it serves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

use super::BillingEnvironment;

/// Environment this process is deployed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl DeploymentEnvironment {
    /// Provider environment whose events this deployment processes.
    pub fn billing_environment(&self) -> BillingEnvironment {
        match self {
            DeploymentEnvironment::Production => BillingEnvironment::Production,
            DeploymentEnvironment::Development | DeploymentEnvironment::Staging => {
                BillingEnvironment::Sandbox
            }
        }
    }

    /// Returns true if events from `environment` may be processed here.
    pub fn accepts(&self, environment: BillingEnvironment) -> bool {
        self.billing_environment() == environment
    }

    pub fn is_production(&self) -> bool {
        matches!(self, DeploymentEnvironment::Production)
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentEnvironment::Development => write!(f, "development"),
            DeploymentEnvironment::Staging => write!(f, "staging"),
            DeploymentEnvironment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for DeploymentEnvironment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentEnvironment::Development),
            "staging" => Ok(DeploymentEnvironment::Staging),
            "production" | "prod" => Ok(DeploymentEnvironment::Production),
            other => Err(ValidationError::invalid_format(
                "environment",
                format!("unknown environment '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_accepts_only_production_events() {
        let env = DeploymentEnvironment::Production;
        assert!(env.accepts(BillingEnvironment::Production));
        assert!(!env.accepts(BillingEnvironment::Sandbox));
    }

    #[test]
    fn staging_and_development_accept_sandbox() {
        for env in [DeploymentEnvironment::Staging, DeploymentEnvironment::Development] {
            assert!(env.accepts(BillingEnvironment::Sandbox));
            assert!(!env.accepts(BillingEnvironment::Production));
            assert!(!env.is_production());
        }
    }

    #[test]
    fn parses_short_names() {
        assert_eq!(
            "prod".parse::<DeploymentEnvironment>().unwrap(),
            DeploymentEnvironment::Production
        );
        assert!("qa".parse::<DeploymentEnvironment>().is_err());
    }
}
