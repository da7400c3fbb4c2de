//! World settings

use crate::error::WorldError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tether_core::math::Vec3;
use tether_engine::RawIntegrationParameters;

/// Settings a [`World`](crate::World) is built from.
///
/// Every field has a default, so a settings file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub gravity: Vec3,
    pub integration: IntegrationSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSettings {
    /// Seconds advanced by one step.
    pub timestep: f32,
    pub substeps: u32,
    pub linear_sleep_threshold: f32,
    pub angular_sleep_threshold: f32,
    /// Seconds a body must stay below both thresholds before it sleeps.
    pub time_until_sleep: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Number of recent steps averaged by the step timer.
    pub step_window: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            integration: IntegrationSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        let params = RawIntegrationParameters::default();
        Self {
            timestep: params.dt,
            substeps: params.substeps,
            linear_sleep_threshold: params.linear_sleep_threshold,
            angular_sleep_threshold: params.angular_sleep_threshold,
            time_until_sleep: params.time_until_sleep,
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { step_window: 120 }
    }
}

impl WorldSettings {
    /// Read settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "world settings loaded");
        Ok(settings)
    }

    pub fn from_json_str(text: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(text)?)
    }

    pub(crate) fn integration_parameters(&self) -> RawIntegrationParameters {
        RawIntegrationParameters {
            dt: self.integration.timestep,
            substeps: self.integration.substeps,
            linear_sleep_threshold: self.integration.linear_sleep_threshold,
            angular_sleep_threshold: self.integration.angular_sleep_threshold,
            time_until_sleep: self.integration.time_until_sleep,
        }
    }

    pub(crate) fn apply_integration_parameters(&mut self, params: &RawIntegrationParameters) {
        self.integration = IntegrationSettings {
            timestep: params.dt,
            substeps: params.substeps,
            linear_sleep_threshold: params.linear_sleep_threshold,
            angular_sleep_threshold: params.angular_sleep_threshold,
            time_until_sleep: params.time_until_sleep,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings =
            WorldSettings::from_json_str(r#"{ "integration": { "substeps": 4 } }"#).unwrap();
        assert_eq!(settings.integration.substeps, 4);
        assert_eq!(settings.integration.timestep, 1.0 / 60.0);
        assert_eq!(settings.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(settings.metrics.step_window, 120);
    }

    #[test]
    fn gravity_is_a_three_element_array() {
        let settings = WorldSettings::from_json_str(r#"{ "gravity": [0.0, 0.0, -1.0] }"#).unwrap();
        assert_eq!(settings.gravity, Vec3::NEG_Z);
    }

    #[test]
    fn malformed_json_is_a_settings_error() {
        assert!(matches!(
            WorldSettings::from_json_str("{ gravity"),
            Err(WorldError::Settings(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = WorldSettings::load("/nonexistent/tether.json").unwrap_err();
        assert!(matches!(err, WorldError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/tether.json"));
    }

    #[test]
    fn integration_parameters_mirror_settings() {
        let mut settings = WorldSettings::default();
        settings.integration.timestep = 0.01;
        let params = settings.integration_parameters();
        assert_eq!(params.dt, 0.01);

        let mut other = WorldSettings::default();
        other.apply_integration_parameters(&params);
        assert_eq!(other, settings);
    }
}
