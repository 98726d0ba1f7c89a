use glam::Vec2;
use horizon_common::TemplateId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`StreamConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Streaming configuration, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Regions are populated for rings `0..retention_radius` and evicted once
    /// either axis offset from the observer's region exceeds it.
    pub retention_radius: i32,
    /// Width (x) and depth (z) of one region in world units.
    pub region_size: Vec2,
    /// Occluders spawned per populated region.
    pub occluders_per_region: usize,
    /// Template used for the ground plane; `None` skips ground planes.
    pub ground_template: Option<TemplateId>,
    /// Template used for occluders; `None` skips occluders.
    pub occluder_template: Option<TemplateId>,
    /// Distance hint forwarded to the LOD manager.
    pub update_distance: f32,
    /// Seed of the placement stream.
    pub seed: u64,
    /// Newly populated regions after which a tick's population pass stops.
    pub regions_per_tick: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            retention_radius: 8,
            region_size: Vec2::new(4000.0, 4000.0),
            occluders_per_region: 1,
            ground_template: None,
            occluder_template: None,
            update_distance: 5000.0,
            seed: 0,
            regions_per_tick: 1,
        }
    }
}

impl StreamConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.region_size;
        if !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "region_size must be positive on both axes, got ({}, {})",
                size.x, size.y
            )));
        }
        if self.regions_per_tick == 0 {
            return Err(ConfigError::Invalid(
                "regions_per_tick must be at least 1".into(),
            ));
        }
        if !self.update_distance.is_finite() || self.update_distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "update_distance must be finite and non-negative, got {}",
                self.update_distance
            )));
        }
        Ok(())
    }

    pub fn with_templates(
        mut self,
        ground: impl Into<TemplateId>,
        occluder: impl Into<TemplateId>,
    ) -> Self {
        self.ground_template = Some(ground.into());
        self.occluder_template = Some(occluder.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.retention_radius, 8);
        assert_eq!(config.region_size, Vec2::new(4000.0, 4000.0));
        assert_eq!(config.occluders_per_region, 1);
        assert_eq!(config.update_distance, 5000.0);
        assert_eq!(config.seed, 0);
        assert_eq!(config.regions_per_tick, 1);
        assert!(config.ground_template.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let config = StreamConfig::from_yaml_str(
            "retention_radius: 3\nregion_size: [100.0, 50.0]\noccluder_template: rock\n",
        )
        .unwrap();
        assert_eq!(config.retention_radius, 3);
        assert_eq!(config.region_size, Vec2::new(100.0, 50.0));
        assert_eq!(config.occluder_template, Some(TemplateId::from("rock")));
        assert_eq!(config.occluders_per_region, 1);
    }

    #[test]
    fn yaml_rejects_unknown_fields() {
        let err = StreamConfig::from_yaml_str("retention_radiuss: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn validate_rejects_bad_region_size() {
        let config = StreamConfig {
            region_size: Vec2::new(0.0, 10.0),
            ..StreamConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = StreamConfig {
            region_size: Vec2::new(10.0, f32::NAN),
            ..StreamConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_throttle_and_negative_distance() {
        let config = StreamConfig {
            regions_per_tick: 0,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_err());

        let config = StreamConfig {
            update_distance: -1.0,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stream.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "seed: 99\nground_template: plane").unwrap();

        let config = StreamConfig::load(&path).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.ground_template, Some(TemplateId::from("plane")));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = StreamConfig::load(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
