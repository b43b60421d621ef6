use anyhow::{Context, Result};
use coldet_physics::WorldConfig;
use serde::Deserialize;
use std::path::Path;

/// Configuration loaded from config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TestbedConfig {
    pub world: WorldConfig,
    pub run: RunConfig,
}

/// How long the headless run lasts and how often it reports
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of frames to simulate
    pub steps: u32,
    /// Frame time handed to `advance`
    pub frame_dt: f32,
    /// Frames between body state reports; 0 reports only the final frame
    pub log_interval: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 600,
            frame_dt: 1.0 / 60.0,
            log_interval: 60,
        }
    }
}

impl TestbedConfig {
    /// Parse a TOML document; absent sections and keys keep their defaults
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).context("invalid testbed configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.run.frame_dt.is_finite() && self.run.frame_dt > 0.0,
            "run.frame_dt must be positive, got {}",
            self.run.frame_dt
        );
        self.world.validate()?;
        Ok(())
    }
}

/// Load configuration from `path`, falling back to defaults when the file is missing
pub fn load_config(path: &Path) -> Result<TestbedConfig> {
    if !path.exists() {
        tracing::warn!(
            "[Testbed] config file {} not found, using default configuration",
            path.display()
        );
        return Ok(TestbedConfig::default());
    }
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    TestbedConfig::from_toml(&source).with_context(|| format!("failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coldet_physics::coldet_terrain::NoiseKind;
    use glam::Vec3;

    #[test]
    fn test_empty_document_is_default() {
        let config = TestbedConfig::from_toml("").unwrap();
        assert_eq!(config, TestbedConfig::default());
        assert_eq!(config.world.spawning.box_count, 50);
        assert_eq!(config.world.spawning.sphere_count, 50);
        assert_eq!(config.world.reset_interval, 15.0);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = TestbedConfig::from_toml(
            r#"
            [run]
            steps = 120

            [world.spawning]
            box_count = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.run.steps, 120);
        assert_eq!(config.run.log_interval, 60);
        assert_eq!(config.world.spawning.box_count, 3);
        assert_eq!(config.world.spawning.sphere_count, 50);
        assert_eq!(config.world.spawning.drop_height, 30.0);
    }

    #[test]
    fn test_world_overrides() {
        let config = TestbedConfig::from_toml(
            r#"
            [world]
            gravity = [0.0, -9.81, 0.0]
            reset_interval = 0.0
            seed = 7

            [world.terrain]
            grid_size = 33
            noise = "perlin"

            [world.sleep]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.world.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(config.world.reset_interval, 0.0);
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.terrain.grid_size, 33);
        assert_eq!(config.world.terrain.noise, NoiseKind::Perlin);
        assert_eq!(config.world.terrain.grid_scale, 400.0);
        assert!(!config.world.sleep.enabled);
        assert_eq!(config.world.sleep.time_to_sleep, 2.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(TestbedConfig::from_toml("[run]\nframe_dt = 0.0").is_err());
        assert!(TestbedConfig::from_toml("[world.terrain]\ngrid_size = 1").is_err());
        assert!(TestbedConfig::from_toml("[world.spawning]\nsphere_diameter = -1.0").is_err());
        assert!(TestbedConfig::from_toml("[run]\nsteps = \"many\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(Path::new("does/not/exist/config.toml")).unwrap();
        assert_eq!(config, TestbedConfig::default());
    }
}
