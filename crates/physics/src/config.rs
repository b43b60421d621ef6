use crate::error::{PhysicsError, Result};
use crate::solver::SolverParams;
use coldet_terrain::TerrainParams;
use glam::Vec3;
use serde::Deserialize;

/// World configuration, usually embedded in an application config file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec3,
    /// Largest frame time accepted by `advance`
    pub max_substep: f32,
    /// Fixed step length; 0 steps once per `advance` with the frame time
    pub fixed_timestep: f32,
    pub max_substeps: u32,
    pub solver_iterations: usize,
    /// Approach speed a contact needs before restitution applies; 0 bounces every contact
    pub restitution_threshold: f32,
    /// Simulated seconds between automatic resets; 0 disables them
    pub reset_interval: f32,
    /// Pick a new terrain seed on every reset
    pub reseed_on_reset: bool,
    pub terrain: TerrainParams,
    pub terrain_restitution: f32,
    pub spawning: SpawnConfig,
    pub sleep: SleepConfig,
    /// Seed for spawn positions
    pub seed: u64,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -10.0, 0.0),
            max_substep: 1.0 / 30.0,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 5,
            solver_iterations: 5,
            restitution_threshold: 1.0,
            reset_interval: 15.0,
            reseed_on_reset: true,
            terrain: TerrainParams::default(),
            terrain_restitution: 0.5,
            spawning: SpawnConfig::default(),
            sleep: SleepConfig::default(),
            seed: 0,
            linear_damping: 0.0,
            angular_damping: 0.05,
            friction: 0.5,
        }
    }
}

impl WorldConfig {
    /// Reject configurations the world cannot run
    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.spawning.validate()?;
        self.sleep.validate()?;

        let invalid = |what: &str| Err(PhysicsError::InvalidConfig(what.to_string()));
        if !self.gravity.is_finite() {
            return invalid("gravity must be finite");
        }
        if !(self.max_substep.is_finite() && self.max_substep > 0.0) {
            return invalid("max_substep must be > 0");
        }
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep >= 0.0) {
            return invalid("fixed_timestep must be >= 0");
        }
        if self.fixed_timestep > 0.0 && self.max_substeps == 0 {
            return invalid("max_substeps must be >= 1 with a fixed timestep");
        }
        if self.solver_iterations == 0 {
            return invalid("solver_iterations must be >= 1");
        }
        if !(self.restitution_threshold.is_finite() && self.restitution_threshold >= 0.0) {
            return invalid("restitution_threshold must be >= 0");
        }
        if !(self.reset_interval.is_finite() && self.reset_interval >= 0.0) {
            return invalid("reset_interval must be >= 0");
        }
        if self.linear_damping < 0.0 || self.angular_damping < 0.0 {
            return invalid("damping must be >= 0");
        }
        Ok(())
    }

    pub fn solver_params(&self) -> SolverParams {
        SolverParams {
            iterations: self.solver_iterations,
            restitution_threshold: self.restitution_threshold,
            ..SolverParams::default()
        }
    }
}

/// Bodies dropped onto the terrain on every reset
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub box_count: usize,
    /// Edge length
    pub box_size: f32,
    pub box_mass: f32,
    pub box_restitution: f32,
    pub sphere_count: usize,
    pub sphere_diameter: f32,
    pub sphere_mass: f32,
    pub sphere_restitution: f32,
    pub drop_height: f32,
    /// Bodies spawn at x, z in `[-spawn_range, spawn_range)`
    pub spawn_range: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            box_count: 50,
            box_size: 10.0,
            box_mass: 50.0,
            box_restitution: 0.0,
            sphere_count: 50,
            sphere_diameter: 8.0,
            sphere_mass: 50.0,
            sphere_restitution: 0.2,
            drop_height: 30.0,
            spawn_range: 100.0,
        }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<()> {
        for mass in [self.box_mass, self.sphere_mass] {
            if !(mass.is_finite() && mass > 0.0) {
                return Err(PhysicsError::InvalidMass(mass));
            }
        }
        for (name, size) in [("box_size", self.box_size), ("sphere_diameter", self.sphere_diameter)] {
            if !(size.is_finite() && size > 0.0) {
                return Err(PhysicsError::InvalidShape(format!("{name} must be > 0, got {size}")));
            }
        }
        if !(self.spawn_range.is_finite() && self.spawn_range >= 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "spawn_range must be >= 0, got {}",
                self.spawn_range
            )));
        }
        Ok(())
    }
}

/// Sleep thresholds
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SleepConfig {
    #[serde(default = "default_sleep_enabled")]
    pub enabled: bool,
    #[serde(default = "default_linear_threshold")]
    pub linear_threshold: f32,
    #[serde(default = "default_angular_threshold")]
    pub angular_threshold: f32,
    /// Seconds a body must stay slow before it sleeps
    #[serde(default = "default_time_to_sleep")]
    pub time_to_sleep: f32,
}

fn default_sleep_enabled() -> bool {
    true
}

fn default_linear_threshold() -> f32 {
    0.8
}

fn default_angular_threshold() -> f32 {
    1.0
}

fn default_time_to_sleep() -> f32 {
    2.0
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            enabled: default_sleep_enabled(),
            linear_threshold: default_linear_threshold(),
            angular_threshold: default_angular_threshold(),
            time_to_sleep: default_time_to_sleep(),
        }
    }
}

impl SleepConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("linear_threshold", self.linear_threshold),
            ("angular_threshold", self.angular_threshold),
            ("time_to_sleep", self.time_to_sleep),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PhysicsError::InvalidConfig(format!(
                    "sleep.{name} must be >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spawning.box_count, 50);
        assert_eq!(config.spawning.sphere_count, 50);
        assert_eq!(config.gravity, Vec3::new(0.0, -10.0, 0.0));
    }

    #[test]
    fn test_zero_mass_spawn_rejected() {
        let mut config = WorldConfig::default();
        config.spawning.box_mass = 0.0;
        assert_eq!(config.validate(), Err(PhysicsError::InvalidMass(0.0)));
    }

    #[test]
    fn test_bad_terrain_rejected() {
        let mut config = WorldConfig::default();
        config.terrain.grid_size = 1;
        assert!(matches!(config.validate(), Err(PhysicsError::Terrain(_))));
    }

    #[test]
    fn test_bad_timing_rejected() {
        let mut config = WorldConfig::default();
        config.max_substep = 0.0;
        assert!(matches!(config.validate(), Err(PhysicsError::InvalidConfig(_))));

        let mut config = WorldConfig::default();
        config.solver_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_variable_step_needs_no_substeps() {
        let config = WorldConfig {
            fixed_timestep: 0.0,
            max_substeps: 0,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_sleep_rejected() {
        for sleep in [
            SleepConfig {
                linear_threshold: -0.1,
                ..SleepConfig::default()
            },
            SleepConfig {
                angular_threshold: f32::NAN,
                ..SleepConfig::default()
            },
            SleepConfig {
                time_to_sleep: -1.0,
                ..SleepConfig::default()
            },
        ] {
            let config = WorldConfig {
                sleep,
                ..WorldConfig::default()
            };
            assert!(matches!(config.validate(), Err(PhysicsError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_restitution_threshold_reaches_solver() {
        let config = WorldConfig {
            restitution_threshold: 0.0,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.solver_params().restitution_threshold, 0.0);
        assert_eq!(WorldConfig::default().solver_params().restitution_threshold, 1.0);

        let config = WorldConfig {
            restitution_threshold: -1.0,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
