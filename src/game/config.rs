use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest accepted grid side; keeps every reachable head position well inside `i32`
pub const MAX_GRID_SIDE: usize = 1024;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Simulation steps per second
    pub ticks_per_second: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 24,
            ticks_per_second: 15,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Time between two simulation steps
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.ticks_per_second.max(1)))
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(format!(
                "grid dimensions must be positive, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.grid_width > MAX_GRID_SIDE || self.grid_height > MAX_GRID_SIDE {
            return Err(format!(
                "grid dimensions must be at most {MAX_GRID_SIDE}, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.ticks_per_second == 0 {
            return Err("ticks_per_second must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 32);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.ticks_per_second, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 12);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 12);
        assert_eq!(config.ticks_per_second, 15);
    }

    #[test]
    fn test_tick_interval() {
        let config = GameConfig::default();
        assert_eq!(config.tick_interval().as_millis(), 66);

        let config = GameConfig {
            ticks_per_second: 4,
            ..GameConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_validation_zero_grid() {
        assert!(GameConfig::new(0, 10).validate().is_err());
        assert!(GameConfig::new(10, 0).validate().is_err());
    }

    #[test]
    fn test_validation_zero_tick_rate() {
        let config = GameConfig {
            ticks_per_second: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_oversized_grid() {
        assert!(GameConfig::new(MAX_GRID_SIDE, MAX_GRID_SIDE).validate().is_ok());
        assert!(GameConfig::new(MAX_GRID_SIDE + 1, 10).validate().is_err());
        assert!(GameConfig::new(10, i32::MAX as usize).validate().is_err());
    }

    #[test]
    fn test_unknown_json_fields_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.json");
        fs::write(&path, r#"{ "grid_height": 30, "initial_snake_length": 5 }"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();
        assert_eq!(config.grid_height, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wormy.json");
        fs::write(&path, r#"{ "grid_width": 40, "ticks_per_second": 10 }"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();
        assert_eq!(config.grid_width, 40);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.ticks_per_second, 10);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ grid_width: ").unwrap();

        assert!(GameConfig::from_json_file(&path).is_err());
        assert!(GameConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
