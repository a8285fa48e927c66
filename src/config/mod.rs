//! Node configuration loaded from YAML

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logo::catalog::LogoCatalog;
use crate::visualization::MarkerStyle;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "DRAW_LOGO_CONFIG";
/// Config file used when the environment variable is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/draw_logo.yaml";

/// Full node configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawLogoConfig {
    #[serde(default)]
    pub ros: RosSection,
    #[serde(default)]
    pub trajectory: TrajectorySection,
    #[serde(default)]
    pub marker: MarkerStyle,
    #[serde(default)]
    pub redraw: RedrawSection,
    #[serde(default)]
    pub logo: LogoCatalog,
}

/// ROS graph names and MoveIt settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosSection {
    pub node_name: String,
    /// MoveIt planning group of the arm
    pub planning_group: String,
    /// Link whose pose follows the waypoints
    pub end_effector_link: String,
    /// Frame waypoints are expressed in
    pub base_frame: String,
    pub marker_topic: String,
    /// Joint trajectory topic of the arm controller
    pub trajectory_topic: String,
    pub cartesian_path_service: String,
    pub fk_service: String,
    /// How long to wait for MoveIt services at startup, seconds
    pub service_timeout: f64,
}

impl Default for RosSection {
    fn default() -> Self {
        RosSection {
            node_name: "draw_logo_node".to_string(),
            planning_group: "ur5_arm".to_string(),
            end_effector_link: "tool0".to_string(),
            base_frame: "base_link".to_string(),
            marker_topic: "/visualization_marker".to_string(),
            trajectory_topic: "/scaled_joint_trajectory_controller/joint_trajectory".to_string(),
            cartesian_path_service: "/compute_cartesian_path".to_string(),
            fk_service: "/compute_fk".to_string(),
            service_timeout: 10.0,
        }
    }
}

impl RosSection {
    pub fn service_timeout(&self) -> Duration {
        seconds(self.service_timeout)
    }
}

/// Sampling and Cartesian planning resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySection {
    /// Samples per shape (per side for rectangles)
    pub samples: usize,
    /// Maximum translation between interpolated poses, meters
    pub max_step: f64,
    /// Joint-space jump limit, 0.0 disables the check
    pub jump_threshold: f64,
}

impl Default for TrajectorySection {
    fn default() -> Self {
        TrajectorySection {
            samples: 100,
            max_step: 0.01,
            jump_threshold: 0.0,
        }
    }
}

/// Pause between full redraws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedrawSection {
    /// Seconds
    pub interval: f64,
}

impl Default for RedrawSection {
    fn default() -> Self {
        RedrawSection { interval: 100.0 }
    }
}

impl RedrawSection {
    pub fn interval(&self) -> Duration {
        seconds(self.interval)
    }
}

/// Seconds as a duration, saturating at zero and at `Duration::MAX`
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(if value > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}

/// Reject durations that are negative, not a number or too large to represent
fn require_duration(field: &'static str, value: f64) -> Result<(), ConfigError> {
    match Duration::try_from_secs_f64(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(ConfigError::Invalid { field, value }),
    }
}

impl DrawLogoConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load from `$DRAW_LOGO_CONFIG`, else from `config/draw_logo.yaml` if it
    /// exists, else use the defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// The file [`DrawLogoConfig::load_default`] reads, if any
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let path = Path::new(DEFAULT_CONFIG_PATH);
        path.exists().then(|| path.to_path_buf())
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_duration("redraw.interval", self.redraw.interval)?;
        require_duration("ros.service_timeout", self.ros.service_timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_matches_defaults() {
        let shipped = include_str!("../../config/draw_logo.yaml");
        let config = DrawLogoConfig::from_yaml(shipped).unwrap();

        assert_eq!(config, DrawLogoConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = DrawLogoConfig::from_yaml(
            r#"
trajectory:
  samples: 20
redraw:
  interval: 5
"#,
        )
        .unwrap();

        assert_eq!(config.trajectory.samples, 20);
        assert_eq!(config.trajectory.max_step, 0.01);
        assert_eq!(config.redraw.interval(), Duration::from_secs(5));
        assert_eq!(config.ros.planning_group, "ur5_arm");
        assert_eq!(config.logo.shape_count(), 20);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(
            DrawLogoConfig::from_yaml("{}").unwrap(),
            DrawLogoConfig::default()
        );
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let err = DrawLogoConfig::from_yaml("trajectory: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unrepresentable_durations_rejected() {
        for yaml in [
            "redraw: { interval: .inf }",
            "redraw: { interval: -1.0 }",
            "redraw: { interval: .nan }",
            "redraw: { interval: 1.0e300 }",
            "ros: { service_timeout: .inf }",
        ] {
            let err = DrawLogoConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{}: {}", yaml, err);
        }
    }

    #[test]
    fn test_duration_accessors_saturate() {
        let mut redraw = RedrawSection::default();

        redraw.interval = f64::INFINITY;
        assert_eq!(redraw.interval(), Duration::MAX);
        redraw.interval = -3.0;
        assert_eq!(redraw.interval(), Duration::ZERO);
        redraw.interval = f64::NAN;
        assert_eq!(redraw.interval(), Duration::ZERO);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DrawLogoConfig::load(Path::new("/nonexistent/draw_logo.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
