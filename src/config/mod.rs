use serde::Deserialize;

/// Complete fieldbot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FieldbotConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Coordinator HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Workspace (field grid) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    /// Side length N of the N x N grid; valid cells are [0, N) x [0, N)
    #[serde(default = "default_grid_size")]
    pub grid_size: i64,
}

fn default_grid_size() -> i64 {
    5
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
        }
    }
}

/// Agent loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the coordinator API
    #[serde(default = "default_coordinator_url")]
    pub coordinator_url: String,
    /// How often the agent polls for commands (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Time per movement step (milliseconds)
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// Time a fertilizer drop takes (milliseconds)
    #[serde(default = "default_drop_duration_ms")]
    pub drop_duration_ms: u64,
    /// Per-tick chance of passive battery drain, 0.0..=1.0
    #[serde(default = "default_drain_probability")]
    pub drain_probability: f64,
    /// Battery percentage at or below which the failsafe recharge fires
    #[serde(default = "default_low_battery_threshold")]
    pub low_battery_threshold: i64,
}

fn default_coordinator_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_step_interval_ms() -> u64 {
    500
}

fn default_drop_duration_ms() -> u64 {
    1000
}

fn default_drain_probability() -> f64 {
    0.1
}

fn default_low_battery_threshold() -> i64 {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            coordinator_url: default_coordinator_url(),
            poll_interval_ms: default_poll_interval_ms(),
            step_interval_ms: default_step_interval_ms(),
            drop_duration_ms: default_drop_duration_ms(),
            drain_probability: default_drain_probability(),
            low_battery_threshold: default_low_battery_threshold(),
        }
    }
}

impl Default for FieldbotConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            workspace: WorkspaceConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<FieldbotConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: FieldbotConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load configuration from `path` if it exists, otherwise use defaults.
///
/// Missing config files are normal (every setting has a default); a
/// file that exists but fails to parse is still an error.
pub fn load_config_or_default(path: &str) -> Result<FieldbotConfig, Box<dyn std::error::Error>> {
    if std::path::Path::new(path).exists() {
        load_config(path)
    } else {
        Ok(FieldbotConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FieldbotConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:5001");
        assert_eq!(config.workspace.grid_size, 5);
        assert_eq!(config.agent.poll_interval_ms, 3000);
        assert_eq!(config.agent.step_interval_ms, 500);
        assert_eq!(config.agent.drop_duration_ms, 1000);
        assert_eq!(config.agent.drain_probability, 0.1);
        assert_eq!(config.agent.low_battery_threshold, 5);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            bind_addr = "127.0.0.1:8080"

            [workspace]
            grid_size = 8

            [agent]
            coordinator_url = "http://coordinator:8080"
            poll_interval_ms = 1000
            step_interval_ms = 100
            drop_duration_ms = 200
            drain_probability = 0.25
            low_battery_threshold = 10
        "#;

        let config: FieldbotConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.workspace.grid_size, 8);
        assert_eq!(config.agent.coordinator_url, "http://coordinator:8080");
        assert_eq!(config.agent.poll_interval_ms, 1000);
        assert_eq!(config.agent.drain_probability, 0.25);
        assert_eq!(config.agent.low_battery_threshold, 10);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections fall back to defaults
        let toml = r#"
            [workspace]
            grid_size = 10
        "#;

        let config: FieldbotConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.workspace.grid_size, 10);
        assert_eq!(config.server.bind_addr, "0.0.0.0:5001"); // Default
        assert_eq!(config.agent.poll_interval_ms, 3000); // Default
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[agent]\npoll_interval_ms = 500\n").unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.agent.poll_interval_ms, 500);
        assert_eq!(config.workspace.grid_size, 5);
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        let config = load_config_or_default("/nonexistent/fieldbot.toml").unwrap();
        assert_eq!(config.workspace.grid_size, 5);
    }
}
