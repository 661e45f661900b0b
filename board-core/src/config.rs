//! Configuration for a betting session

use crate::doubling::HalvePolicy;
use crate::layout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Board layout configuration
    pub board: BoardConfig,

    /// Undo configuration
    pub undo: UndoConfig,

    /// Doubling configuration
    pub doubling: DoublingConfig,

    /// Chip selection configuration
    pub selection: SelectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "board-core".to_string(),
            board: BoardConfig::default(),
            undo: UndoConfig::default(),
            doubling: DoublingConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

/// Board layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Allowed chip denominations
    pub denominations: Vec<u32>,

    /// Addressable cell labels
    pub cells: Vec<String>,

    /// Reject unknown chips and cells instead of trusting the caller
    pub strict_validation: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            denominations: vec![1, 5, 10, 25, 100, 500],
            cells: layout::european_cells(),
            strict_validation: true,
        }
    }
}

/// Undo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Requests within this window after the last accepted one are dropped (milliseconds)
    pub cooldown_ms: u64,
}

impl UndoConfig {
    /// Cooldown as a duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self { cooldown_ms: 150 }
    }
}

/// Doubling configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoublingConfig {
    /// What happens to totals that halve down to zero
    pub halve_policy: HalvePolicy,
}

/// Chip selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Clicking outside the board drops the selected chip
    pub deselect_on_outside_click: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            deselect_on_outside_click: true,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Config::default().with_env_overrides()
    }

    /// Overlay environment variables on top of this config
    pub fn with_env_overrides(mut self) -> crate::Result<Self> {
        if let Ok(list) = std::env::var("BOARD_DENOMINATIONS") {
            self.board.denominations = parse_denominations(&list)?;
        }

        if let Ok(ms) = std::env::var("BOARD_UNDO_COOLDOWN_MS") {
            self.undo.cooldown_ms = ms.trim().parse().map_err(|e| {
                crate::Error::Config(format!("Invalid BOARD_UNDO_COOLDOWN_MS '{}': {}", ms, e))
            })?;
        }

        if let Ok(policy) = std::env::var("BOARD_HALVE_POLICY") {
            self.doubling.halve_policy = policy.parse()?;
        }

        if let Ok(strict) = std::env::var("BOARD_STRICT_VALIDATION") {
            self.board.strict_validation = strict.trim().parse().map_err(|e| {
                crate::Error::Config(format!("Invalid BOARD_STRICT_VALIDATION '{}': {}", strict, e))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check the board description is usable
    pub fn validate(&self) -> crate::Result<()> {
        let denominations = &self.board.denominations;
        if denominations.is_empty() {
            return Err(crate::Error::Config("No chip denominations configured".to_string()));
        }
        if denominations.contains(&0) {
            return Err(crate::Error::Config("Chip denominations must be positive".to_string()));
        }
        let unique: HashSet<_> = denominations.iter().collect();
        if unique.len() != denominations.len() {
            return Err(crate::Error::Config("Duplicate chip denomination".to_string()));
        }

        if self.board.cells.is_empty() {
            return Err(crate::Error::Config("No board cells configured".to_string()));
        }
        let mut seen = HashSet::new();
        for cell in &self.board.cells {
            if !seen.insert(cell.as_str()) {
                return Err(crate::Error::Config(format!("Duplicate cell label: {}", cell)));
            }
        }

        Ok(())
    }
}

fn parse_denominations(list: &str) -> crate::Result<Vec<u32>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|e| crate::Error::Config(format!("Invalid denomination '{}': {}", s, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "board-core");
        assert_eq!(config.undo.cooldown_ms, 150);
        assert_eq!(config.doubling.halve_policy, HalvePolicy::Prune);
        assert!(config.board.strict_validation);
        assert!(config.selection.deselect_on_outside_click);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[board]
denominations = [2, 20]

[undo]
cooldown_ms = 0

[doubling]
halve_policy = "retain"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.board.denominations, vec![2, 20]);
        assert_eq!(config.board.cells.len(), 49);
        assert_eq!(config.undo.cooldown_ms, 0);
        assert_eq!(config.doubling.halve_policy, HalvePolicy::Retain);
    }

    #[test]
    fn test_from_file_rejects_zero_denomination() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[board]\ndenominations = [0, 5]").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_validate_duplicates() {
        let mut config = Config::default();
        config.board.denominations = vec![5, 5];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.board.cells = vec!["1".into(), "1".into()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.board.cells.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_denominations() {
        assert_eq!(parse_denominations("1, 5,25").unwrap(), vec![1, 5, 25]);
        assert!(parse_denominations("1,x").is_err());
    }

    #[test]
    fn test_env_overrides() {
        const VARS: [&str; 4] = [
            "BOARD_DENOMINATIONS",
            "BOARD_UNDO_COOLDOWN_MS",
            "BOARD_HALVE_POLICY",
            "BOARD_STRICT_VALIDATION",
        ];

        std::env::set_var("BOARD_DENOMINATIONS", "1, 10,50");
        std::env::set_var("BOARD_UNDO_COOLDOWN_MS", " 300 ");
        std::env::set_var("BOARD_HALVE_POLICY", "Retain");
        std::env::set_var("BOARD_STRICT_VALIDATION", "false");

        let config = Config::from_env().unwrap();
        assert_eq!(config.board.denominations, vec![1, 10, 50]);
        assert_eq!(config.undo.cooldown_ms, 300);
        assert_eq!(config.doubling.halve_policy, HalvePolicy::Retain);
        assert!(!config.board.strict_validation);

        std::env::set_var("BOARD_UNDO_COOLDOWN_MS", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, crate::Error::Config(ref msg) if msg.contains("BOARD_UNDO_COOLDOWN_MS")));

        std::env::set_var("BOARD_UNDO_COOLDOWN_MS", "300");
        std::env::set_var("BOARD_DENOMINATIONS", "5,5");
        assert!(matches!(Config::from_env(), Err(crate::Error::Config(_))));

        for var in VARS {
            std::env::remove_var(var);
        }
        assert_eq!(Config::from_env().unwrap().undo.cooldown_ms, 150);
    }
}
