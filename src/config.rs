use crate::errors::{EngineError, EngineResult};
use crate::models::position::PriceGrid;
use std::str::FromStr;

/// Which collaborator drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Console,
    Server,
}

impl FromStr for RunMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "server" => Ok(Self::Server),
            other => Err(EngineError::Config(format!(
                "APP_MODE: expected 'console' or 'server', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: RunMode,
    pub grid_min: f64,
    pub grid_max: f64,
    pub grid_points: usize,
    pub max_positions: usize,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Console,
            grid_min: 0.01,
            grid_max: 200.0,
            grid_points: 1000,
            max_positions: 5,
            server_port: 3001,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mode = get("APP_MODE", "console").parse::<RunMode>()?;

        let grid_min = get("GRID_MIN", "0.01")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("GRID_MIN: {e}")))?;

        let grid_max = get("GRID_MAX", "200")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("GRID_MAX: {e}")))?;

        let grid_points = get("GRID_POINTS", "1000")
            .parse::<usize>()
            .map_err(|e| EngineError::Config(format!("GRID_POINTS: {e}")))?;

        let max_positions = get("MAX_POSITIONS", "5")
            .parse::<usize>()
            .map_err(|e| EngineError::Config(format!("MAX_POSITIONS: {e}")))?;

        let server_port = get("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| EngineError::Config(format!("SERVER_PORT: {e}")))?;

        let cfg = Self {
            mode,
            grid_min,
            grid_max,
            grid_points,
            max_positions,
            server_port,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> EngineResult<()> {
        if self.max_positions == 0 {
            return Err(EngineError::Config("MAX_POSITIONS must be at least 1".into()));
        }
        self.price_grid()
            .map(|_| ())
            .map_err(|e| EngineError::Config(format!("GRID_*: {e}")))
    }

    /// The grid every evaluation round is plotted on.
    pub fn price_grid(&self) -> EngineResult<PriceGrid> {
        PriceGrid::linspace(self.grid_min, self.grid_max, self.grid_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.mode, RunMode::Console);
        assert_eq!(cfg.grid_points, 1000);
        assert_eq!(cfg.max_positions, 5);
        assert_eq!(cfg.server_port, 3001);
        assert!((cfg.grid_min - 0.01).abs() < 1e-12);
        assert!((cfg.grid_max - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("APP_MODE", "Server"),
            ("GRID_POINTS", "50"),
            ("MAX_POSITIONS", "8"),
        ]))
        .unwrap();
        assert_eq!(cfg.mode, RunMode::Server);
        assert_eq!(cfg.grid_points, 50);
        assert_eq!(cfg.max_positions, 8);
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("GRID_MAX", "lots")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(ref m) if m.starts_with("GRID_MAX")), "{err}");
    }

    #[test]
    fn test_unbuildable_grid_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("GRID_MIN", "0")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)), "{err}");
    }

    #[test]
    fn test_zero_positions_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("MAX_POSITIONS", "0")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)), "{err}");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!("gui".parse::<RunMode>().is_err());
    }
}
