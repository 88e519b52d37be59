use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tracing::{info, warn};

use crate::optimizer::SolverConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub solver: SolverConfig,
    /// Verbose logging requested via `PACKING_DEBUG`.
    pub debug: bool,
}

impl AppConfig {
    const DEBUG_VAR: &'static str = "PACKING_DEBUG";

    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            solver: solver_config_from_env(),
            debug: debug_from_env(),
        }
    }
}

/// Reads `PACKING_DEBUG`; unset or unparsable means off.
pub fn debug_from_env() -> bool {
    env_string(AppConfig::DEBUG_VAR)
        .and_then(|raw| parse_bool(&raw, AppConfig::DEBUG_VAR))
        .unwrap_or(false)
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 5051;
    const HOST_VAR: &'static str = "PACKING_HOST";
    const PORT_VAR: &'static str = "PACKING_PORT";

    fn from_env() -> Self {
        let host_value =
            env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        Self::from_parts(&host_value, env_string(Self::PORT_VAR).as_deref())
    }

    fn from_parts(host_value: &str, port_value: Option<&str>) -> Self {
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value.to_string()),
            Err(err) => {
                warn!(
                    var = Self::HOST_VAR,
                    value = host_value,
                    error = %err,
                    "Could not parse host, using {}",
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match port_value {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    warn!(
                        var = Self::PORT_VAR,
                        "Port must not be 0, using {}",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    warn!(
                        var = Self::PORT_VAR,
                        value = raw,
                        error = %err,
                        "Could not parse port, using {}",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

const GRID_STEP_VAR: &str = "PACKING_SOLVER_GRID_STEP";
const BALANCE_RATIO_VAR: &str = "PACKING_SOLVER_BALANCE_LIMIT_RATIO";
const ALLOW_ROTATION_VAR: &str = "PACKING_SOLVER_ALLOW_ROTATIONS";

/// Tuning of the heuristic solver.
fn solver_config_from_env() -> SolverConfig {
    let grid_step = load_f64_with_warning(
        GRID_STEP_VAR,
        f64::from(SolverConfig::DEFAULT_GRID_STEP),
        |value| value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX),
        "must be a whole number of centimeters >= 1",
        "Adjusted grid step changes the candidate positions",
    );

    let balance_limit_ratio = load_f64_with_warning(
        BALANCE_RATIO_VAR,
        SolverConfig::DEFAULT_BALANCE_LIMIT_RATIO,
        |value| (0.0..=1.0).contains(&value),
        "must be between 0 and 1",
        "Adjusted balance limit may shift the load off centre",
    );

    let allow_item_rotation = env_string(ALLOW_ROTATION_VAR)
        .and_then(|raw| parse_bool(&raw, ALLOW_ROTATION_VAR))
        .unwrap_or(SolverConfig::DEFAULT_ALLOW_ITEM_ROTATION);

    SolverConfig::builder()
        .grid_step(grid_step as u32)
        .balance_limit_ratio(balance_limit_ratio)
        .allow_item_rotation(allow_item_rotation)
        .build()
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(var = name, error = %err, "Access to environment variable failed, using default value");
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                var = var_name,
                value = other,
                "Could not interpret value as boolean, using default value"
            );
            None
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_with_warning(var_name, &raw, default, validator, invalid_hint, notice),
        None => default,
    }
}

fn parse_f64_with_warning(
    var_name: &str,
    raw: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if validator(value) => {
            let tolerance = (default.abs().max(1.0)) * 1e-9;
            if (value - default).abs() > tolerance {
                info!(var = var_name, value, "{}", notice);
            }
            value
        }
        Ok(_) => {
            warn!(
                var = var_name,
                value = raw,
                "Invalid value ({}), using {}",
                invalid_hint,
                default
            );
            default
        }
        Err(err) => {
            warn!(
                var = var_name,
                value = raw,
                error = %err,
                "Could not parse value as number, using {}",
                default
            );
            default
        }
    }
}
