use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use crate::optimizer::PackingConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub run: RunConfig,
    pub optimizer: OptimizerConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            run: RunConfig::from_env(),
            optimizer: OptimizerConfig::from_env(),
        }
    }
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
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "ULD_PACKER_API_HOST";
    const PORT_VAR: &'static str = "ULD_PACKER_API_PORT";

    fn from_env() -> Self {
        let host_value = env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = parse_setting(
            Self::PORT_VAR,
            env_string(Self::PORT_VAR),
            Self::DEFAULT_PORT,
            |value| value != 0,
            "must not be 0",
            None,
        );

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

    /// Configured port.
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

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Input and output locations of a batch run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    uld_file: PathBuf,
    package_file: PathBuf,
    output_file: PathBuf,
}

impl RunConfig {
    const DEFAULT_ULD_FILE: &'static str = "data/ulds.csv";
    const DEFAULT_PACKAGE_FILE: &'static str = "data/packages.csv";
    const DEFAULT_OUTPUT_FILE: &'static str = "output/placements.csv";

    pub fn new(
        uld_file: impl Into<PathBuf>,
        package_file: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            uld_file: uld_file.into(),
            package_file: package_file.into(),
            output_file: output_file.into(),
        }
    }

    fn from_env() -> Self {
        let path_var = |name: &str, default: &str| {
            PathBuf::from(env_string(name).unwrap_or_else(|| default.to_string()))
        };
        Self::new(
            path_var("ULD_PACKER_ULD_FILE", Self::DEFAULT_ULD_FILE),
            path_var("ULD_PACKER_PACKAGE_FILE", Self::DEFAULT_PACKAGE_FILE),
            path_var("ULD_PACKER_OUTPUT_FILE", Self::DEFAULT_OUTPUT_FILE),
        )
    }

    /// CSV file with the ULD records.
    pub fn uld_file(&self) -> &Path {
        &self.uld_file
    }

    /// CSV file with the package records.
    pub fn package_file(&self) -> &Path {
        &self.package_file
    }

    /// CSV file the placements are written to.
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }
}

/// Configuration for the placement engine.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    packing: PackingConfig,
}

impl OptimizerConfig {
    const PRIORITY_ULD_COST_VAR: &'static str = "ULD_PACKER_PRIORITY_ULD_COST";
    const COLLISION_CHECK_VAR: &'static str = "ULD_PACKER_COLLISION_CHECK";
    const WORKER_THREADS_VAR: &'static str = "ULD_PACKER_WORKER_THREADS";

    fn from_env() -> Self {
        let priority_uld_cost = parse_setting(
            Self::PRIORITY_ULD_COST_VAR,
            env_string(Self::PRIORITY_ULD_COST_VAR),
            PackingConfig::DEFAULT_PRIORITY_ULD_COST,
            priority_uld_cost_in_range,
            "must be at most 4294967295",
            Some("Adjusted priority ULD penalty changes every reported cost"),
        );

        let worker_threads = parse_setting(
            Self::WORKER_THREADS_VAR,
            env_string(Self::WORKER_THREADS_VAR),
            PackingConfig::DEFAULT_WORKER_THREADS,
            |threads| threads <= 1024,
            "must be between 0 and 1024",
            None,
        );

        let collision_check = env_string(Self::COLLISION_CHECK_VAR)
            .and_then(|raw| parse_bool(&raw, Self::COLLISION_CHECK_VAR))
            .unwrap_or(PackingConfig::DEFAULT_COLLISION_CHECK);
        if !collision_check {
            warn!(
                "{} is off: packages in a ULD may overlap (capacity-only packing).",
                Self::COLLISION_CHECK_VAR
            );
        }

        let packing = PackingConfig::builder()
            .priority_uld_cost(priority_uld_cost)
            .collision_check(collision_check)
            .worker_threads(worker_threads)
            .build();

        Self { packing }
    }

    /// Returns the configured PackingConfig.
    pub fn packing_config(&self) -> PackingConfig {
        self.packing
    }
}

fn priority_uld_cost_in_range(cost: u64) -> bool {
    cost <= PackingConfig::MAX_PRIORITY_ULD_COST
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
            warn!("Access to {} failed: {}. Using default value.", name, err);
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
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

/// Parses a numeric setting, falling back to `default` on absent, unparsable
/// or rejected values. `deviation_warning` is logged when a valid value
/// differs from the default.
fn parse_setting<T>(
    var_name: &str,
    raw: Option<String>,
    default: T,
    validator: impl Fn(T) -> bool,
    invalid_hint: &str,
    deviation_warning: Option<&str>,
) -> T
where
    T: FromStr + PartialEq + Display + Copy,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.parse::<T>() {
        Ok(value) if validator(value) => {
            if let Some(warning) = deviation_warning {
                if value != default {
                    warn!("{} ({} = {}).", warning, var_name, value);
                }
            }
            value
        }
        Ok(_) => {
            warn!(
                "{} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}
