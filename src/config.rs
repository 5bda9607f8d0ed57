//! Configuration loading for sve
//!
//! Supports TOML configuration with embedded defaults. The distro tables
//! map each service to its unit name, config file and package.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, SveError};

/// Package manager used to look up installed versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageQuery {
    #[default]
    Pacman,
    Dpkg,
    Rpm,
}

/// General configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Distribution name override (skips /etc/os-release detection)
    pub distro: Option<String>,

    /// External rule catalog replacing the built-in rules
    pub catalog_file: Option<String>,
}

/// Per-distribution service tables
#[derive(Debug, Clone, Default)]
pub struct DistroConfig {
    pub package_query: PackageQuery,

    /// Service -> service manager unit name
    pub units: BTreeMap<String, String>,

    /// Service -> config file path
    pub configs: BTreeMap<String, String>,

    /// Service -> package name
    pub packages: BTreeMap<String, String>,
}

impl DistroConfig {
    fn new(package_query: PackageQuery, entries: &[(&str, &str, &str, &str)]) -> Self {
        let mut distro = DistroConfig {
            package_query,
            ..Default::default()
        };
        for (service, unit, config, package) in entries {
            distro.units.insert(service.to_string(), unit.to_string());
            distro.configs.insert(service.to_string(), config.to_string());
            distro.packages.insert(service.to_string(), package.to_string());
        }
        distro
    }

    /// Unit name for a service, defaulting to the service name
    pub fn unit<'a>(&'a self, service: &'a str) -> &'a str {
        self.units.get(service).map(String::as_str).unwrap_or(service)
    }

    /// Config file path for a service (expanded)
    pub fn config_path(&self, service: &str) -> Option<PathBuf> {
        self.configs.get(service).map(|p| Config::expand_path(p))
    }

    /// Package name for a service, defaulting to the unit name
    pub fn package<'a>(&'a self, service: &'a str) -> &'a str {
        self.packages
            .get(service)
            .map(String::as_str)
            .unwrap_or_else(|| self.unit(service))
    }

    pub fn knows(&self, service: &str) -> bool {
        self.configs.contains_key(service)
    }
}

/// A `[distros."NAME"]` table as written in a config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DistroOverride {
    package_query: Option<PackageQuery>,
    units: BTreeMap<String, String>,
    configs: BTreeMap<String, String>,
    packages: BTreeMap<String, String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    /// User tables are layered over the built-in ones, key by key
    #[serde(deserialize_with = "merge_distros")]
    pub distros: BTreeMap<String, DistroConfig>,
}

fn merge_distros<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, DistroConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, DistroOverride>::deserialize(deserializer)?;
    let mut distros = Config::default().distros;

    for (name, o) in overrides {
        let distro = distros.entry(name).or_default();
        if let Some(query) = o.package_query {
            distro.package_query = query;
        }
        distro.units.extend(o.units);
        distro.configs.extend(o.configs);
        distro.packages.extend(o.packages);
    }
    Ok(distros)
}

impl Default for Config {
    fn default() -> Self {
        let debian = [
            ("ftp", "vsftpd", "/etc/vsftpd.conf", "vsftpd"),
            ("ssh", "ssh", "/etc/ssh/sshd_config", "openssh-server"),
        ];

        let mut distros = BTreeMap::new();
        distros.insert(
            "Arch Linux".to_string(),
            DistroConfig::new(
                PackageQuery::Pacman,
                &[
                    ("ftp", "vsftpd", "/etc/vsftpd.conf", "vsftpd"),
                    ("ssh", "sshd", "/etc/ssh/sshd_config", "openssh"),
                ],
            ),
        );
        distros.insert(
            "Debian GNU/Linux".to_string(),
            DistroConfig::new(PackageQuery::Dpkg, &debian),
        );
        distros.insert("Ubuntu".to_string(), DistroConfig::new(PackageQuery::Dpkg, &debian));
        distros.insert(
            "Fedora Linux".to_string(),
            DistroConfig::new(
                PackageQuery::Rpm,
                &[
                    ("ftp", "vsftpd", "/etc/vsftpd/vsftpd.conf", "vsftpd"),
                    ("ssh", "sshd", "/etc/ssh/sshd_config", "openssh-server"),
                ],
            ),
        );

        Self {
            general: GeneralConfig::default(),
            distros,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Self {
        let config_paths = [
            // User-specific config
            dirs::config_dir().map(|p| p.join("sve/config.toml")),
            // System-wide config
            Some(PathBuf::from("/etc/sve/config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(e) => warn!("{}, using defaults", e),
                }
            }
        }

        Config::default()
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SveError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SveError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Look up the tables for a distribution
    pub fn distro(&self, name: &str) -> Result<&DistroConfig> {
        self.distros
            .get(name)
            .ok_or_else(|| SveError::UnknownDistro(name.to_string()))
    }

    /// Get the external catalog path (expanded)
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.general
            .catalog_file
            .as_ref()
            .map(|p| Self::expand_path(p))
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
# distro = "Arch Linux"
# catalog_file = "~/.config/sve/catalog.toml"

[distros."Arch Linux"]
package_query = "pacman"
units = { ftp = "vsftpd", ssh = "sshd" }
configs = { ftp = "/etc/vsftpd.conf", ssh = "/etc/ssh/sshd_config" }
packages = { ftp = "vsftpd", ssh = "openssh" }

[distros."Debian GNU/Linux"]
package_query = "dpkg"
units = { ftp = "vsftpd", ssh = "ssh" }
configs = { ftp = "/etc/vsftpd.conf", ssh = "/etc/ssh/sshd_config" }
packages = { ftp = "vsftpd", ssh = "openssh-server" }

[distros.Ubuntu]
package_query = "dpkg"
units = { ftp = "vsftpd", ssh = "ssh" }
configs = { ftp = "/etc/vsftpd.conf", ssh = "/etc/ssh/sshd_config" }
packages = { ftp = "vsftpd", ssh = "openssh-server" }

[distros."Fedora Linux"]
package_query = "rpm"
units = { ftp = "vsftpd", ssh = "sshd" }
configs = { ftp = "/etc/vsftpd/vsftpd.conf", ssh = "/etc/ssh/sshd_config" }
packages = { ftp = "vsftpd", ssh = "openssh-server" }
"#;
