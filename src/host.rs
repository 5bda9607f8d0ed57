//! Host facts: distribution, installed and active services, versions
//!
//! Everything that shells out lives behind the `Host` trait so the
//! target resolution logic can be tested without a service manager.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

use crate::config::{Config, DistroConfig, PackageQuery};
use crate::engine::catalog::Catalog;
use crate::error::{Result, SveError};

/// Queries against the running system
pub trait Host {
    /// Contents of /etc/os-release
    fn os_release(&self) -> Result<String>;

    /// Output of `systemctl list-unit-files`
    fn unit_files(&self) -> Result<String>;

    fn is_active(&self, unit: &str) -> bool;

    fn package_version(&self, query: PackageQuery, package: &str) -> Option<String>;
}

/// The real system, via /etc/os-release, systemctl and the package manager
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    fn output(program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| SveError::Host(format!("{}: {}", program, e)))?;
        if !output.status.success() {
            return Err(SveError::Host(format!(
                "{} {} exited with {}",
                program,
                args.join(" "),
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Host for SystemHost {
    fn os_release(&self) -> Result<String> {
        std::fs::read_to_string("/etc/os-release").map_err(|source| SveError::ConfigRead {
            path: PathBuf::from("/etc/os-release"),
            source,
        })
    }

    fn unit_files(&self) -> Result<String> {
        Self::output("systemctl", &["list-unit-files"])
    }

    fn is_active(&self, unit: &str) -> bool {
        Self::output("systemctl", &["is-active", unit])
            .map(|out| out.trim() == "active")
            .unwrap_or(false)
    }

    fn package_version(&self, query: PackageQuery, package: &str) -> Option<String> {
        let result = match query {
            // "vsftpd 3.0.5-1"
            PackageQuery::Pacman => Self::output("pacman", &["-Q", package])
                .map(|out| out.split_whitespace().nth(1).unwrap_or_default().to_string()),
            PackageQuery::Dpkg => Self::output("dpkg-query", &["-W", "--showformat=${Version}", package]),
            PackageQuery::Rpm => Self::output("rpm", &["-q", "--qf", "%{VERSION}", package]),
        };

        match result {
            Ok(version) if !version.trim().is_empty() => Some(version.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                debug!(%package, "version lookup failed: {}", e);
                None
            }
        }
    }
}

/// Extract the NAME= value from os-release contents
pub fn parse_distro(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("NAME="))
        .map(|value| value.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|name| !name.is_empty())
}

/// Resolve the distribution name: explicit override, else os-release
pub fn detect_distro(config: &Config, host: &dyn Host) -> Result<String> {
    if let Some(distro) = &config.general.distro {
        return Ok(distro.clone());
    }
    let os_release = host.os_release()?;
    parse_distro(&os_release)
        .ok_or_else(|| SveError::Host("no NAME= entry in /etc/os-release".to_string()))
}

/// Everything the engine needs to audit the requested services
#[derive(Debug, Clone, Default)]
pub struct Targets {
    /// Services to audit, in report order
    pub services: Vec<String>,

    pub config_paths: BTreeMap<String, PathBuf>,
    pub versions: BTreeMap<String, String>,

    /// Services whose unit is currently active
    pub active: Vec<String>,

    /// Requested services the distro table does not know
    pub unknown: Vec<String>,
}

impl Targets {
    pub fn is_active(&self, service: &str) -> bool {
        self.active.iter().any(|s| s == service)
    }
}

/// Work out which services to audit and where their configs live
///
/// With no explicit request, every catalog service that the distro knows
/// and that has an installed unit is audited. Explicitly requested
/// services are audited even when not installed, so a missing config is
/// reported rather than silently skipped.
pub fn resolve_targets(
    distro: &DistroConfig,
    catalog: &Catalog,
    requested: &[String],
    host: &dyn Host,
) -> Targets {
    let mut targets = Targets::default();

    let candidates: Vec<String> = if requested.is_empty() {
        let unit_files = host.unit_files().unwrap_or_else(|e| {
            warn!("cannot list installed services: {}", e);
            String::new()
        });
        catalog
            .services()
            .filter(|service| distro.knows(service))
            .filter(|service| is_installed(&unit_files, distro.unit(service)))
            .map(str::to_string)
            .collect()
    } else {
        let mut seen = Vec::new();
        for service in requested {
            if seen.contains(service) {
                continue;
            }
            seen.push(service.clone());
            if !distro.knows(service) {
                warn!(%service, "unknown service");
                targets.unknown.push(service.clone());
            }
        }
        seen.into_iter().filter(|s| distro.knows(s)).collect()
    };

    for service in candidates {
        if let Some(path) = distro.config_path(&service) {
            targets.config_paths.insert(service.clone(), path);
        }
        if let Some(version) = host.package_version(distro.package_query, distro.package(&service)) {
            targets.versions.insert(service.clone(), version);
        }
        if host.is_active(distro.unit(&service)) {
            targets.active.push(service.clone());
        }
        targets.services.push(service);
    }

    targets
}

fn is_installed(unit_files: &str, unit: &str) -> bool {
    let name = format!("{}.service", unit);
    unit_files
        .lines()
        .any(|line| line.split_whitespace().next() == Some(name.as_str()))
}
