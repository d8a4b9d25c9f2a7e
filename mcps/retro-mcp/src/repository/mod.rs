//! Cached access to the managed host's telemetry, plus privileged mutations
//!
//! Reads follow one shape: serve a fresh cache entry without touching the
//! host, otherwise fetch and parse, cache the result and return it. When the
//! host can't be reached the last known value is served even if it has
//! expired. Reads never fail.

pub mod commands;
mod error;

pub use error::{classify, MutationError, MutationErrorKind, MutationReport, TargetBreakdown};

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{Lookup, Resource, TelemetryCache};
use crate::parse;
use crate::remote::{RemoteCommandClient, TransportResult};
use crate::types::{BiosFile, CommandResult, HardwareScan, NetworkInterface, Package, Service, SystemInfo};

pub const DEFAULT_BIOS_DIR: &str = "/home/pi/RetroPie/BIOS";

/// Stdout of a command that ran and succeeded, empty otherwise
fn answered(result: &TransportResult<CommandResult>) -> &str {
    match result {
        Ok(result) => result.success_stdout(),
        Err(_) => "",
    }
}

pub struct TelemetryRepository {
    client: Arc<dyn RemoteCommandClient>,
    cache: TelemetryCache,
    bios_dir: String,
}

impl TelemetryRepository {
    pub fn new(client: Arc<dyn RemoteCommandClient>, cache: TelemetryCache) -> Self {
        Self {
            client,
            cache,
            bios_dir: DEFAULT_BIOS_DIR.to_string(),
        }
    }

    pub fn with_bios_dir(mut self, bios_dir: impl Into<String>) -> Self {
        self.bios_dir = bios_dir.into();
        self
    }

    pub fn cache(&self) -> &TelemetryCache {
        &self.cache
    }

    pub fn bios_dir(&self) -> &str {
        &self.bios_dir
    }

    async fn run(&self, command: &str) -> TransportResult<CommandResult> {
        self.execute(command, false).await
    }

    async fn execute(&self, command: &str, use_sudo: bool) -> TransportResult<CommandResult> {
        debug!(command, use_sudo, "dispatching remote command");
        let result = self.client.execute_command(command, use_sudo).await;
        match &result {
            Ok(result) if !result.success => {
                debug!(command, exit_code = result.exit_code, "remote command exited non-zero");
            }
            Err(e) => warn!(command, error = %e, "transport failure"),
            Ok(_) => {}
        }
        result
    }

    /// Core vital signs of the host
    ///
    /// Six commands are dispatched concurrently. A command that fails or
    /// prints something unexpected only defaults its own fields.
    pub async fn get_system_info(&self) -> SystemInfo {
        let stale = match self.cache.lookup_system_info() {
            Lookup::Fresh(info) => return info,
            other => other.into_value(),
        };

        let (hostname, temperature, memory, disk, uptime, proc_uptime) = tokio::join!(
            self.run(commands::HOSTNAME),
            self.run(commands::TEMPERATURE),
            self.run(commands::MEMORY),
            self.run(commands::DISK),
            self.run(commands::UPTIME),
            self.run(commands::PROC_UPTIME),
        );
        let unreachable = [&hostname, &temperature, &memory, &disk, &uptime, &proc_uptime]
            .iter()
            .any(|result| result.is_err());

        let memory = parse::parse_memory(answered(&memory));
        let disk = parse::parse_disk(answered(&disk));
        let info = SystemInfo {
            hostname: parse::parse_hostname(answered(&hostname)),
            cpu_temperature: parse::parse_temperature(answered(&temperature)),
            memory_total: memory.total,
            memory_used: memory.used,
            memory_free: memory.free,
            disk_total: disk.total,
            disk_used: disk.used,
            disk_free: disk.free,
            load_average: parse::parse_load_average(answered(&uptime)),
            uptime: parse::parse_uptime(answered(&proc_uptime)),
        };

        if unreachable {
            return self.fallback(Resource::SystemInfo, stale, info);
        }

        self.cache.cache_system_info(info.clone());
        info
    }

    /// Board model, clocks, voltage and throttling state
    pub async fn get_hardware_scan(&self) -> HardwareScan {
        let stale = match self.cache.lookup_hardware_scan() {
            Lookup::Fresh(scan) => return scan,
            other => other.into_value(),
        };

        let (model, temperature, voltage, clock, throttled) = tokio::join!(
            self.run(commands::BOARD_MODEL),
            self.run(commands::TEMPERATURE),
            self.run(commands::CORE_VOLTAGE),
            self.run(commands::ARM_CLOCK),
            self.run(commands::THROTTLED),
        );
        let unreachable = [&model, &temperature, &voltage, &clock, &throttled]
            .iter()
            .any(|result| result.is_err());

        let scan = HardwareScan {
            model: parse::parse_model(answered(&model)),
            gpu_temperature: parse::parse_temperature(answered(&temperature)),
            core_voltage: parse::parse_voltage(answered(&voltage)),
            arm_frequency_hz: parse::parse_clock(answered(&clock)),
            throttle: parse::parse_throttled(answered(&throttled)),
        };

        if unreachable {
            return self.fallback(Resource::HardwareScan, stale, scan);
        }

        self.cache.cache_hardware_scan(scan.clone());
        scan
    }

    /// Stale value if there is one, else the uncached best-effort record
    fn fallback<T>(&self, resource: Resource, stale: Option<T>, best_effort: T) -> T {
        match stale {
            Some(value) => {
                warn!(resource = %resource, "host unreachable, serving stale data");
                value
            }
            None => {
                warn!(resource = %resource, "host unreachable and nothing cached, returning partial data");
                best_effort
            }
        }
    }

    pub async fn get_network_interfaces(&self) -> Vec<NetworkInterface> {
        self.read_through(
            Resource::NetworkScan,
            self.cache.lookup_network_scan(),
            commands::NETWORK_INTERFACES,
            parse::parse_network_interfaces,
            TelemetryCache::cache_network_scan,
        )
        .await
    }

    pub async fn get_packages(&self) -> Vec<Package> {
        self.read_through(
            Resource::PackageList,
            self.cache.lookup_package_list(),
            commands::LIST_PACKAGES,
            parse::parse_packages,
            TelemetryCache::cache_package_list,
        )
        .await
    }

    pub async fn get_services(&self) -> Vec<Service> {
        self.read_through(
            Resource::ServiceStatus,
            self.cache.lookup_service_status(),
            commands::LIST_SERVICES,
            parse::parse_services,
            TelemetryCache::cache_service_status,
        )
        .await
    }

    /// Cache-aside read of a list produced by a single command
    ///
    /// A non-zero exit is handled like an unreachable host: stale data if
    /// any, otherwise an empty list, and nothing is cached.
    async fn read_through<T: Clone>(
        &self,
        resource: Resource,
        lookup: Lookup<Vec<T>>,
        command: &str,
        parse: fn(&str) -> Vec<T>,
        store: fn(&TelemetryCache, Vec<T>),
    ) -> Vec<T> {
        let stale = match lookup {
            Lookup::Fresh(items) => return items,
            other => other.into_value(),
        };

        match self.run(command).await {
            Ok(result) if result.success => {
                let items = parse(&result.stdout);
                store(&self.cache, items.clone());
                items
            }
            Ok(result) => {
                warn!(resource = %resource, exit_code = result.exit_code, "listing command failed");
                self.fallback(resource, stale, Vec::new())
            }
            Err(_) => self.fallback(resource, stale, Vec::new()),
        }
    }

    /// BIOS images anywhere under the configured directory, with their sizes
    ///
    /// Not cached. find exits non-zero on an unreadable subdirectory but still
    /// lists everything else, so its output is used whatever the exit code.
    /// Sizes are queried one path at a time; a failed size query leaves that
    /// file's size empty.
    pub async fn get_bios_files(&self) -> Vec<BiosFile> {
        let command = match commands::find_bios_files(&self.bios_dir) {
            Ok(command) => command,
            Err(e) => {
                warn!(bios_dir = %self.bios_dir, error = %e, "unusable BIOS directory");
                return Vec::new();
            }
        };

        let paths = match self.run(&command).await {
            Ok(result) => {
                if !result.success {
                    warn!(bios_dir = %self.bios_dir, exit_code = result.exit_code, "BIOS listing incomplete");
                }
                parse::parse_bios_listing(&result.stdout)
            }
            Err(_) => return Vec::new(),
        };

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let size = match commands::file_size(&path) {
                Ok(command) => match self.run(&command).await {
                    Ok(result) => parse::parse_file_size(result.success_stdout()),
                    Err(_) => None,
                },
                Err(_) => None,
            };
            let name = parse::bios_display_name(&path).to_string();
            files.push(BiosFile {
                system: parse::guess_bios_system(&name).to_string(),
                name,
                path,
                present: true,
                required: true,
                size,
            });
        }
        files
    }

    /// Install packages with apt, refreshing the index first
    ///
    /// An empty list succeeds without contacting the host.
    pub async fn install_packages(&self, names: &[String]) -> Result<CommandResult, MutationError> {
        if names.is_empty() {
            return Ok(CommandResult::no_op("No packages specified"));
        }
        let command = commands::install_packages(names)?;
        self.mutate_packages(names, &command, true).await
    }

    pub async fn remove_packages(&self, names: &[String]) -> Result<CommandResult, MutationError> {
        if names.is_empty() {
            return Ok(CommandResult::no_op("No packages specified"));
        }
        let command = commands::remove_packages(names)?;
        self.mutate_packages(names, &command, false).await
    }

    /// Run an apt mutation whose targets should end up `installed` or not
    async fn mutate_packages(
        &self,
        names: &[String],
        command: &str,
        installed: bool,
    ) -> Result<CommandResult, MutationError> {
        let outcome = self.execute(command, true).await;
        self.cache.invalidate_package_list();

        let result = outcome?;
        let missing = parse::parse_missing_packages(&result.stderr);
        let applied = if result.success || missing.is_empty() {
            Vec::new()
        } else {
            let rest: Vec<String> = names.iter().filter(|name| !missing.contains(name)).cloned().collect();
            self.packages_in_state(&rest, installed).await
        };
        let outcome = classify(names, missing, &applied, result);
        match &outcome {
            Ok(_) => info!(packages = ?names, "package operation succeeded"),
            Err(e) => error!(packages = ?names, error = %e, "package operation failed"),
        }
        outcome
    }

    /// Which of `names` dpkg currently reports as installed (or not)
    ///
    /// Names dpkg has never heard of count as not installed. If the query
    /// cannot be run nothing is confirmed.
    async fn packages_in_state(&self, names: &[String], installed: bool) -> Vec<String> {
        if names.is_empty() {
            return Vec::new();
        }
        let command = match commands::query_packages(names) {
            Ok(command) => command,
            Err(_) => return Vec::new(),
        };
        let packages = match self.run(&command).await {
            Ok(result) => parse::parse_packages(&result.stdout),
            Err(_) => return Vec::new(),
        };

        names
            .iter()
            .filter(|name| {
                let is_installed = packages.iter().any(|p| &p.name == *name && p.installed);
                is_installed == installed
            })
            .cloned()
            .collect()
    }

    /// Refresh the package index and upgrade everything
    pub async fn update_system(&self) -> Result<CommandResult, MutationError> {
        let outcome = self.execute(commands::UPDATE_SYSTEM, true).await;
        self.cache.invalidate_package_list();

        let result = outcome?;
        if result.success {
            info!(execution_time = result.execution_time, "system updated");
            Ok(result)
        } else {
            error!(exit_code = result.exit_code, "system update failed");
            Err(MutationError::CommandFailed { result })
        }
    }

    pub async fn restart_service(&self, name: &str) -> Result<CommandResult, MutationError> {
        let command = commands::restart_service(name)?;
        let outcome = self.execute(&command, true).await;
        self.cache.invalidate_service_status();

        let result = outcome?;
        let missing = parse::parse_missing_units(&result.stderr);
        let outcome = classify(&[name.to_string()], missing, &[], result);
        match &outcome {
            Ok(_) => info!(service = name, "service restarted"),
            Err(e) => error!(service = name, error = %e, "service restart failed"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ScriptedClient;

    fn repository(client: ScriptedClient) -> (TelemetryRepository, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let repo = TelemetryRepository::new(client.clone(), TelemetryCache::new());
        (repo, client)
    }

    #[tokio::test]
    async fn test_hardware_scan_cached() {
        let client = ScriptedClient::new()
            .respond(commands::BOARD_MODEL, "Raspberry Pi 4 Model B Rev 1.4\0")
            .respond(commands::TEMPERATURE, "temp=48.2'C\n")
            .respond(commands::CORE_VOLTAGE, "volt=0.8500V\n")
            .respond(commands::ARM_CLOCK, "frequency(48)=1500398464\n")
            .respond(commands::THROTTLED, "throttled=0x50000\n");
        let (repo, client) = repository(client);

        let scan = repo.get_hardware_scan().await;
        assert_eq!(scan.model, "Raspberry Pi 4 Model B Rev 1.4");
        assert_eq!(scan.arm_frequency_mhz(), 1500);
        assert!(scan.throttle.under_voltage_occurred);
        assert!(!scan.throttle.under_voltage);
        assert_eq!(client.call_count(), 5);

        assert_eq!(repo.get_hardware_scan().await, scan);
        assert_eq!(client.call_count(), 5);
    }

    #[tokio::test]
    async fn test_failed_listing_is_not_cached() {
        let client = ScriptedClient::new().respond_with(commands::LIST_SERVICES, 1, "", "Failed to connect to bus");
        let (repo, client) = repository(client);

        assert!(repo.get_services().await.is_empty());
        assert!(repo.get_services().await.is_empty());
        assert_eq!(client.call_count(), 2);
        assert!(repo.cache().get_service_status().is_none());
    }

    #[tokio::test]
    async fn test_bios_files_with_sizes() {
        let find = commands::find_bios_files(DEFAULT_BIOS_DIR).unwrap();
        let client = ScriptedClient::new()
            .respond(
                find,
                "/home/pi/RetroPie/BIOS/scph1001.bin\n/home/pi/RetroPie/BIOS/gba_bios.bin\n",
            )
            .respond("stat -c%s /home/pi/RetroPie/BIOS/scph1001.bin", "524288\n");
        let (repo, client) = repository(client);

        let files = repo.get_bios_files().await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "scph1001.bin");
        assert_eq!(files[0].system, "psx");
        assert_eq!(files[0].size, Some(524288));
        assert!(files[0].present && files[0].required);
        assert_eq!(files[1].system, "gba");
        assert_eq!(files[1].size, None);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_bios_dir() {
        let find = commands::find_bios_files("/srv/bios").unwrap();
        let client = ScriptedClient::new().respond(find, "");
        let (repo, _client) = repository(client);
        let repo = repo.with_bios_dir("/srv/bios");

        assert!(repo.get_bios_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_bios_files_in_subdirectories() {
        let find = commands::find_bios_files(DEFAULT_BIOS_DIR).unwrap();
        let client = ScriptedClient::new().respond(
            find,
            "/home/pi/RetroPie/BIOS/dc/dc_boot.bin\n/home/pi/RetroPie/BIOS/dc/dc_flash.bin\n",
        );
        let (repo, _client) = repository(client);

        let files = repo.get_bios_files().await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "dc_boot.bin");
        assert_eq!(files[0].path, "/home/pi/RetroPie/BIOS/dc/dc_boot.bin");
        assert_eq!(files[0].system, "dreamcast");
    }

    #[tokio::test]
    async fn test_bios_listing_kept_when_find_exits_nonzero() {
        let find = commands::find_bios_files(DEFAULT_BIOS_DIR).unwrap();
        let client = ScriptedClient::new()
            .respond_with(find, 1, "/home/pi/RetroPie/BIOS/scph1001.bin\n", "")
            .respond("stat -c%s /home/pi/RetroPie/BIOS/scph1001.bin", "524288\n");
        let (repo, _client) = repository(client);

        let files = repo.get_bios_files().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "scph1001.bin");
        assert_eq!(files[0].size, Some(524288));
    }

    #[tokio::test]
    async fn test_aborted_install_confirms_remaining_packages() {
        let names = vec!["vim".to_string(), "fake1".to_string()];
        let install = commands::install_packages(&names).unwrap();
        let query = commands::query_packages(&["vim".to_string()]).unwrap();
        let client = ScriptedClient::new()
            .respond_with(install, 100, "", "E: Unable to locate package fake1\n")
            .respond(query, "vim|2:9.0.1378-2|unknown ok not-installed\n");
        let (repo, client) = repository(client);

        match repo.install_packages(&names).await.unwrap_err() {
            MutationError::NotFound { missing, .. } => assert_eq!(missing, vec!["fake1".to_string()]),
            other => panic!("expected not found, got {other:?}"),
        }
        assert_eq!(client.call_count(), 2);
        assert!(!client.calls()[1].use_sudo);
    }

    #[tokio::test]
    async fn test_remove_counts_absent_packages_as_applied() {
        let names = vec!["htop".to_string(), "fake1".to_string()];
        let remove = commands::remove_packages(&names).unwrap();
        let query = commands::query_packages(&["htop".to_string()]).unwrap();
        let client = ScriptedClient::new()
            .respond_with(remove, 100, "", "E: Unable to locate package fake1\n")
            .respond_with(query, 1, "", "dpkg-query: no packages found matching htop\n");
        let (repo, _client) = repository(client);

        match repo.remove_packages(&names).await.unwrap_err() {
            MutationError::PartialFailure { breakdown, .. } => {
                assert_eq!(breakdown.succeeded, vec!["htop".to_string()]);
                assert_eq!(breakdown.failed, vec!["fake1".to_string()]);
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_name_makes_no_call() {
        let (repo, client) = repository(ScriptedClient::new());

        let err = repo.restart_service("").await.unwrap_err();
        assert_eq!(err.kind(), MutationErrorKind::InvalidArgument);
        let err = repo.install_packages(&["ok".to_string(), "-y".to_string()]).await.unwrap_err();
        assert_eq!(err.kind(), MutationErrorKind::InvalidArgument);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_restart_missing_unit() {
        let command = commands::restart_service("nosuch").unwrap();
        let client = ScriptedClient::new().respond_with(
            command,
            5,
            "",
            "Failed to restart nosuch.service: Unit nosuch.service not found.\n",
        );
        let (repo, client) = repository(client);
        repo.cache().cache_service_status(Vec::new());

        let err = repo.restart_service("nosuch").await.unwrap_err();
        assert_eq!(err.kind(), MutationErrorKind::NotFound);
        assert!(repo.cache().get_service_status().is_none());
        assert!(client.calls()[0].use_sudo);
    }

    #[tokio::test]
    async fn test_update_system_unreachable() {
        let (repo, _client) = repository(ScriptedClient::unreachable());
        repo.cache().cache_package_list(Vec::new());

        let err = repo.update_system().await.unwrap_err();
        assert_eq!(err.kind(), MutationErrorKind::Unreachable);
        assert!(err.command_result().is_none());
        assert!(repo.cache().get_package_list().is_none());
    }
}
