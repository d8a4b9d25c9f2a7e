//! Repository behavior against a scripted host

use std::sync::Arc;
use std::time::Duration;

use retro_mcp::repository::commands;
use retro_mcp::types::{LoadAverage, Package, SystemInfo};
use retro_mcp::{
    CacheTtls, MutationError, RemoteCommandClient, ScriptedClient, TelemetryCache,
    TelemetryRepository,
};

const FREE_OUTPUT: &str = "\
               total        used        free      shared  buff/cache   available
Mem:      1073741824   536870912   536870912    10485760   209715200   400000000
Swap:      104857600           0   104857600
";

const DF_OUTPUT: &str = "\
Filesystem       1B-blocks        Used   Available Use% Mounted on
/dev/root      31037849600  8123456512 21610000000  28% /
";

fn healthy_host() -> ScriptedClient {
    ScriptedClient::new()
        .respond(commands::HOSTNAME, "retropie\n")
        .respond(commands::TEMPERATURE, "temp=55.4'C\n")
        .respond(commands::MEMORY, FREE_OUTPUT)
        .respond(commands::DISK, DF_OUTPUT)
        .respond(
            commands::UPTIME,
            " 14:02:11 up 3 days,  2:11,  1 user,  load average: 0.52, 0.58, 0.59\n",
        )
        .respond(commands::PROC_UPTIME, "267071.42 1012345.67\n")
}

fn repository(client: ScriptedClient) -> (TelemetryRepository, Arc<ScriptedClient>) {
    repository_with_cache(client, TelemetryCache::new())
}

fn repository_with_cache(
    client: ScriptedClient,
    cache: TelemetryCache,
) -> (TelemetryRepository, Arc<ScriptedClient>) {
    let client = Arc::new(client);
    let repo = TelemetryRepository::new(client.clone(), cache);
    (repo, client)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// System info
// ============================================================================

#[tokio::test]
async fn test_system_info_assembled_from_six_commands() {
    let (repo, client) = repository(healthy_host());

    let info = repo.get_system_info().await;
    assert_eq!(info.hostname, "retropie");
    assert_eq!(info.cpu_temperature, 55.4);
    assert_eq!(info.memory_total, 1_073_741_824);
    assert_eq!(info.memory_used, 536_870_912);
    assert_eq!(info.memory_free, 536_870_912);
    assert_eq!(info.disk_total, 31_037_849_600);
    assert_eq!(info.disk_used, 8_123_456_512);
    assert_eq!(info.disk_free, 21_610_000_000);
    assert_eq!(info.load_average, LoadAverage::new(0.52, 0.58, 0.59));
    assert_eq!(info.uptime, 267_071);

    let mut commands_sent: Vec<String> = client.calls().into_iter().map(|c| c.command).collect();
    commands_sent.sort();
    let mut expected = vec![
        commands::HOSTNAME,
        commands::TEMPERATURE,
        commands::MEMORY,
        commands::DISK,
        commands::UPTIME,
        commands::PROC_UPTIME,
    ];
    expected.sort();
    assert_eq!(commands_sent, expected);
    assert!(client.calls().iter().all(|c| !c.use_sudo));
}

#[tokio::test]
async fn test_second_call_within_ttl_is_served_from_cache() {
    let (repo, client) = repository(healthy_host());

    let first = repo.get_system_info().await;
    assert_eq!(client.call_count(), 6);

    let second = repo.get_system_info().await;
    assert_eq!(second, first);
    assert_eq!(client.call_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_refetch_after_ttl() {
    let (repo, client) = repository(healthy_host());

    repo.get_system_info().await;
    tokio::time::advance(Duration::from_secs(31)).await;
    repo.get_system_info().await;

    assert_eq!(client.call_count(), 12);
}

#[tokio::test]
async fn test_minimal_outputs() {
    let client = ScriptedClient::new()
        .respond(commands::HOSTNAME, "retropie")
        .respond(commands::TEMPERATURE, "temp=55.4'C")
        .respond(commands::MEMORY, "Mem: 1073741824 536870912 536870912");
    let (repo, _client) = repository(client);

    let info = repo.get_system_info().await;
    assert_eq!(info.hostname, "retropie");
    assert_eq!(info.cpu_temperature, 55.4);
    assert_eq!(info.memory_total, 1_073_741_824);
    assert_eq!(info.memory_used, 536_870_912);
    assert_eq!(info.memory_free, 536_870_912);
}

#[tokio::test]
async fn test_malformed_temperature_only_defaults_that_field() {
    let client = healthy_host().respond(commands::TEMPERATURE, "VCHI initialization failed\n");
    let (repo, _client) = repository(client);

    let info = repo.get_system_info().await;
    assert_eq!(info.cpu_temperature, 0.0);
    assert_eq!(info.hostname, "retropie");
    assert_eq!(info.memory_total, 1_073_741_824);
    assert_eq!(info.uptime, 267_071);
}

#[tokio::test]
async fn test_failed_subcommand_still_caches_record() {
    let client = healthy_host().respond_with(commands::DISK, 1, "", "df: /: No such file");
    let (repo, client) = repository(client);

    let info = repo.get_system_info().await;
    assert_eq!(info.disk_total, 0);
    assert_eq!(info.hostname, "retropie");

    repo.get_system_info().await;
    assert_eq!(client.call_count(), 6);
}

// ============================================================================
// Stale fallback
// ============================================================================

#[tokio::test]
async fn test_cached_value_served_without_calling_failing_host() {
    let cache = TelemetryCache::new();
    let cached = SystemInfo {
        hostname: "cached-hostname".to_string(),
        cpu_temperature: 42.0,
        ..SystemInfo::default()
    };
    cache.cache_system_info(cached.clone());

    let (repo, client) = repository_with_cache(ScriptedClient::unreachable(), cache);
    assert_eq!(repo.get_system_info().await, cached);
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_expired_value_served_when_host_unreachable() {
    let cache = TelemetryCache::with_ttls(CacheTtls {
        system_info: 0,
        ..CacheTtls::default()
    });
    let stale = SystemInfo {
        hostname: "stale-hostname".to_string(),
        ..SystemInfo::default()
    };
    cache.cache_system_info(stale.clone());

    let (repo, client) = repository_with_cache(ScriptedClient::unreachable(), cache);
    assert_eq!(repo.get_system_info().await, stale);
    assert_eq!(client.call_count(), 6);
}

#[tokio::test]
async fn test_unreachable_with_empty_cache_returns_defaults_uncached() {
    let (repo, _client) = repository(ScriptedClient::unreachable());

    let info = repo.get_system_info().await;
    assert_eq!(info, SystemInfo::default());
    assert_eq!(repo.cache().get_cache_stats().entries, 0);
}

#[tokio::test]
async fn test_host_recovers_after_outage() {
    let (repo, client) = repository(healthy_host());
    repo.cache().set_ttl(retro_mcp::Resource::SystemInfo, 0);

    client.set_unreachable(true);
    assert_eq!(repo.get_system_info().await.hostname, "unknown");

    client.set_unreachable(false);
    assert_eq!(repo.get_system_info().await.hostname, "retropie");

    client.set_unreachable(true);
    assert_eq!(repo.get_system_info().await.hostname, "retropie");
}

#[tokio::test]
async fn test_package_list_stale_on_listing_failure() {
    let cache = TelemetryCache::with_ttls(CacheTtls {
        package_list: 0,
        ..CacheTtls::default()
    });
    let stale = vec![Package {
        name: "retroarch".to_string(),
        version: "1.15.0".to_string(),
        installed: true,
    }];
    cache.cache_package_list(stale.clone());

    let client = ScriptedClient::new().respond_with(
        commands::LIST_PACKAGES,
        2,
        "",
        "dpkg-query: error: cannot access archive",
    );
    let (repo, _client) = repository_with_cache(client, cache);
    assert_eq!(repo.get_packages().await, stale);
}

// ============================================================================
// Shared cache
// ============================================================================

#[tokio::test]
async fn test_repositories_share_one_cache() {
    let cache = TelemetryCache::new();
    let (writer, writer_client) = repository_with_cache(healthy_host(), cache.clone());
    let (reader, reader_client) = repository_with_cache(ScriptedClient::unreachable(), cache);

    let written = writer.get_system_info().await;
    assert_eq!(writer_client.call_count(), 6);

    assert_eq!(reader.get_system_info().await, written);
    assert_eq!(reader_client.call_count(), 0);
}

#[tokio::test]
async fn test_invalidate_is_idempotent() {
    let (repo, _client) = repository(healthy_host());
    repo.get_system_info().await;

    repo.cache().invalidate_system_info();
    assert!(repo.cache().get_system_info().is_none());
    repo.cache().invalidate_system_info();
    assert!(repo.cache().get_system_info().is_none());
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_install_escapes_injected_names() {
    let (repo, client) = repository(ScriptedClient::new());

    let _ = repo.install_packages(&names(&["vim; rm -rf /"])).await;

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].use_sudo);

    let words = shlex::split(&calls[0].command).expect("command must be valid shell");
    assert!(words.contains(&"vim; rm -rf /".to_string()));
    assert!(!words.iter().any(|w| w == "rm" || w == "rm -rf /"));
}

#[tokio::test]
async fn test_empty_install_is_no_op() {
    let (repo, client) = repository(ScriptedClient::new());

    let result = repo.install_packages(&[]).await.unwrap();
    assert!(result.success);
    let result = repo.remove_packages(&[]).await.unwrap();
    assert!(result.success);
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_install_success_invalidates_package_list() {
    let targets = names(&["retroarch"]);
    let command = commands::install_packages(&targets).unwrap();
    let client = ScriptedClient::new().respond(command, "Setting up retroarch (1.15.0) ...\n");
    let (repo, _client) = repository(client);
    repo.cache().cache_package_list(Vec::new());

    let result = repo.install_packages(&targets).await.unwrap();
    assert_eq!(result.exit_code, 0);
    assert!(repo.cache().get_package_list().is_none());
}

#[tokio::test]
async fn test_install_all_missing_is_not_found() {
    let targets = names(&["fake1", "fake2"]);
    let command = commands::install_packages(&targets).unwrap();
    let client = ScriptedClient::new().respond_with(
        command,
        100,
        "Reading package lists...\n",
        "E: Unable to locate package fake1\nE: Unable to locate package fake2\n",
    );
    let (repo, _client) = repository(client);

    match repo.install_packages(&targets).await {
        Err(MutationError::NotFound { missing, result }) => {
            assert_eq!(missing, targets);
            assert_eq!(result.exit_code, 100);
            assert!(result.stdout.contains("Reading package lists"));
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_install_some_missing_is_partial_failure() {
    let targets = names(&["vim", "fake1", "htop"]);
    let command = commands::install_packages(&targets).unwrap();
    let query = commands::query_packages(&names(&["vim", "htop"])).unwrap();
    let client = ScriptedClient::new()
        .respond_with(command, 100, "", "E: Unable to locate package fake1\n")
        .respond(
            query,
            "vim|2:9.0.1378-2|install ok installed\nhtop|3.2.2-2|unknown ok not-installed\n",
        );
    let (repo, client) = repository(client);

    match repo.install_packages(&targets).await {
        Err(MutationError::PartialFailure { breakdown, result }) => {
            assert_eq!(breakdown.succeeded, names(&["vim"]));
            assert_eq!(breakdown.failed, names(&["fake1"]));
            assert_eq!(breakdown.unchanged, names(&["htop"]));
            assert_eq!(breakdown.total, 3);
            assert!(result.stderr.contains("fake1"));
        }
        other => panic!("expected partial failure, got {other:?}"),
    }
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_install_aborted_by_missing_package_reports_nothing_succeeded() {
    let targets = names(&["vim", "fake1"]);
    let command = commands::install_packages(&targets).unwrap();
    // the follow-up dpkg-query prints nothing, so vim is not confirmed
    let client = ScriptedClient::new().respond_with(command, 100, "", "E: Unable to locate package fake1\n");
    let (repo, _client) = repository(client);

    match repo.install_packages(&targets).await {
        Err(MutationError::NotFound { missing, .. }) => assert_eq!(missing, names(&["fake1"])),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_install_duplicate_targets_counted_once() {
    let targets = names(&["fake1", "fake1"]);
    let command = commands::install_packages(&targets).unwrap();
    let client = ScriptedClient::new().respond_with(command, 100, "", "E: Unable to locate package fake1\n");
    let (repo, client) = repository(client);

    match repo.install_packages(&targets).await {
        Err(MutationError::NotFound { missing, .. }) => assert_eq!(missing, names(&["fake1"])),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_install_unreachable() {
    let (repo, _client) = repository(ScriptedClient::unreachable());
    let err = repo.install_packages(&names(&["vim"])).await.unwrap_err();
    assert!(matches!(err, MutationError::Unreachable(_)));
}

#[tokio::test]
async fn test_remove_failure_carries_command_result() {
    let targets = names(&["retroarch"]);
    let command = commands::remove_packages(&targets).unwrap();
    let client = ScriptedClient::new().respond_with(
        command,
        100,
        "",
        "E: Could not get lock /var/lib/dpkg/lock-frontend\n",
    );
    let (repo, _client) = repository(client);

    let err = repo.remove_packages(&targets).await.unwrap_err();
    let result = err.command_result().expect("host was reached");
    assert_eq!(result.exit_code, 100);
    assert!(matches!(err, MutationError::CommandFailed { .. }));
}

#[tokio::test]
async fn test_update_system_invalidates_package_list() {
    let client = ScriptedClient::new().respond(commands::UPDATE_SYSTEM, "0 upgraded\n");
    let (repo, client) = repository(client);
    repo.cache().cache_package_list(Vec::new());

    repo.update_system().await.unwrap();
    assert!(repo.cache().get_package_list().is_none());
    assert!(client.calls()[0].use_sudo);
}

#[tokio::test]
async fn test_restart_service_invalidates_service_status() {
    let command = commands::restart_service("emulationstation").unwrap();
    let client = ScriptedClient::new().respond(command, "");
    let (repo, _client) = repository(client);
    repo.cache().cache_service_status(Vec::new());

    repo.restart_service("emulationstation").await.unwrap();
    assert!(repo.cache().get_service_status().is_none());
}

#[tokio::test]
async fn test_client_usable_as_trait_object() {
    let client: Arc<dyn RemoteCommandClient> = Arc::new(healthy_host());
    let result = client.execute_command(commands::HOSTNAME, false).await.unwrap();
    assert_eq!(result.stdout.trim(), "retropie");
}
