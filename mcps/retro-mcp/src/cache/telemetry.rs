//! Named telemetry resources over a shared TTL cache

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ttl::{CacheStats, Lookup, TtlCache};
use crate::types::{HardwareScan, NetworkInterface, Package, Service, SystemInfo};

/// Cacheable resource categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    SystemInfo,
    HardwareScan,
    NetworkScan,
    ServiceStatus,
    PackageList,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::SystemInfo,
        Resource::HardwareScan,
        Resource::NetworkScan,
        Resource::ServiceStatus,
        Resource::PackageList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::SystemInfo => "system_info",
            Resource::HardwareScan => "hardware_scan",
            Resource::NetworkScan => "network_scan",
            Resource::ServiceStatus => "service_status",
            Resource::PackageList => "package_list",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name.trim())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached value, one variant per resource
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    SystemInfo(SystemInfo),
    HardwareScan(HardwareScan),
    Network(Vec<NetworkInterface>),
    Services(Vec<Service>),
    Packages(Vec<Package>),
}

/// Freshness window per resource, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtls {
    pub system_info: u64,
    pub hardware_scan: u64,
    pub network_scan: u64,
    pub service_status: u64,
    pub package_list: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            system_info: 30,
            hardware_scan: 300,
            network_scan: 60,
            service_status: 30,
            package_list: 120,
        }
    }
}

impl CacheTtls {
    pub fn for_resource(&self, resource: Resource) -> u64 {
        match resource {
            Resource::SystemInfo => self.system_info,
            Resource::HardwareScan => self.hardware_scan,
            Resource::NetworkScan => self.network_scan,
            Resource::ServiceStatus => self.service_status,
            Resource::PackageList => self.package_list,
        }
    }

    pub fn set_for_resource(&mut self, resource: Resource, ttl_seconds: u64) {
        let slot = match resource {
            Resource::SystemInfo => &mut self.system_info,
            Resource::HardwareScan => &mut self.hardware_scan,
            Resource::NetworkScan => &mut self.network_scan,
            Resource::ServiceStatus => &mut self.service_status,
            Resource::PackageList => &mut self.package_list,
        };
        *slot = ttl_seconds;
    }
}

/// Cache of remote telemetry, keyed by [`Resource`]
///
/// Clones share the same table, counters and TTLs, so every repository
/// built from one instance sees the others' writes.
#[derive(Clone, Default)]
pub struct TelemetryCache {
    store: Arc<TtlCache<Resource, Snapshot>>,
    ttls: Arc<RwLock<CacheTtls>>,
}

impl TelemetryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttls(ttls: CacheTtls) -> Self {
        Self {
            store: Arc::default(),
            ttls: Arc::new(RwLock::new(ttls)),
        }
    }

    pub fn ttls(&self) -> CacheTtls {
        *self.ttls.read()
    }

    pub fn ttl(&self, resource: Resource) -> u64 {
        self.ttls.read().for_resource(resource)
    }

    /// Change the TTL used for future writes of `resource`
    pub fn set_ttl(&self, resource: Resource, ttl_seconds: u64) {
        self.ttls.write().set_for_resource(resource, ttl_seconds);
    }

    fn store(&self, resource: Resource, snapshot: Snapshot) {
        let ttl = self.ttl(resource);
        debug!(resource = %resource, ttl_seconds = ttl, "Caching snapshot");
        self.store.set(resource, snapshot, ttl);
    }

    pub fn invalidate(&self, resource: Resource) {
        debug!(resource = %resource, "Invalidating cache entry");
        self.store.invalidate(&resource);
    }

    // System info

    pub fn cache_system_info(&self, info: SystemInfo) {
        self.store(Resource::SystemInfo, Snapshot::SystemInfo(info));
    }

    pub fn get_system_info(&self) -> Option<SystemInfo> {
        match self.store.get(&Resource::SystemInfo)? {
            Snapshot::SystemInfo(info) => Some(info),
            _ => None,
        }
    }

    pub fn lookup_system_info(&self) -> Lookup<SystemInfo> {
        self.store
            .lookup(&Resource::SystemInfo)
            .and_then(|snapshot| match snapshot {
                Snapshot::SystemInfo(info) => Some(info),
                _ => None,
            })
    }

    pub fn invalidate_system_info(&self) {
        self.invalidate(Resource::SystemInfo);
    }

    // Hardware scan

    pub fn cache_hardware_scan(&self, scan: HardwareScan) {
        self.store(Resource::HardwareScan, Snapshot::HardwareScan(scan));
    }

    pub fn get_hardware_scan(&self) -> Option<HardwareScan> {
        match self.store.get(&Resource::HardwareScan)? {
            Snapshot::HardwareScan(scan) => Some(scan),
            _ => None,
        }
    }

    pub fn lookup_hardware_scan(&self) -> Lookup<HardwareScan> {
        self.store
            .lookup(&Resource::HardwareScan)
            .and_then(|snapshot| match snapshot {
                Snapshot::HardwareScan(scan) => Some(scan),
                _ => None,
            })
    }

    pub fn invalidate_hardware_scan(&self) {
        self.invalidate(Resource::HardwareScan);
    }

    // Network scan

    pub fn cache_network_scan(&self, interfaces: Vec<NetworkInterface>) {
        self.store(Resource::NetworkScan, Snapshot::Network(interfaces));
    }

    pub fn get_network_scan(&self) -> Option<Vec<NetworkInterface>> {
        match self.store.get(&Resource::NetworkScan)? {
            Snapshot::Network(interfaces) => Some(interfaces),
            _ => None,
        }
    }

    pub fn lookup_network_scan(&self) -> Lookup<Vec<NetworkInterface>> {
        self.store
            .lookup(&Resource::NetworkScan)
            .and_then(|snapshot| match snapshot {
                Snapshot::Network(interfaces) => Some(interfaces),
                _ => None,
            })
    }

    pub fn invalidate_network_scan(&self) {
        self.invalidate(Resource::NetworkScan);
    }

    // Service status

    pub fn cache_service_status(&self, services: Vec<Service>) {
        self.store(Resource::ServiceStatus, Snapshot::Services(services));
    }

    pub fn get_service_status(&self) -> Option<Vec<Service>> {
        match self.store.get(&Resource::ServiceStatus)? {
            Snapshot::Services(services) => Some(services),
            _ => None,
        }
    }

    pub fn lookup_service_status(&self) -> Lookup<Vec<Service>> {
        self.store
            .lookup(&Resource::ServiceStatus)
            .and_then(|snapshot| match snapshot {
                Snapshot::Services(services) => Some(services),
                _ => None,
            })
    }

    pub fn invalidate_service_status(&self) {
        self.invalidate(Resource::ServiceStatus);
    }

    // Package list

    pub fn cache_package_list(&self, packages: Vec<Package>) {
        self.store(Resource::PackageList, Snapshot::Packages(packages));
    }

    pub fn get_package_list(&self) -> Option<Vec<Package>> {
        match self.store.get(&Resource::PackageList)? {
            Snapshot::Packages(packages) => Some(packages),
            _ => None,
        }
    }

    pub fn lookup_package_list(&self) -> Lookup<Vec<Package>> {
        self.store
            .lookup(&Resource::PackageList)
            .and_then(|snapshot| match snapshot {
                Snapshot::Packages(packages) => Some(packages),
                _ => None,
            })
    }

    pub fn invalidate_package_list(&self) {
        self.invalidate(Resource::PackageList);
    }

    /// Drop every entry and reset the hit/miss counters
    pub fn clear_all(&self) {
        self.store.clear();
    }

    /// Evict expired entries, returning how many were removed
    pub fn cleanup(&self) -> usize {
        self.store.cleanup()
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.store.get_stats()
    }
}

impl fmt::Debug for TelemetryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryCache")
            .field("ttls", &self.ttls())
            .field("stats", &self.get_cache_stats())
            .finish()
    }
}
