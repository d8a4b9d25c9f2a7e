//! Shell commands sent to the managed host
//!
//! Every caller-supplied name is quoted with [`shlex::try_quote`] before it
//! is placed in a command line.

use crate::parse::BIOS_EXTENSIONS;

use super::error::MutationError;

pub const HOSTNAME: &str = "hostname";
pub const TEMPERATURE: &str = "vcgencmd measure_temp";
pub const MEMORY: &str = "free -b";
pub const DISK: &str = "df -B1 /";
pub const UPTIME: &str = "uptime";
pub const PROC_UPTIME: &str = "cat /proc/uptime";

pub const BOARD_MODEL: &str = "cat /proc/device-tree/model";
pub const CORE_VOLTAGE: &str = "vcgencmd measure_volts core";
pub const ARM_CLOCK: &str = "vcgencmd measure_clock arm";
pub const THROTTLED: &str = "vcgencmd get_throttled";

pub const NETWORK_INTERFACES: &str = "ip -o -4 addr show";

pub const LIST_PACKAGES: &str = r"dpkg-query -W -f='${Package}|${Version}|${Status}\n'";
pub const LIST_SERVICES: &str = "systemctl list-units --type=service --no-pager";

pub const UPDATE_SYSTEM: &str = "sudo -n apt-get update && sudo -n apt-get upgrade -y";

/// Quote one caller-supplied argument for a POSIX shell
///
/// Empty names, names that look like options and names containing NUL
/// are rejected.
pub fn quote_arg(name: &str) -> Result<String, MutationError> {
    if name.trim().is_empty() {
        return Err(MutationError::InvalidArgument("name must not be empty".to_string()));
    }
    if name.starts_with('-') {
        return Err(MutationError::InvalidArgument(format!(
            "name must not start with '-': {name}"
        )));
    }
    shlex::try_quote(name)
        .map(|quoted| quoted.into_owned())
        .map_err(|e| MutationError::InvalidArgument(format!("cannot quote {name:?}: {e}")))
}

fn quote_all(names: &[String]) -> Result<String, MutationError> {
    let quoted = names
        .iter()
        .map(|name| quote_arg(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.join(" "))
}

pub fn install_packages(names: &[String]) -> Result<String, MutationError> {
    Ok(format!(
        "sudo -n apt-get update && sudo -n apt-get install -y {}",
        quote_all(names)?
    ))
}

pub fn remove_packages(names: &[String]) -> Result<String, MutationError> {
    Ok(format!("sudo -n apt-get remove -y {}", quote_all(names)?))
}

pub fn restart_service(name: &str) -> Result<String, MutationError> {
    Ok(format!("sudo -n systemctl restart {}", quote_arg(name)?))
}

/// dpkg state of specific packages, in the same format as [`LIST_PACKAGES`]
///
/// dpkg-query exits 1 when some names are unknown but still prints the rest.
pub fn query_packages(names: &[String]) -> Result<String, MutationError> {
    Ok(format!("{LIST_PACKAGES} {}", quote_all(names)?))
}

/// `find` over the BIOS directory tree for the known image extensions
pub fn find_bios_files(bios_dir: &str) -> Result<String, MutationError> {
    let patterns = BIOS_EXTENSIONS
        .iter()
        .map(|ext| format!("-iname '*.{ext}'"))
        .collect::<Vec<_>>()
        .join(" -o ");
    Ok(format!(
        "find {} -type f \\( {patterns} \\) 2>/dev/null",
        quote_arg(bios_dir)?
    ))
}

pub fn file_size(path: &str) -> Result<String, MutationError> {
    Ok(format!("stat -c%s {}", quote_arg(path)?))
}
