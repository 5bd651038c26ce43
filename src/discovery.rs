//! Device discovery: find watchdog nodes without opening them.
//!
//! Opening a watchdog arms it, so nothing here opens a device node. Names and
//! identities come from the directory listing and sysfs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEV_DIR: &str = "/dev";
const SYSFS_CLASS_DIR: &str = "/sys/class/watchdog";

/// A watchdog found on this system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Device node path (e.g. `/dev/watchdog0`).
    pub path: PathBuf,
    /// Driver name from sysfs, if exposed.
    pub identity: Option<String>,
    /// Configured timeout from sysfs, if exposed.
    pub timeout: Option<Duration>,
}

/// List watchdog device nodes (`/dev/watchdog`, `/dev/watchdogN`), sorted.
///
/// Returns an empty list on platforms without watchdog support.
pub fn find_devices() -> Vec<PathBuf> {
    if cfg!(target_os = "linux") {
        find_devices_in(Path::new(DEV_DIR))
    } else {
        Vec::new()
    }
}

/// Discover watchdogs registered with the kernel, with their identity.
///
/// Reads `/sys/class/watchdog`; returns an empty list if it is absent.
pub fn discover_devices() -> Vec<DiscoveredDevice> {
    if cfg!(target_os = "linux") {
        discover_in(Path::new(SYSFS_CLASS_DIR), Path::new(DEV_DIR))
    } else {
        Vec::new()
    }
}

/// `watchdog` or `watchdog` followed by a decimal index.
pub fn is_watchdog_node(name: &str) -> bool {
    match name.strip_prefix("watchdog") {
        Some("") => true,
        Some(index) => index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn find_devices_in(dev_dir: &Path) -> Vec<PathBuf> {
    let mut devices: Vec<PathBuf> = fs::read_dir(dev_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_str().is_some_and(is_watchdog_node))
                .map(|e| e.path())
                .collect()
        })
        .unwrap_or_default();
    devices.sort();
    devices
}

fn discover_in(class_dir: &Path, dev_dir: &Path) -> Vec<DiscoveredDevice> {
    let mut devices: Vec<DiscoveredDevice> = fs::read_dir(class_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    let name = entry.file_name().to_str()?.to_owned();
                    if !is_watchdog_node(&name) {
                        return None;
                    }
                    let dir = entry.path();
                    Some(DiscoveredDevice {
                        path: dev_dir.join(&name),
                        identity: read_attr(&dir, "identity"),
                        timeout: read_attr(&dir, "timeout")
                            .and_then(|s| s.parse::<u64>().ok())
                            .map(Duration::from_secs),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    devices
}

fn read_attr(dir: &Path, attr: &str) -> Option<String> {
    let value = fs::read_to_string(dir.join(attr)).ok()?;
    let value = value.trim_end_matches(['\n', '\0']).to_owned();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_watchdog_nodes() {
        assert!(is_watchdog_node("watchdog"));
        assert!(is_watchdog_node("watchdog0"));
        assert!(is_watchdog_node("watchdog12"));
        assert!(!is_watchdog_node("watchdogX"));
        assert!(!is_watchdog_node("watchdog0p1"));
        assert!(!is_watchdog_node("wdt"));
        assert!(!is_watchdog_node("null"));
    }

    #[test]
    fn finds_nodes_sorted() {
        let dev = tempfile::tempdir().unwrap();
        for name in ["watchdog1", "null", "watchdog", "watchdog0", "tty0"] {
            fs::write(dev.path().join(name), b"").unwrap();
        }
        let found = find_devices_in(dev.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["watchdog", "watchdog0", "watchdog1"]);
    }

    #[test]
    fn reads_identity_from_sysfs() {
        let class = tempfile::tempdir().unwrap();
        let wd0 = class.path().join("watchdog0");
        fs::create_dir(&wd0).unwrap();
        fs::write(wd0.join("identity"), "iTCO_wdt\n").unwrap();
        fs::write(wd0.join("timeout"), "30\n").unwrap();
        let wd1 = class.path().join("watchdog1");
        fs::create_dir(&wd1).unwrap();
        fs::create_dir(class.path().join("unrelated")).unwrap();

        let found = discover_in(class.path(), Path::new("/dev"));
        assert_eq!(
            found,
            vec![
                DiscoveredDevice {
                    path: PathBuf::from("/dev/watchdog0"),
                    identity: Some("iTCO_wdt".into()),
                    timeout: Some(Duration::from_secs(30)),
                },
                DiscoveredDevice {
                    path: PathBuf::from("/dev/watchdog1"),
                    identity: None,
                    timeout: None,
                },
            ]
        );
    }

    #[test]
    fn missing_dirs_yield_nothing() {
        assert!(find_devices_in(Path::new("/nonexistent/dev")).is_empty());
        assert!(discover_in(Path::new("/nonexistent/sys"), Path::new("/dev")).is_empty());
    }
}
