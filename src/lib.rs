//! # watchdog
//!
//! Control of hardware watchdog timer devices.
//!
//! A watchdog reboots the host unless it is pinged on a regular cadence.
//! On Linux this crate drives `/dev/watchdog` through the kernel watchdog
//! ioctl interface. On every other platform each operation fails with
//! [`WatchdogError::NotImplemented`], which also answers `true` to
//! [`WatchdogError::is_not_found`], so one check covers "no watchdog here".
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use watchdog::Device;
//!
//! let mut wdt = Device::open("")?;
//! println!("Driver: {}", wdt.identity());
//!
//! wdt.set_timeout(Duration::from_secs(30))?;
//! assert_eq!(wdt.timeout()?, Duration::from_secs(30));
//!
//! // The caller owns the cadence: ping more often than the timeout.
//! wdt.keep_alive()?;
//!
//! // Magic close disarms the timer before releasing the device.
//! wdt.close()?;
//! # Ok::<(), watchdog::WatchdogError>(())
//! ```

use std::io;
use std::time::Duration;

pub mod device;
pub mod discovery;
pub mod platform;
pub mod protocol;
pub mod types;

pub use device::{Device, OpenConfig};
pub use discovery::{discover_devices, find_devices, DiscoveredDevice};
pub use platform::PlatformWatchdog;
pub use types::*;

/// Errors returned by the watchdog crate.
#[derive(Debug, thiserror::Error)]
pub enum WatchdogError {
    /// The device node does not exist.
    #[error("No watchdog device at {path}")]
    NotFound { path: String },

    /// The platform, or this particular device, lacks the operation.
    ///
    /// `source` is the platform error as reported, so the underlying errno
    /// (for example `ENOTTY` versus `EOPNOTSUPP`) stays inspectable.
    #[error("Watchdog {op} not implemented: {source}")]
    NotImplemented {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The device has already been closed.
    #[error("Watchdog device is closed")]
    Closed,

    /// A duration that cannot be expressed as the platform's whole-second argument.
    #[error("Duration {0:?} is out of range for the watchdog")]
    InvalidDuration(Duration),

    /// Any other failure from the platform control interface.
    #[error("Watchdog {op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl WatchdogError {
    /// True when no usable watchdog is present: the node is missing or the
    /// platform has no implementation.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NotImplemented { .. })
    }

    pub(crate) fn io(op: &'static str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::Unsupported {
            return Self::NotImplemented { op, source };
        }
        Self::Io { op, source }
    }
}

impl From<WatchdogError> for io::Error {
    fn from(err: WatchdogError) -> Self {
        match err {
            WatchdogError::Io { source, .. } => source,
            err @ (WatchdogError::NotFound { .. } | WatchdogError::NotImplemented { .. }) => {
                io::Error::new(io::ErrorKind::NotFound, err)
            }
            WatchdogError::InvalidDuration(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            WatchdogError::Closed => io::Error::other(err),
        }
    }
}
