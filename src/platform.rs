//! Platform watchdog control interface.
//!
//! One backend is compiled per target: the Linux ioctl backend, or the
//! unsupported backend whose every call fails with
//! [`io::ErrorKind::Unsupported`].

use std::io;
use std::path::Path;

use crate::protocol::{RawInfo, Request};

#[cfg(target_os = "linux")]
pub mod linux;
pub mod unsupported;

#[cfg(target_os = "linux")]
pub use linux::LinuxWatchdog;
pub use unsupported::Unsupported;

/// An open watchdog resource that can service control requests.
///
/// Every method is a single blocking platform call. Implementations hold no
/// locks and do no retrying; errors are returned as the platform reports them.
pub trait PlatformWatchdog: Send {
    /// Read the device's support record.
    fn support(&mut self) -> io::Result<RawInfo>;

    /// Perform a request that only reads an integer.
    fn get(&mut self, request: Request) -> io::Result<i32>;

    /// Perform a request that writes `value`, returning the value the
    /// device reports back (the effective setting for timeouts).
    fn set(&mut self, request: Request, value: i32) -> io::Result<i32>;

    /// Reset the countdown to the full timeout.
    fn keep_alive(&mut self) -> io::Result<()>;

    /// Write the disarm sentinel.
    fn magic_close(&mut self) -> io::Result<()>;

    /// Release the underlying resource.
    fn release(self: Box<Self>) -> io::Result<()>;
}

/// Open the watchdog at `path` with the backend for this target.
///
/// A missing device surfaces as [`io::ErrorKind::NotFound`].
#[cfg(target_os = "linux")]
pub fn open(path: &Path) -> io::Result<Box<dyn PlatformWatchdog>> {
    Ok(Box::new(LinuxWatchdog::open(path)?))
}

/// Open the watchdog at `path` with the backend for this target.
///
/// Always fails with [`io::ErrorKind::Unsupported`] here.
#[cfg(not(target_os = "linux"))]
pub fn open(path: &Path) -> io::Result<Box<dyn PlatformWatchdog>> {
    Ok(Box::new(Unsupported::open(path)?))
}
