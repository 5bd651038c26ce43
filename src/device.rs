//! High-level watchdog device interface.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::platform::{self, PlatformWatchdog};
use crate::protocol::*;
use crate::types::*;
use crate::WatchdogError;

/// An open hardware watchdog.
///
/// Once opened, the caller must call [`keep_alive`](Device::keep_alive) more
/// often than the configured timeout or the host reboots. Call
/// [`close`](Device::close) to disarm.
///
/// A `Device` is not internally synchronized; share it across threads only
/// behind the caller's own lock.
///
/// ```no_run
/// use watchdog::Device;
///
/// let mut wdt = Device::open("/dev/watchdog0")?;
/// wdt.keep_alive()?;
/// wdt.close()?;
/// # Ok::<(), watchdog::WatchdogError>(())
/// ```
pub struct Device {
    identity: String,
    path: PathBuf,
    platform: Option<Box<dyn PlatformWatchdog>>,
}

/// Settings applied by [`Device::open_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenConfig {
    /// Device node. `None` or an empty path uses [`DEFAULT_PATH`].
    pub path: Option<PathBuf>,
    /// Timeout to set right after opening.
    pub timeout: Option<Duration>,
    /// Pre-timeout to set right after opening.
    pub pretimeout: Option<Duration>,
}

impl Device {
    /// Open a watchdog device.
    ///
    /// - `path`: device node. An empty path means [`DEFAULT_PATH`].
    ///
    /// Opening arms the timer on most drivers. A missing device yields
    /// [`WatchdogError::NotFound`]; an unsupported platform yields
    /// [`WatchdogError::NotImplemented`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WatchdogError> {
        let path = resolve_path(path.as_ref());
        let platform = platform::open(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                WatchdogError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                WatchdogError::io("open", e)
            }
        })?;
        Self::from_platform(path, platform)
    }

    /// Open a device and apply the timeouts in `config`.
    ///
    /// If a setting is rejected the device is closed again before the error
    /// is returned.
    pub fn open_with(config: &OpenConfig) -> Result<Self, WatchdogError> {
        Self::open(config.path.as_deref().unwrap_or(Path::new("")))?.configure(config)
    }

    /// Wrap an already-open platform resource.
    ///
    /// Queries support info to fill in the identity. If that query fails the
    /// resource is disarmed and released before returning the error.
    pub fn from_platform(
        path: impl Into<PathBuf>,
        mut platform: Box<dyn PlatformWatchdog>,
    ) -> Result<Self, WatchdogError> {
        let path = path.into();
        let raw = match platform.support() {
            Ok(raw) => raw,
            Err(err) => {
                if let Err(e) = platform.magic_close() {
                    warn!("{}: magic close after failed open: {e}", path.display());
                }
                if let Err(e) = platform.release() {
                    warn!("{}: release after failed open: {e}", path.display());
                }
                return Err(WatchdogError::io("support", err));
            }
        };
        let info = DeviceInfo::from(raw);
        debug!(
            "Opened watchdog {} ({}, firmware {})",
            path.display(),
            info.identity,
            info.firmware_version
        );
        Ok(Self {
            identity: info.identity,
            path,
            platform: Some(platform),
        })
    }

    /// Driver name, without NUL padding.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Device node this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False once [`close`](Device::close) has run.
    pub fn is_open(&self) -> bool {
        self.platform.is_some()
    }

    /// Set the timeout, truncated to whole seconds.
    ///
    /// Returns the timeout the driver actually applied, which may differ
    /// when the hardware rounds to its own granularity.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<Duration, WatchdogError> {
        let secs = duration_to_secs(timeout)?;
        let applied = self.set(Request::SetTimeout, secs)?;
        debug!("{}: timeout set to {applied}s", self.path.display());
        Ok(secs_to_duration(applied))
    }

    /// Current timeout.
    pub fn timeout(&mut self) -> Result<Duration, WatchdogError> {
        self.get(Request::GetTimeout).map(secs_to_duration)
    }

    /// Set the pre-timeout, truncated to whole seconds.
    pub fn set_pretimeout(&mut self, pretimeout: Duration) -> Result<Duration, WatchdogError> {
        let secs = duration_to_secs(pretimeout)?;
        let applied = self.set(Request::SetPreTimeout, secs)?;
        debug!("{}: pre-timeout set to {applied}s", self.path.display());
        Ok(secs_to_duration(applied))
    }

    /// Current pre-timeout.
    pub fn pretimeout(&mut self) -> Result<Duration, WatchdogError> {
        self.get(Request::GetPreTimeout).map(secs_to_duration)
    }

    /// Time remaining before the watchdog fires.
    pub fn time_left(&mut self) -> Result<Duration, WatchdogError> {
        self.get(Request::GetTimeLeft).map(secs_to_duration)
    }

    /// Ping the watchdog, restarting the countdown.
    pub fn keep_alive(&mut self) -> Result<(), WatchdogError> {
        self.platform()?
            .keep_alive()
            .map_err(|e| WatchdogError::io("keep_alive", e))?;
        trace!("{}: keep-alive", self.path.display());
        Ok(())
    }

    /// Cause of the last reboot.
    pub fn boot_status(&mut self) -> Result<WatchdogFlags, WatchdogError> {
        self.get(Request::GetBootStatus).map(flags_from_int)
    }

    /// Current status flags.
    pub fn status(&mut self) -> Result<WatchdogFlags, WatchdogError> {
        self.get(Request::GetStatus).map(flags_from_int)
    }

    /// Temperature reading in driver-defined units.
    ///
    /// Devices without a sensor return [`WatchdogError::NotImplemented`].
    pub fn temp(&mut self) -> Result<i32, WatchdogError> {
        self.get(Request::GetTemp)
    }

    /// Fresh support info, queried through this device's own handle.
    pub fn support(&mut self) -> Result<DeviceInfo, WatchdogError> {
        let raw = self
            .platform()?
            .support()
            .map_err(|e| WatchdogError::io("support", e))?;
        Ok(DeviceInfo::from(raw))
    }

    /// Pass control bits to the driver verbatim.
    pub fn set_options(&mut self, options: SetOptions) -> Result<(), WatchdogError> {
        self.set(Request::SetOptions, options.bits() as i32)?;
        debug!("{}: options {options:?}", self.path.display());
        Ok(())
    }

    /// Start the timer.
    pub fn enable(&mut self) -> Result<(), WatchdogError> {
        self.set_options(SetOptions::ENABLE_CARD)
    }

    /// Stop the timer without closing the device.
    pub fn disable(&mut self) -> Result<(), WatchdogError> {
        self.set_options(SetOptions::DISABLE_CARD)
    }

    /// Disarm with a magic close, then release the device.
    ///
    /// The device is released even when the disarm write fails; that write
    /// error is what gets returned. Drivers built with `nowayout` ignore the
    /// sentinel and will still reboot the host.
    ///
    /// A second call returns [`WatchdogError::Closed`].
    pub fn close(&mut self) -> Result<(), WatchdogError> {
        let mut platform = self.platform.take().ok_or(WatchdogError::Closed)?;
        let disarm = platform.magic_close();
        let release = platform.release();

        if let Err(e) = disarm {
            warn!("{}: magic close failed, watchdog may still be armed: {e}", self.path.display());
            if let Err(release_err) = release {
                warn!("{}: release failed: {release_err}", self.path.display());
            }
            return Err(WatchdogError::io("magic_close", e));
        }
        release.map_err(|e| WatchdogError::io("close", e))?;
        debug!("Closed watchdog {}", self.path.display());
        Ok(())
    }

    // --- Internal request handling ---

    fn platform(&mut self) -> Result<&mut (dyn PlatformWatchdog + 'static), WatchdogError> {
        match self.platform.as_deref_mut() {
            Some(p) => Ok(p),
            None => Err(WatchdogError::Closed),
        }
    }

    fn get(&mut self, request: Request) -> Result<i32, WatchdogError> {
        self.platform()?
            .get(request)
            .map_err(|e| WatchdogError::io(request.name(), e))
    }

    fn set(&mut self, request: Request, value: i32) -> Result<i32, WatchdogError> {
        self.platform()?
            .set(request, value)
            .map_err(|e| WatchdogError::io(request.name(), e))
    }

    /// Apply `config` to a freshly opened device, closing it on failure.
    fn configure(mut self, config: &OpenConfig) -> Result<Self, WatchdogError> {
        if let Err(err) = self.apply(config) {
            if let Err(close_err) = self.close() {
                warn!("{}: close after failed configuration: {close_err}", self.path.display());
            }
            return Err(err);
        }
        Ok(self)
    }

    fn apply(&mut self, config: &OpenConfig) -> Result<(), WatchdogError> {
        if let Some(timeout) = config.timeout {
            self.set_timeout(timeout)?;
        }
        if let Some(pretimeout) = config.pretimeout {
            self.set_pretimeout(pretimeout)?;
        }
        Ok(())
    }
}

impl Drop for Device {
    /// Releases the handle without a magic close, leaving the timer armed.
    fn drop(&mut self) {
        if let Some(platform) = self.platform.take() {
            warn!(
                "Watchdog {} dropped without close; timer remains armed",
                self.path.display()
            );
            if let Err(e) = platform.release() {
                warn!("{}: release on drop failed: {e}", self.path.display());
            }
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("identity", &self.identity)
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

fn resolve_path(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        PathBuf::from(DEFAULT_PATH)
    } else {
        path.to_path_buf()
    }
}

fn flags_from_int(value: i32) -> WatchdogFlags {
    WatchdogFlags::from_bits_retain(value as u32)
}
