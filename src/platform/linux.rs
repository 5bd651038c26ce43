//! Linux backend over the kernel watchdog ioctl interface.
//!
//! Reference: <https://www.kernel.org/doc/html/latest/watchdog/watchdog-api.html>

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::Path;

use super::PlatformWatchdog;
use crate::protocol::{RawInfo, Request, MAGIC_CLOSE};

const WATCHDOG_IOCTL_BASE: u8 = b'W';

// Direction and size encoding differ on a few architectures.
#[cfg(any(
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "sparc",
    target_arch = "sparc64"
))]
mod ioc {
    pub const SIZEBITS: u32 = 13;
    pub const READ: u32 = 2;
    pub const WRITE: u32 = 4;
}

#[cfg(not(any(
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "sparc",
    target_arch = "sparc64"
)))]
mod ioc {
    pub const SIZEBITS: u32 = 14;
    pub const READ: u32 = 2;
    pub const WRITE: u32 = 1;
}

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = 8;
const IOC_SIZESHIFT: u32 = 16;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + ioc::SIZEBITS;

const fn ioctl_code(direction: u32, nr: u8, size: usize) -> libc::c_ulong {
    ((direction << IOC_DIRSHIFT)
        | ((WATCHDOG_IOCTL_BASE as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)) as libc::c_ulong
}

const fn ior<T>(nr: u8) -> libc::c_ulong {
    ioctl_code(ioc::READ, nr, std::mem::size_of::<T>())
}

const fn iowr<T>(nr: u8) -> libc::c_ulong {
    ioctl_code(ioc::READ | ioc::WRITE, nr, std::mem::size_of::<T>())
}

const WDIOC_GETSUPPORT: libc::c_ulong = ior::<RawInfo>(0);
const WDIOC_GETSTATUS: libc::c_ulong = ior::<libc::c_int>(1);
const WDIOC_GETBOOTSTATUS: libc::c_ulong = ior::<libc::c_int>(2);
const WDIOC_GETTEMP: libc::c_ulong = ior::<libc::c_int>(3);
const WDIOC_SETOPTIONS: libc::c_ulong = ior::<libc::c_int>(4);
const WDIOC_KEEPALIVE: libc::c_ulong = ior::<libc::c_int>(5);
const WDIOC_SETTIMEOUT: libc::c_ulong = iowr::<libc::c_int>(6);
const WDIOC_GETTIMEOUT: libc::c_ulong = ior::<libc::c_int>(7);
const WDIOC_SETPRETIMEOUT: libc::c_ulong = iowr::<libc::c_int>(8);
const WDIOC_GETPRETIMEOUT: libc::c_ulong = ior::<libc::c_int>(9);
const WDIOC_GETTIMELEFT: libc::c_ulong = ior::<libc::c_int>(10);

fn request_code(request: Request) -> libc::c_ulong {
    match request {
        Request::GetStatus => WDIOC_GETSTATUS,
        Request::GetBootStatus => WDIOC_GETBOOTSTATUS,
        Request::GetTemp => WDIOC_GETTEMP,
        Request::SetOptions => WDIOC_SETOPTIONS,
        Request::SetTimeout => WDIOC_SETTIMEOUT,
        Request::GetTimeout => WDIOC_GETTIMEOUT,
        Request::SetPreTimeout => WDIOC_SETPRETIMEOUT,
        Request::GetPreTimeout => WDIOC_GETPRETIMEOUT,
        Request::GetTimeLeft => WDIOC_GETTIMELEFT,
    }
}

/// Map errno values that mean "this driver lacks the request" to
/// [`io::ErrorKind::Unsupported`], keeping the OS error as the source.
fn classify(err: io::Error) -> io::Error {
    match err.raw_os_error() {
        Some(libc::ENOTTY) | Some(libc::EOPNOTSUPP) => {
            io::Error::new(io::ErrorKind::Unsupported, err)
        }
        _ => err,
    }
}

/// A node with no driver behind it counts as missing.
fn map_open_error(err: io::Error) -> io::Error {
    match err.raw_os_error() {
        Some(libc::ENODEV) | Some(libc::ENXIO) => io::Error::new(io::ErrorKind::NotFound, err),
        _ => err,
    }
}

/// An open `/dev/watchdog*` node.
#[derive(Debug)]
pub struct LinuxWatchdog {
    file: File,
}

impl LinuxWatchdog {
    /// Open the node write-only. Opening arms the timer on most drivers.
    ///
    /// `ENODEV` and `ENXIO` (a node with no driver behind it) are reported
    /// as [`io::ErrorKind::NotFound`] alongside `ENOENT`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(map_open_error)?;
        Ok(Self { file })
    }

    fn ioctl_int(&self, code: libc::c_ulong, value: &mut libc::c_int) -> io::Result<()> {
        // SAFETY: `value` is a valid, exclusively borrowed int for the whole
        // call and every request mapped here transfers exactly one int.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), code as _, value as *mut libc::c_int) };
        if rc < 0 {
            return Err(classify(io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl PlatformWatchdog for LinuxWatchdog {
    fn support(&mut self) -> io::Result<RawInfo> {
        let mut info = RawInfo::default();
        // SAFETY: RawInfo is #[repr(C)] with the layout of `struct watchdog_info`,
        // which is the size encoded in WDIOC_GETSUPPORT.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                WDIOC_GETSUPPORT as _,
                &mut info as *mut RawInfo,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(info)
    }

    fn get(&mut self, request: Request) -> io::Result<i32> {
        let mut value: libc::c_int = 0;
        self.ioctl_int(request_code(request), &mut value)?;
        Ok(value)
    }

    fn set(&mut self, request: Request, value: i32) -> io::Result<i32> {
        let mut value: libc::c_int = value;
        self.ioctl_int(request_code(request), &mut value)?;
        Ok(value)
    }

    fn keep_alive(&mut self) -> io::Result<()> {
        let mut unused: libc::c_int = 0;
        self.ioctl_int(WDIOC_KEEPALIVE, &mut unused)
    }

    fn magic_close(&mut self) -> io::Result<()> {
        self.file.write_all(&[MAGIC_CLOSE])
    }

    fn release(self: Box<Self>) -> io::Result<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: `fd` came from `into_raw_fd`, so we own it and close it once.
        if unsafe { libc::close(fd) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
