//! Backend for targets without a watchdog implementation.

use std::io;
use std::path::Path;

use super::PlatformWatchdog;
use crate::protocol::{RawInfo, Request};

/// Stateless backend that fails every call and touches nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl Unsupported {
    /// Always fails; there is nothing to open on this target.
    pub fn open(_path: &Path) -> io::Result<Self> {
        Err(not_implemented())
    }
}

fn not_implemented() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("no watchdog support on {}", std::env::consts::OS),
    )
}

impl PlatformWatchdog for Unsupported {
    fn support(&mut self) -> io::Result<RawInfo> {
        Err(not_implemented())
    }

    fn get(&mut self, _request: Request) -> io::Result<i32> {
        Err(not_implemented())
    }

    fn set(&mut self, _request: Request, _value: i32) -> io::Result<i32> {
        Err(not_implemented())
    }

    fn keep_alive(&mut self) -> io::Result<()> {
        Err(not_implemented())
    }

    fn magic_close(&mut self) -> io::Result<()> {
        Err(not_implemented())
    }

    fn release(self: Box<Self>) -> io::Result<()> {
        Err(not_implemented())
    }
}
