use std::time::Duration;

use watchdog::{discover_devices, Device, WatchdogFlags};

fn main() -> Result<(), watchdog::WatchdogError> {
    // Discovery reads sysfs and never arms a timer
    for dev in discover_devices() {
        println!(
            "Found: {} ({}), timeout {:?}",
            dev.path.display(),
            dev.identity.as_deref().unwrap_or("?"),
            dev.timeout
        );
    }

    let path = std::env::var("WATCHDOG_DEVICE").unwrap_or_default();
    let mut wdt = match Device::open(&path) {
        Ok(wdt) => wdt,
        Err(e) if e.is_not_found() => {
            eprintln!("No watchdog available: {e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    // Always disarm, even when a step below fails
    let result = exercise(&mut wdt);
    let closed = wdt.close();
    result?;
    closed?;
    println!("\nDisarmed and closed.");
    Ok(())
}

fn exercise(wdt: &mut Device) -> Result<(), watchdog::WatchdogError> {
    // Device info
    let info = wdt.support()?;
    println!("\nIdentity: {}", info.identity);
    println!("Firmware: {}", info.firmware_version);
    println!("Options:  {:?}", info.options);
    println!("Boot:     {:?}", wdt.boot_status()?);

    if info.supports(WatchdogFlags::SET_TIMEOUT) {
        let applied = wdt.set_timeout(Duration::from_secs(30))?;
        println!("\nTimeout set to {applied:?}");
    }
    println!("Timeout:  {:?}", wdt.timeout()?);

    // Ping well inside the timeout
    for _ in 0..3 {
        wdt.keep_alive()?;
        std::thread::sleep(Duration::from_secs(1));
        if let Ok(left) = wdt.time_left() {
            println!("Time left: {left:?}");
        }
    }

    Ok(())
}
