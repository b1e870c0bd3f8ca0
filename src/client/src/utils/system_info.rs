use sysinfo::System;

/// Local hostname, or an empty string when the platform cannot report one.
pub fn hostname() -> String {
    System::host_name().unwrap_or_default()
}
