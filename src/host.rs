//! Host information for the report header

use sysinfo::System;

/// Collect host facts as an ordered key/value list
///
/// Entries with blank names or values are dropped so the report's
/// comma-joined header lines stay aligned.
pub fn collect() -> Vec<(String, String)> {
    let mut sys = System::new_all();
    sys.refresh_all();

    let mut info = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            if !value.trim().is_empty() {
                info.push((key.to_string(), value));
            }
        }
    };

    push("OS", System::name());
    push("OS Version", System::os_version());
    push("Kernel", System::kernel_version());
    push("Host Name", System::host_name());

    info.push(("CPU Cores".into(), sys.cpus().len().to_string()));
    info.push((
        "Total Memory".into(),
        format!("{} MB", sys.total_memory() / (1024 * 1024)),
    ));

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_blank_keys_or_values() {
        for (key, value) in collect() {
            assert!(!key.trim().is_empty());
            assert!(!value.trim().is_empty());
        }
    }

    #[test]
    fn always_reports_cpu_and_memory() {
        let info = collect();
        assert!(info.iter().any(|(k, _)| k == "CPU Cores"));
        assert!(info.iter().any(|(k, _)| k == "Total Memory"));
    }
}
