use sysinfo::System;

/// Executables of the game; the bypass must not move files while either runs.
pub const GAME_PROCESSES: [&str; 2] = ["SparkingZERO.exe", "SparkingZERO-Win64-Shipping.exe"];

pub struct ProcessChecker;

impl ProcessChecker {
    /// Performs the check. Takes a mutable ref to System to allow
    /// sysinfo to reuse internal buffers for performance.
    pub fn is_running(sys: &mut System, names: &[&str]) -> bool {
        sys.refresh_processes();

        sys.processes()
            .values()
            .any(|p| names.iter().any(|name| p.name().eq_ignore_ascii_case(name)))
    }

    pub fn is_game_running() -> bool {
        let mut sys = System::new();
        Self::is_running(&mut sys, &GAME_PROCESSES)
    }
}
