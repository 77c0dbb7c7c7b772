//! Process management utilities

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// Check if a process with the given PID is still alive
///
/// Zombies count as gone: they have exited and only wait to be reaped.
pub fn is_alive(pid: u32) -> bool {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    match sys.process(Pid::from_u32(pid)) {
        Some(p) => !matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_is_alive() {
        assert!(is_alive(std::process::id()));
    }

    #[test]
    fn test_exited_child_is_gone() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        assert!(!is_alive(pid));
    }
}
