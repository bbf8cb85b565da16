//! Observer process identity.

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};

/// Best-effort identity of the observing process.
///
/// This is the identity of the *monitoring* process itself, not of the
/// process that caused a change. Attributing changes to the installer's
/// process tree is out of scope; every record in a session carries the same
/// observer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessInfo {
    /// The process could be described.
    Known { pid: u32, name: String, exe: String },
    /// Lookup failed; serialized as `{"error": "..."}`.
    Unavailable { error: String },
}

impl ProcessInfo {
    /// Describe the current process via sysinfo.
    pub fn current() -> Self {
        let pid = std::process::id();
        let sys_pid = Pid::from_u32(pid);
        let mut sys = System::new();
        if !sys.refresh_process(sys_pid) {
            return Self::Unavailable {
                error: format!("process {pid} not visible to system information provider"),
            };
        }
        match sys.process(sys_pid) {
            Some(process) => Self::Known {
                pid,
                name: process.name().to_string(),
                exe: process
                    .exe()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
            },
            None => Self::Unavailable {
                error: format!("no process entry for pid {pid}"),
            },
        }
    }
}
