//! Child process lifecycle for install tasks
//!
//! `brew`, `npm` and the installer scripts outlive a killed parent unless
//! someone signals them. [`SystemRunner`](crate::command::SystemRunner)
//! starts every command as the leader of a new process group and tracks the
//! group here while it runs. Dropping the [`ProcessGuard`], or a SIGINT,
//! SIGTERM or SIGHUP, ends every tracked group: SIGTERM, a grace period,
//! then SIGKILL for whatever is left.

use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Grace period when the wizard exits normally
const DROP_GRACE: Duration = Duration::from_secs(5);

/// Grace period when a signal is tearing the wizard down
const SIGNAL_GRACE: Duration = Duration::from_secs(3);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

static REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// Process groups of the commands currently running
#[derive(Debug, Default)]
pub struct ChildRegistry {
    groups: HashSet<u32>,
    shut_down: bool,
}

impl ChildRegistry {
    /// The registry shared by every runner in the process
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        Arc::clone(REGISTRY.get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default()))))
    }

    /// Start tracking the group led by `pid`
    pub fn track(&mut self, pid: u32) {
        self.groups.insert(pid);
        debug!(pid, "tracking child process group");
    }

    /// The command exited on its own
    pub fn release(&mut self, pid: u32) {
        if self.groups.remove(&pid) {
            debug!(pid, "child process group released");
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// End every tracked group. Only the first call does anything.
    pub fn shutdown(&mut self, grace: Duration) {
        if std::mem::replace(&mut self.shut_down, true) || self.groups.is_empty() {
            return;
        }

        let groups: Vec<u32> = self.groups.drain().collect();
        info!(count = groups.len(), "stopping in-flight commands");

        for &pgid in &groups {
            if let Err(e) = signal_group(pgid, Signal::SIGTERM) {
                debug!(pgid, error = %e, "SIGTERM not delivered");
            }
        }

        let deadline = Instant::now() + grace;
        let mut survivors = groups;
        loop {
            survivors.retain(|&pgid| group_alive(pgid));
            if survivors.is_empty() || Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        for pgid in survivors {
            warn!(pgid, "command ignored SIGTERM, killing its process group");
            let _ = signal_group(pgid, Signal::SIGKILL);
        }
    }
}

/// `pgid` is the leader's pid; the whole group gets the signal, so the
/// `curl` inside an installer script goes down with it
fn signal_group(pgid: u32, signal: Signal) -> nix::Result<()> {
    killpg(group_pid(pgid), signal)
}

fn group_alive(pgid: u32) -> bool {
    killpg(group_pid(pgid), None).is_ok()
}

fn group_pid(pgid: u32) -> Pid {
    Pid::from_raw(i32::try_from(pgid).unwrap_or(i32::MAX))
}

/// Ends in-flight commands when the session that owns it goes away.
///
/// Held by the interactive [`App`](crate::app::App) and by the headless
/// install.
pub struct ProcessGuard {
    registry: Arc<Mutex<ChildRegistry>>,
}

impl ProcessGuard {
    pub fn new() -> Self {
        Self {
            registry: ChildRegistry::global(),
        }
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.shutdown(DROP_GRACE);
        }
    }
}

/// Stop tracked commands and exit on SIGINT, SIGTERM or SIGHUP.
///
/// Raw mode swallows Ctrl+C as a key press, so in the TUI this mostly
/// catches external kills.
pub fn init_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(signal = sig, "termination signal received");
            if let Ok(mut registry) = ChildRegistry::global().lock() {
                registry.shutdown(SIGNAL_GRACE);
            }
            std::process::exit(128 + sig);
        }
    });
    Ok(())
}

/// Start a [`Command`](std::process::Command) as a new process group leader
pub trait CommandProcessGroup {
    fn in_new_process_group(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        self.process_group(0);

        // Linux can also deliver SIGTERM when the wizard dies without Drop
        #[cfg(target_os = "linux")]
        unsafe {
            self.pre_exec(|| {
                if nix::libc::prctl(nix::libc::PR_SET_PDEATHSIG, nix::libc::SIGTERM) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_track_and_release() {
        let mut registry = ChildRegistry::default();
        registry.track(4242);
        registry.track(4343);
        assert_eq!(registry.len(), 2);

        registry.release(4242);
        registry.release(4242);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_shutdown_stops_running_group() {
        let mut child = Command::new("sh")
            .args(["-c", "sleep 30; true"])
            .in_new_process_group()
            .spawn()
            .unwrap();

        let mut registry = ChildRegistry::default();
        registry.track(child.id());
        registry.shutdown(Duration::from_millis(300));

        let status = child.wait().unwrap();
        assert!(!status.success());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_shutdown_only_once() {
        let mut registry = ChildRegistry::default();
        registry.track(999_999);
        registry.shutdown(Duration::from_millis(10));
        assert!(registry.is_empty());

        registry.track(999_998);
        registry.shutdown(Duration::from_millis(10));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_group_is_not_alive() {
        assert!(!group_alive(999_999));
    }
}
