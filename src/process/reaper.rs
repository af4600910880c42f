use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::executor::{poll, wait_for};
use super::{ChildStatus, ProcessError};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A background child collected by the reaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub status: ChildStatus,
}

impl fmt::Display for Reaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "background pid {} is done: {}", self.pid, self.status)
    }
}

/// Collects every child that has already terminated. Never blocks.
///
/// A failing `waitpid` ends the sweep but keeps what was already collected.
pub fn reap_finished() -> Vec<Reaped> {
    sweep(|| waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)))
}

fn sweep(mut next: impl FnMut() -> nix::Result<WaitStatus>) -> Vec<Reaped> {
    let mut reaped = Vec::new();
    loop {
        match next() {
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => {
                let Some(pid) = status.pid() else { break };
                if let Some(status) = ChildStatus::from_wait(status) {
                    debug!("reaped pid:{} {}", pid, status);
                    reaped.push(Reaped { pid, status });
                }
            }
            Err(Errno::ECHILD) => break,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                warn!("{}", ProcessError::Wait(e));
                break;
            }
        }
    }
    reaped
}

fn send(pid: Pid, signal: Signal) {
    match kill(pid, signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!("cannot send {} to pid {}: {}", signal, pid, e.desc()),
    }
}

/// Sends SIGTERM to every child, gives them `grace` to finish, then kills and
/// collects whatever is left. Returns once all of them are reaped.
pub fn terminate_all(pids: &[Pid], grace: Duration) -> Vec<Reaped> {
    for &pid in pids {
        send(pid, Signal::SIGTERM);
    }

    let mut reaped = Vec::new();
    let mut pending: Vec<Pid> = pids.to_vec();
    let deadline = Instant::now() + grace;
    loop {
        pending.retain(|&pid| match poll(pid) {
            Ok(Some(status)) => {
                reaped.push(Reaped { pid, status });
                false
            }
            Ok(None) => true,
            Err(e) => {
                debug!("pid {} already collected: {}", pid, e);
                false
            }
        });
        if pending.is_empty() || Instant::now() >= deadline {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    for pid in pending {
        warn!("pid {} ignored SIGTERM, killing it", pid);
        send(pid, Signal::SIGKILL);
        match wait_for(pid) {
            Ok(status) => reaped.push(Reaped { pid, status }),
            Err(e) => debug!("pid {} already collected: {}", pid, e),
        }
    }
    reaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Command;
    use crate::process::{Launch, Launcher};
    use crate::test_support::process_lock;

    fn spawn_background(line: &str) -> Pid {
        let command = Command::parse(line).unwrap().unwrap();
        match Launcher::new().launch(&command, false).unwrap() {
            Launch::Background { pid, finished: None } => pid,
            other => panic!("unexpected launch {:?}", other),
        }
    }

    #[test]
    fn test_reap_with_no_children_returns_nothing() {
        let _guard = process_lock();
        assert!(reap_finished().is_empty());
    }

    #[test]
    fn test_background_child_is_reported_exactly_once() {
        let _guard = process_lock();
        let pid = spawn_background("sleep 0.2 &");

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = Vec::new();
        while seen.is_empty() && Instant::now() < deadline {
            seen = reap_finished();
            std::thread::sleep(Duration::from_millis(20));
        }

        assert_eq!(
            seen,
            vec![Reaped {
                pid,
                status: ChildStatus::Exited(0)
            }]
        );
        assert!(reap_finished().is_empty());
    }

    #[test]
    fn test_running_child_is_not_reaped() {
        let _guard = process_lock();
        let pid = spawn_background("sleep 30 &");

        assert!(reap_finished().is_empty());

        let reaped = terminate_all(&[pid], Duration::from_secs(5));
        assert_eq!(
            reaped,
            vec![Reaped {
                pid,
                status: ChildStatus::Signaled(15)
            }]
        );
    }

    #[test]
    fn test_child_ignoring_term_is_killed_after_grace() {
        let _guard = process_lock();
        // No quoting in the line grammar, so argv is built by hand.
        let command = Command {
            argv: vec!["sh".into(), "-c".into(), "trap '' TERM; sleep 30".into()],
            background: true,
            ..Command::default()
        };
        let pid = match Launcher::new().launch(&command, false).unwrap() {
            Launch::Background { pid, finished: None } => pid,
            other => panic!("unexpected launch {:?}", other),
        };
        // Let the shell install its trap before it is signalled.
        std::thread::sleep(Duration::from_millis(200));

        let started = Instant::now();
        let reaped = terminate_all(&[pid], Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(
            reaped,
            vec![Reaped {
                pid,
                status: ChildStatus::Signaled(9)
            }]
        );
    }

    #[test]
    fn test_sweep_keeps_children_collected_before_an_error() {
        let mut results = vec![
            Err(Errno::EINVAL),
            Ok(WaitStatus::Exited(Pid::from_raw(7), 0)),
            Ok(WaitStatus::Signaled(Pid::from_raw(8), Signal::SIGTERM, false)),
        ];
        let reaped = sweep(|| results.pop().unwrap_or(Ok(WaitStatus::StillAlive)));

        assert_eq!(
            reaped,
            vec![
                Reaped {
                    pid: Pid::from_raw(8),
                    status: ChildStatus::Signaled(15)
                },
                Reaped {
                    pid: Pid::from_raw(7),
                    status: ChildStatus::Exited(0)
                },
            ]
        );
    }

    #[test]
    fn test_reaped_message() {
        let reaped = Reaped {
            pid: Pid::from_raw(123),
            status: ChildStatus::Signaled(15),
        };
        assert_eq!(
            reaped.to_string(),
            "background pid 123 is done: terminated by signal 15"
        );
    }
}
