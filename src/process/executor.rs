use std::ffi::CString;
use std::io::Write;
use std::os::unix::io::RawFd;
use std::ptr;

use libc::{c_char, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::{close, dup2, fork, write, ForkResult, Pid};
use tracing::debug;

use super::{signal, ChildStatus, ProcessError};
use crate::input::Command;

const NULL_DEVICE: &str = "/dev/null";
const OUTPUT_FILE_MODE: u32 = 0o644;

/// Result of starting an external program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Foreground {
        pid: Pid,
        status: ChildStatus,
    },
    /// `finished` is set when the child was already gone at the first poll.
    Background {
        pid: Pid,
        finished: Option<ChildStatus>,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Redirect {
    path: CString,
    target: RawFd,
    flags: OFlag,
    mode: Mode,
    failure: Vec<u8>,
}

impl Redirect {
    fn input(path: &str) -> Result<Self, ProcessError> {
        Ok(Redirect {
            path: c_string(path)?,
            target: STDIN_FILENO,
            flags: OFlag::O_RDONLY,
            mode: Mode::empty(),
            failure: format!("cannot open {} for input\n", path).into_bytes(),
        })
    }

    fn output(path: &str) -> Result<Self, ProcessError> {
        Ok(Redirect {
            path: c_string(path)?,
            target: STDOUT_FILENO,
            flags: OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            mode: Mode::from_bits_truncate(OUTPUT_FILE_MODE),
            failure: format!("cannot open {} for output\n", path).into_bytes(),
        })
    }

    fn null_input() -> Result<Self, ProcessError> {
        Self::input(NULL_DEVICE)
    }
}

/// Everything the child needs, built before forking. Between `fork` and
/// `execvp` the child only reads from it.
#[derive(Debug, PartialEq, Eq)]
struct SpawnPlan {
    argv: Vec<CString>,
    /// Null-terminated pointers into `argv`, handed to `execvp` as is.
    argv_ptrs: Vec<*const c_char>,
    foreground: bool,
    redirects: Vec<Redirect>,
}

impl SpawnPlan {
    fn new(command: &Command, background: bool) -> Result<Self, ProcessError> {
        if command.is_empty() {
            return Err(ProcessError::EmptyCommand);
        }

        let argv = command
            .argv
            .iter()
            .map(|arg| c_string(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();

        let mut redirects = Vec::new();
        if let Some(path) = &command.input_path {
            redirects.push(Redirect::input(path)?);
        }
        if let Some(path) = &command.output_path {
            redirects.push(Redirect::output(path)?);
        }
        if redirects.is_empty() && background {
            redirects.push(Redirect::null_input()?);
        }

        Ok(SpawnPlan {
            argv,
            argv_ptrs,
            foreground: !background,
            redirects,
        })
    }
}

fn c_string(value: &str) -> Result<CString, ProcessError> {
    CString::new(value).map_err(|_| ProcessError::InvalidArgument(value.to_string()))
}

/// Best effort; there is nowhere left to report a failed write.
fn write_all(fd: RawFd, parts: &[&[u8]]) {
    for part in parts {
        let mut rest = *part;
        while !rest.is_empty() {
            match write(fd, rest) {
                Ok(0) => return,
                Ok(n) => rest = &rest[n..],
                Err(Errno::EINTR) => continue,
                Err(_) => return,
            }
        }
    }
}

fn child_exit(code: i32) -> ! {
    unsafe { libc::_exit(code) }
}

fn apply_redirect(redirect: &Redirect) {
    let fd = match open(redirect.path.as_c_str(), redirect.flags, redirect.mode) {
        Ok(fd) => fd,
        Err(_) => {
            write_all(STDOUT_FILENO, &[&redirect.failure]);
            child_exit(1);
        }
    };

    if let Err(e) = dup2(fd, redirect.target) {
        write_all(STDERR_FILENO, &[b"dup2: ", e.desc().as_bytes(), b"\n"]);
        child_exit(1);
    }
    if fd != redirect.target {
        let _ = close(fd);
    }
}

fn run_child(plan: &SpawnPlan) -> ! {
    signal::prepare_child(plan.foreground);

    for redirect in &plan.redirects {
        apply_redirect(redirect);
    }

    let program = plan.argv[0].as_c_str();
    unsafe { libc::execvp(program.as_ptr(), plan.argv_ptrs.as_ptr()) };
    let err = Errno::last();
    write_all(
        STDERR_FILENO,
        &[program.to_bytes(), b": ", err.desc().as_bytes(), b"\n"],
    );
    child_exit(1);
}

/// Blocks until `pid` terminates.
pub fn wait_for(pid: Pid) -> Result<ChildStatus, ProcessError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(status) = ChildStatus::from_wait(status) {
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ProcessError::Wait(e)),
        }
    }
}

/// Checks once whether `pid` has terminated, without blocking.
pub fn poll(pid: Pid) -> Result<Option<ChildStatus>, ProcessError> {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(status) => Ok(ChildStatus::from_wait(status)),
        Err(Errno::EINTR) => Ok(None),
        Err(e) => Err(ProcessError::Wait(e)),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Launcher;

impl Launcher {
    pub fn new() -> Self {
        Launcher
    }

    /// Forks and execs `command`. A background request is demoted to the
    /// foreground when `foreground_only` is set.
    pub fn launch(&self, command: &Command, foreground_only: bool) -> Result<Launch, ProcessError> {
        let background = command.background && !foreground_only;
        if command.background && foreground_only {
            debug!("foreground-only mode: running {:?} in the foreground", command.argv);
        }

        let plan = SpawnPlan::new(command, background)?;

        // Buffered output would otherwise be written twice, once per process.
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        let child = match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => child,
            Ok(ForkResult::Child) => run_child(&plan),
            Err(e) => return Err(ProcessError::Spawn(e)),
        };

        debug!(
            "spawned pid:{} argv:{:?} background:{} stdin:{:?} stdout:{:?}",
            child, command.argv, background, command.input_path, command.output_path
        );

        if background {
            let finished = poll(child)?;
            return Ok(Launch::Background {
                pid: child,
                finished,
            });
        }

        let status = wait_for(child)?;
        debug!("pid:{} finished with {}", child, status);
        Ok(Launch::Foreground { pid: child, status })
    }
}
