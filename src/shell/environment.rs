use crate::input::Command;

pub const PID_MARKER: &str = "$$";

/// Replaces every non-overlapping `$$`, left to right.
pub fn expand_pid(token: &str, pid: &str) -> String {
    token.replace(PID_MARKER, pid)
}

/// Applies [`expand_pid`] to every token of the command, paths included.
pub fn expand_command(command: &mut Command, pid: &str) {
    for arg in command.argv.iter_mut() {
        if arg.contains(PID_MARKER) {
            *arg = expand_pid(arg, pid);
        }
    }
    for path in [&mut command.input_path, &mut command.output_path]
        .into_iter()
        .flatten()
    {
        if path.contains(PID_MARKER) {
            *path = expand_pid(path, pid);
        }
    }
}
