use assert_cmd::Command;

/// A `Command` for the `nt` binary, rooted at nothing in particular —
/// callers set `current_dir` to a [`crate::TestWorkspace`]'s root.
pub fn nt() -> Command {
    Command::cargo_bin("nt").expect("locate nt binary under test")
}
