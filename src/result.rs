use std::io::Cursor;

/// Outcome of a completed remote command.
///
/// The output buffers are snapshots taken when the channel closed; nothing
/// writes to them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    command: String,
    exit_code: Option<u32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ExecResult {
    pub fn new(
        command: impl Into<String>,
        exit_code: Option<u32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    ) -> Self {
        Self {
            command: command.into(),
            exit_code,
            stdout,
            stderr,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// `None` when the remote never reported an exit status.
    pub fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }

    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// A fresh reader over the captured stdout.
    pub fn stdout_reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.stdout.as_slice())
    }

    /// A fresh reader over the captured stderr.
    pub fn stderr_reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.stderr.as_slice())
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Exit status 0. A missing status is not a success.
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn into_parts(self) -> (String, Option<u32>, Vec<u8>, Vec<u8>) {
        (self.command, self.exit_code, self.stdout, self.stderr)
    }
}
