//! Running the Python mutator process.
//!
//! [`ProcessRunner`] is the seam between the mutator and the operating
//! system. [`NativeProcessRunner`] spawns a real child process; tests provide
//! their own runner that plays the part of the generator.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// A process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Prefix of forwarded output lines, e.g. `PythonMutator(load)`.
    pub log_prefix: String,
}

impl ProcessInvocation {
    /// The argument following `flag`, e.g. the path after `--output`.
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs a process to completion.
///
/// Output of the process goes to the log, it is never captured. Dropping the
/// returned future must stop the process.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &ProcessInvocation) -> std::io::Result<ProcessExit>;
}

/// How long log forwarding may continue once the process has exited.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Runs processes with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProcessRunner;

#[async_trait]
impl ProcessRunner for NativeProcessRunner {
    async fn run(&self, invocation: &ProcessInvocation) -> std::io::Result<ProcessExit> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let forwarders: Vec<JoinHandle<()>> = [
            child
                .stdout
                .take()
                .map(|out| forward_lines(out, format!("{} stdout", invocation.log_prefix))),
            child
                .stderr
                .take()
                .map(|err| forward_lines(err, format!("{} stderr", invocation.log_prefix))),
        ]
        .into_iter()
        .flatten()
        .collect();

        let status = child.wait().await?;

        // a background process started by the generator can inherit the
        // pipes and keep them open long after the generator itself exited
        for mut forwarder in forwarders {
            if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, &mut forwarder)
                .await
                .is_err()
            {
                tracing::debug!("{}: output still open after exit", invocation.log_prefix);
                forwarder.abort();
            }
        }

        Ok(ProcessExit {
            code: status.code(),
        })
    }
}

fn forward_lines<R>(reader: R, prefix: String) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => tracing::debug!("{}: {}", prefix, line),
                Ok(None) => break,
                Err(err) => {
                    tracing::debug!(error = %err, "{}: output stream closed", prefix);
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(args: &[&str]) -> ProcessInvocation {
        ProcessInvocation {
            program: PathBuf::from("python3"),
            args: args.iter().map(|s| s.to_string()).collect(),
            working_dir: PathBuf::from("."),
            log_prefix: "PythonMutator(load)".to_string(),
        }
    }

    #[test]
    fn test_arg_value() {
        let inv = invocation(&["-m", "mod", "--phase", "load", "--output", "/tmp/out.json"]);
        assert_eq!(inv.arg_value("--phase"), Some("load"));
        assert_eq!(inv.arg_value("--output"), Some("/tmp/out.json"));
        assert_eq!(inv.arg_value("--input"), None);

        let trailing = invocation(&["--output"]);
        assert_eq!(trailing.arg_value("--output"), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(ProcessExit::with_code(3).describe(), "exit status 3");
        assert_eq!(ProcessExit { code: None }.describe(), "terminated by signal");
        assert!(ProcessExit::success().is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_native_runner_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let inv = ProcessInvocation {
            program: PathBuf::from("/bin/sh"),
            args: vec![
                "-c".to_string(),
                "echo hello; echo oops >&2; pwd > cwd.txt; exit 3".to_string(),
            ],
            working_dir: dir.path().to_path_buf(),
            log_prefix: "test".to_string(),
        };

        let exit = NativeProcessRunner.run(&inv).await.unwrap();
        assert_eq!(exit, ProcessExit::with_code(3));

        let cwd = std::fs::read_to_string(dir.path().join("cwd.txt")).unwrap();
        assert_eq!(
            std::fs::canonicalize(cwd.trim()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_native_runner_ignores_background_output() {
        let inv = ProcessInvocation {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "sleep 30 & echo started; exit 0".to_string()],
            working_dir: PathBuf::from("."),
            log_prefix: "test".to_string(),
        };

        let started = std::time::Instant::now();
        let exit = NativeProcessRunner.run(&inv).await.unwrap();

        assert!(exit.is_success());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_native_runner_missing_program() {
        let inv = ProcessInvocation {
            program: PathBuf::from("/definitely/not/here/python3"),
            args: vec![],
            working_dir: PathBuf::from("."),
            log_prefix: "test".to_string(),
        };
        assert!(NativeProcessRunner.run(&inv).await.is_err());
    }
}
