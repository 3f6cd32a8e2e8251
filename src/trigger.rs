use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::CheckError;

/// Captured result of one kill script run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the child was ended by a signal.
    pub exit_code: Option<i32>,
}

impl InvocationOutput {
    /// The script's exit code is not trusted; anything on stderr is.
    pub fn reported_error(&self) -> bool {
        !self.stderr.is_empty()
    }
}

#[async_trait]
pub trait KillTrigger: Send + Sync {
    async fn invoke(&self, args: &[OsString]) -> Result<InvocationOutput, CheckError>;
}

/// Runs the configured kill command with forwarded arguments appended.
pub struct KillScript {
    program: String,
    leading_args: Vec<String>,
}

impl KillScript {
    pub fn from_command(command: &[String]) -> Result<Self, CheckError> {
        let (program, leading_args) = command
            .split_first()
            .ok_or_else(|| CheckError::Configuration("kill_command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
        })
    }
}

#[async_trait]
impl KillTrigger for KillScript {
    async fn invoke(&self, args: &[OsString]) -> Result<InvocationOutput, CheckError> {
        debug!("Launching {} {:?} {:?}", self.program, self.leading_args, args);

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CheckError::Invocation(format!("cannot launch {}: {}", self.program, e)))?;

        let result = InvocationOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        debug!("{} exited with {:?}", self.program, result.exit_code);
        Ok(result)
    }
}
