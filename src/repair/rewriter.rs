use async_trait::async_trait;
use std::any::Any;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::core::config::ModelConfig;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to start model command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model command I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("model command exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("repair was cancelled")]
    Cancelled,

    #[error("rewriter panicked: {0}")]
    Panicked(String),
}

impl RewriteError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        RewriteError::Panicked(message)
    }
}

/// The external text-rewriting collaborator. Its output is untrusted.
#[async_trait]
pub trait Rewriter: Send + Sync {
    fn name(&self) -> &str;
    async fn rewrite(&self, prompt: &str) -> Result<String, RewriteError>;
}

/// Runs a model CLI, feeding the prompt on stdin and reading the answer from stdout.
pub struct CommandRewriter {
    command: String,
    args: Vec<String>,
}

impl CommandRewriter {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

#[async_trait]
impl Rewriter for CommandRewriter {
    fn name(&self) -> &str {
        &self.command
    }

    async fn rewrite(&self, prompt: &str) -> Result<String, RewriteError> {
        tracing::debug!(command = %self.command, args = ?self.args, "spawning model command");
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RewriteError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // Feed stdin concurrently so a chatty child cannot fill its stdout pipe and stall.
        let feeder = child.stdin.take().map(|mut stdin| {
            let bytes = prompt.as_bytes().to_vec();
            tokio::spawn(async move {
                stdin.write_all(&bytes).await?;
                stdin.shutdown().await
            })
        });

        let output = child.wait_with_output().await?;
        if let Some(feeder) = feeder {
            match feeder.await {
                Ok(Ok(())) => {}
                // The child may exit without draining stdin; its status decides.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(RewriteError::Io(e)),
                Err(e) => return Err(RewriteError::Io(std::io::Error::other(e))),
            }
        }
        if !output.status.success() {
            return Err(RewriteError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let response = String::from_utf8_lossy(&output.stdout).into_owned();
        if response.trim().is_empty() {
            return Err(RewriteError::EmptyResponse);
        }
        Ok(response)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_echoes_prompt() {
        let rewriter = CommandRewriter::new("cat", vec![]);
        let response = rewriter.rewrite("flowchart TD\nA-->B\n").await.unwrap();
        assert_eq!(response, "flowchart TD\nA-->B\n");
    }

    #[tokio::test]
    async fn test_missing_command_is_spawn_error() {
        let rewriter = CommandRewriter::new("definitely-not-a-model-cli-4242", vec![]);
        let err = rewriter.rewrite("prompt").await.unwrap_err();
        assert!(matches!(err, RewriteError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let rewriter = CommandRewriter::new("sh", vec!["-c".to_string(), "cat >/dev/null; echo nope >&2; exit 3".to_string()]);
        let err = rewriter.rewrite("prompt").await.unwrap_err();
        match err {
            RewriteError::NonZeroExit { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_output_is_an_error() {
        let rewriter = CommandRewriter::new("sh", vec!["-c".to_string(), "cat >/dev/null".to_string()]);
        let err = rewriter.rewrite("prompt").await.unwrap_err();
        assert!(matches!(err, RewriteError::EmptyResponse));
    }
}
