//! Process bridge to the local text-generation CLI.
//!
//! Each call spawns one instance of the configured program, writes the prompt
//! to its stdin verbatim, closes stdin to signal end-of-input, then drains
//! stdout and stderr as one merged logical stream until the process exits.
//! Lines are sanitized as they arrive so spinner repaints never accumulate in
//! the buffer.
//!
//! The whole conversation runs under a deadline; past it the child is killed
//! and the call fails with [`BridgeError::Timeout`].

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, Command};
use tokio::time;
use tracing::{debug, warn};

use super::sanitize;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to start model process `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("model process I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("model process exceeded the {0:?} deadline")]
    Timeout(Duration),
}

/// Everything the model process printed, sanitized, plus its exit code.
#[derive(Debug)]
pub struct BridgeOutput {
    pub text: String,
    /// Exit code when the process terminated normally.
    pub exit_code: Option<i32>,
}

/// One-shot subprocess runner for the model CLI. Stateless across calls;
/// every [`run`](ModelBridge::run) owns exactly one OS process.
#[derive(Debug, Clone)]
pub struct ModelBridge {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ModelBridge {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Run the model once with `prompt` on stdin and return everything it
    /// printed. Output accumulated before a non-zero exit is preserved.
    pub async fn run(&self, prompt: &str) -> Result<BridgeOutput, BridgeError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        match time::timeout(self.timeout, converse(&mut child, prompt)).await {
            Ok(result) => result,
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    warn!("failed to kill timed-out model process: {e}");
                }
                let _ = child.wait().await;
                Err(BridgeError::Timeout(self.timeout))
            }
        }
    }
}

/// Write the prompt, then drain both output pipes to EOF and reap the child.
async fn converse(child: &mut Child, prompt: &str) -> Result<BridgeOutput, BridgeError> {
    // The prompt goes out exactly as supplied; closing stdin tells the model
    // CLI there is no more input and it may start generating.
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(prompt.as_bytes()).await?;
        stdin.shutdown().await?;
    }

    let mut stdout = child.stdout.take().map(|s| BufReader::new(s).lines());
    let mut stderr = child.stderr.take().map(|s| BufReader::new(s).lines());
    let mut stdout_done = stdout.is_none();
    let mut stderr_done = stderr.is_none();

    let mut text = String::new();
    while !(stdout_done && stderr_done) {
        tokio::select! {
            line = next_line(&mut stdout), if !stdout_done => match line? {
                Some(line) => text.push_str(&sanitize::strip_terminal_noise(&line)),
                None => stdout_done = true,
            },
            line = next_line(&mut stderr), if !stderr_done => match line? {
                Some(line) => text.push_str(&sanitize::strip_terminal_noise(&line)),
                None => stderr_done = true,
            },
        }
    }

    let status = child.wait().await?;
    if !status.success() {
        debug!(code = status.code(), "model process exited with failure; keeping partial output");
    }

    Ok(BridgeOutput {
        text,
        exit_code: status.code(),
    })
}

async fn next_line<R: AsyncBufRead + Unpin>(
    lines: &mut Option<Lines<R>>,
) -> std::io::Result<Option<String>> {
    match lines {
        Some(lines) => lines.next_line().await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(program: &str, args: &[&str]) -> ModelBridge {
        ModelBridge::new(
            program,
            args.iter().map(|a| a.to_string()).collect(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn delivers_prompt_verbatim() {
        // `cat` echoes stdin, so the captured text is exactly what the
        // bridge wrote.
        let output = bridge("cat", &[]).run("provide price for book Dune by Frank Herbert")
            .await
            .unwrap();
        assert_eq!(output.text, "provide price for book Dune by Frank Herbert");
        assert_eq!(output.exit_code, Some(0));
    }

    #[tokio::test]
    async fn empty_prompt_still_invokes_the_program() {
        let output = bridge("sh", &["-c", "echo ready"]).run("").await.unwrap();
        assert_eq!(output.text, "ready");
    }

    #[tokio::test]
    async fn merges_stdout_and_stderr() {
        let output = bridge("sh", &["-c", "echo out; echo err >&2"])
            .run("")
            .await
            .unwrap();
        assert!(output.text.contains("out"));
        assert!(output.text.contains("err"));
    }

    #[tokio::test]
    async fn sanitizes_lines_as_they_stream() {
        let output = bridge("sh", &["-c", r"printf '\033[?25l\342\240\213 thinking\nPrice: $12.99\n\033[?25h'"])
            .run("")
            .await
            .unwrap();
        assert_eq!(output.text, " thinkingPrice: $12.99");
    }

    #[tokio::test]
    async fn preserves_partial_output_on_failure_exit() {
        let output = bridge("sh", &["-c", "printf 'Price: $4.50'; exit 3"])
            .run("")
            .await
            .unwrap();
        assert_eq!(output.text, "Price: $4.50");
        assert_eq!(output.exit_code, Some(3));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = bridge("definitely-not-a-real-program-xyz", &[])
            .run("hello")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Spawn { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn unresponsive_program_hits_the_deadline() {
        let bridge = ModelBridge::new(
            "sleep",
            vec!["30".to_string()],
            Duration::from_millis(200),
        );
        let err = bridge.run("").await.unwrap_err();
        assert!(matches!(err, BridgeError::Timeout(_)), "got {err:?}");
    }
}
