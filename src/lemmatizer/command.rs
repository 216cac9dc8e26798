use super::{LemmaFuture, Lemmatizer, LemmatizerError, parse_lemmas};

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs an external program once per request.
///
/// The words are passed, space-joined, as the final argument; the program must
/// print a JSON array with one lemma per word. The child is killed when the
/// call times out or the request is dropped.
pub struct CommandLemmatizer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandLemmatizer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Builds from a whitespace-separated command line, e.g.
    /// `"python3 scripts/normalize_query.py"`. `None` for a blank line.
    pub fn from_command_line(line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, words: &[String]) -> Result<Vec<String>, LemmatizerError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(words.join(" "))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| LemmatizerError::Timeout(self.timeout))?
            .map_err(LemmatizerError::Spawn)?;

        if !output.status.success() {
            return Err(LemmatizerError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_lemmas(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Lemmatizer for CommandLemmatizer {
    fn name(&self) -> &'static str {
        "command"
    }

    fn lemmatize<'a>(&'a self, words: &'a [String]) -> LemmaFuture<'a> {
        Box::pin(self.run(words))
    }
}
