//! Scripted command runner (testing only)
//!
//! Records every command it is asked to run and answers from a list of
//! rules matched against the command line, so pipeline behaviour can be
//! exercised without git, make or a GCC tree.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::exec::{CommandRunner, ToolCommand, ToolOutput};

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    exit_code: i32,
    stdout: String,
}

/// A [`CommandRunner`] that never spawns processes.
///
/// Rules are checked in insertion order; the first whose needle is a
/// substring of the command line wins. Unmatched commands succeed with
/// empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<ToolCommand>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands matching `needle` exit with `exit_code`.
    pub fn fail_on(self, needle: &str, exit_code: i32) -> Self {
        self.push(needle, exit_code, "");
        self
    }

    /// Commands matching `needle` succeed and print `stdout`.
    pub fn reply(self, needle: &str, stdout: &str) -> Self {
        self.push(needle, 0, stdout);
        self
    }

    /// Every command run so far.
    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines run so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToolCommand::command_line).collect()
    }

    /// Whether any command line contains `needle`.
    pub fn ran(&self, needle: &str) -> bool {
        self.command_lines().iter().any(|c| c.contains(needle))
    }

    fn push(&self, needle: &str, exit_code: i32, stdout: &str) {
        self.rules.lock().unwrap().push(Rule {
            needle: needle.to_string(),
            exit_code,
            stdout: stdout.to_string(),
        });
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        self.calls.lock().unwrap().push(command.clone());
        let line = command.command_line();
        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| line.contains(&r.needle))
            .cloned();

        let (exit_code, stdout) = match rule {
            Some(r) => (r.exit_code, r.stdout),
            None => (0, String::new()),
        };
        Ok(ToolOutput {
            exit_code: Some(exit_code),
            stdout,
            stderr: String::new(),
            duration: Duration::ZERO,
        })
    }
}
