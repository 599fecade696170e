//! python_repl tool - execute model-written Python source
//!
//! Each call runs in a fresh interpreter process. State does not carry over
//! between calls; a preamble (for example loading a dataframe) is prepended
//! to every snippet instead. A trailing expression has its repr printed, so
//! `df.shape` answers without an explicit `print`.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use tokio::process::Command;

use super::{Tool, string_input, string_input_schema};
use crate::config::PythonConfig;
use crate::error::{AgentError, Result};

/// Runs the snippet passed as `sys.argv[1]`, printing the repr of a trailing expression
const ECHO_WRAPPER: &str = r#"import ast, sys
_tree = ast.parse(sys.argv[1], "<python_repl>", "exec")
_last = None
if _tree.body and isinstance(_tree.body[-1], ast.Expr):
    _last = ast.Expression(_tree.body.pop().value)
_ns = {"__name__": "__main__"}
exec(compile(_tree, "<python_repl>", "exec"), _ns)
if _last is not None:
    _value = eval(compile(_last, "<python_repl>", "eval"), _ns)
    if _value is not None:
        print(repr(_value))
"#;

pub struct PythonReplTool {
    interpreter: String,
    timeout: Duration,
    max_output_bytes: usize,
    working_dir: PathBuf,
    echo_last_expression: bool,
    preamble: Option<String>,
}

impl PythonReplTool {
    pub fn new(config: &PythonConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            max_output_bytes: config.max_output_bytes,
            working_dir: config.working_dir.clone(),
            echo_last_expression: config.echo_last_expression,
            preamble: None,
        }
    }

    /// Source prepended to every snippet
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    fn full_source(&self, code: &str) -> String {
        match &self.preamble {
            Some(preamble) => format!("{}\n{}", preamble, code),
            None => code.to_string(),
        }
    }

    /// Interpreter arguments for one snippet
    fn command_args(&self, code: &str) -> Vec<String> {
        let source = self.full_source(code);
        if self.echo_last_expression {
            vec!["-c".to_string(), ECHO_WRAPPER.to_string(), source]
        } else {
            vec!["-c".to_string(), source]
        }
    }

    fn truncate(&self, mut output: String) -> String {
        if output.len() <= self.max_output_bytes {
            return output;
        }
        let total = output.len();
        let mut cut = self.max_output_bytes;
        while !output.is_char_boundary(cut) {
            cut -= 1;
        }
        output.truncate(cut);
        output.push_str(&format!("...\n[truncated, {} bytes total]", total));
        output
    }
}

/// Strip markdown fences, a leading `python` tag and surrounding whitespace
pub fn sanitize_code(query: &str) -> String {
    let head = query.trim_start_matches(|c: char| c.is_whitespace() || c == '`');
    let head = match head.get(..6) {
        Some(tag) if tag.eq_ignore_ascii_case("python") => &head[6..],
        _ => head,
    };
    head.trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || c == '`')
        .to_string()
}

#[async_trait]
impl Tool for PythonReplTool {
    fn name(&self) -> &str {
        "python_repl"
    }

    fn description(&self) -> &str {
        "A Python shell. Use this to execute python commands. Input should be a valid python script. \
         Use print(...) to see the value of anything you want to inspect."
    }

    fn input_schema(&self) -> Value {
        string_input_schema("query", "Python source code to execute")
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let code = sanitize_code(&string_input(&input, "query")?);
        if code.is_empty() {
            return Err(AgentError::InvalidInput("empty python source".to_string()));
        }

        debug!("python_repl executing {} bytes of source", code.len());

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.interpreter)
                .args(self.command_args(&code))
                .current_dir(&self.working_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| AgentError::Tool(format!("Execution timed out after {}ms", self.timeout.as_millis())))?
        .map_err(|e| AgentError::Tool(format!("Failed to run {}: {}", self.interpreter, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let combined = if stdout.is_empty() && !stderr.is_empty() {
            stderr.to_string()
        } else if stderr.is_empty() {
            stdout.to_string()
        } else {
            format!("{}\n\nSTDERR:\n{}", stdout, stderr)
        };
        let combined = self.truncate(combined);

        if !output.status.success() {
            return Err(AgentError::Tool(format!(
                "Exit code: {}\n{}",
                output.status.code().unwrap_or(-1),
                combined
            )));
        }

        if combined.trim().is_empty() {
            return Ok(Value::String("(no output; use print() to show values)".to_string()));
        }

        Ok(Value::String(combined))
    }
}
