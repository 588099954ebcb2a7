// Structured ctest invocation
//
// The command is kept as tokens until the very last moment. `to_shell_line`
// is the only place tokens become a shell string, and it does NOT quote:
// a path with spaces or shell metacharacters will split or be interpreted.

use std::fmt;

/// A ctest command line: `ENV=VAL ... program arg ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtestCommand {
    env: Vec<(String, String)>,
    program: String,
    args: Vec<String>,
}

impl CtestCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            env: Vec::new(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Prepend a `KEY=VALUE` assignment for the child's environment
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `-D<key>=<value>`. Duplicate keys are kept, in order
    pub fn define(self, key: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("-D{}={}", key, value))
    }

    /// `-S <script>`
    pub fn script(self, script: impl Into<String>) -> Self {
        self.arg("-S").arg(script)
    }

    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// All tokens in command-line order
    pub fn tokens(&self) -> Vec<String> {
        self.env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .chain(std::iter::once(self.program.clone()))
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Join tokens into a line for `sh -c`. Unescaped on purpose; see module header
    pub fn to_shell_line(&self) -> String {
        self.tokens().join(" ")
    }
}

impl fmt::Display for CtestCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_line())
    }
}
