/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::fmt;
use thiserror::Error;

/// A single structured diagnostic. Every fallible stage of the pipeline
/// raises one of these; the CLI prints it with `Display` and exits 1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// IO — source unreadable or destination unwritable.
    Io { line: i64, reason: String },
    /// PL — comment structure invalid (unbalanced `*/`).
    CommentStructure { line: i64, reason: String },
    /// SYM — malformed label declaration, duplicate label, reserved-name clash.
    Symbol { line: i64, reason: String },
    /// COM — unknown destination/computation/jump combination at encoding time.
    Encoding { line: i64, reason: String },
    /// MCR — macro layer: unknown macro, wrong arity, bad operand kind,
    /// out-of-range constant, reserved-name collision, unbalanced blocks,
    /// impossible operand combination.
    Macro { line: i64, reason: String },
}

impl AssemblyError {
    fn tag(&self) -> &'static str {
        match self {
            AssemblyError::Io { .. } => "IO",
            AssemblyError::CommentStructure { .. } => "PL",
            AssemblyError::Symbol { .. } => "SYM",
            AssemblyError::Encoding { .. } => "COM",
            AssemblyError::Macro { .. } => "MCR",
        }
    }

    fn line(&self) -> i64 {
        match self {
            AssemblyError::Io { line, .. }
            | AssemblyError::CommentStructure { line, .. }
            | AssemblyError::Symbol { line, .. }
            | AssemblyError::Encoding { line, .. }
            | AssemblyError::Macro { line, .. } => *line,
        }
    }

    fn reason(&self) -> &str {
        match self {
            AssemblyError::Io { reason, .. }
            | AssemblyError::CommentStructure { reason, .. }
            | AssemblyError::Symbol { reason, .. }
            | AssemblyError::Encoding { reason, .. }
            | AssemblyError::Macro { reason, .. } => reason,
        }
    }

    pub fn io(line: i64, reason: impl Into<String>) -> Self {
        AssemblyError::Io { line, reason: reason.into() }
    }

    pub fn comment(line: i64, reason: impl Into<String>) -> Self {
        AssemblyError::CommentStructure { line, reason: reason.into() }
    }

    pub fn symbol(line: i64, reason: impl Into<String>) -> Self {
        AssemblyError::Symbol { line, reason: reason.into() }
    }

    pub fn encoding(line: i64, reason: impl Into<String>) -> Self {
        AssemblyError::Encoding { line, reason: reason.into() }
    }

    pub fn macro_err(line: i64, reason: impl Into<String>) -> Self {
        AssemblyError::Macro { line, reason: reason.into() }
    }
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line() < 0 {
            write!(f, "[{}] {}", self.tag(), self.reason())
        } else {
            write!(f, "[{},{}] {}", self.tag(), self.line(), self.reason())
        }
    }
}
