//! Structured feature names.
//!
//! A feature is addressed by a base name plus an ordered argument list,
//! where each argument is either a literal or a nested feature expression,
//! e.g. `mysum(value(1),value(2))`. An optional trailing `.name` suffix
//! selects one specific output of the feature; without it the feature's
//! first output is addressed.
//!
//! Names compare structurally through their canonical string form, which is
//! what the graph compiler uses to share identical sub-expressions.

use std::fmt;

use crate::error::{GlaiveError, Result};

/// A parsed feature name: base, arguments and optional output suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureName {
    base: String,
    args: Vec<String>,
    output: Option<String>,
}

impl FeatureName {
    /// Parse a feature expression.
    ///
    /// Arguments are canonicalized recursively, so `mysum( value( 1 ) )`
    /// and `mysum(value(1))` parse to equal names.
    pub fn parse(text: &str) -> Result<FeatureName> {
        let mut scanner = Scanner::new(text.trim());
        let name = scanner.parse_name()?;
        if !scanner.at_end() {
            return Err(GlaiveError::parse(format!(
                "trailing characters in feature name '{text}'"
            )));
        }
        Ok(name)
    }

    /// The feature's base name (the blueprint lookup key).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The canonicalized argument list.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The output suffix, if one was given.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Canonical name of the executor this feature resolves to: base plus
    /// arguments, without any output suffix.
    pub fn executor_name(&self) -> String {
        if self.args.is_empty() {
            self.base.clone()
        } else {
            format!("{}({})", self.base, self.args.join(","))
        }
    }

    /// Canonical full name, including the output suffix when present.
    pub fn full_name(&self) -> String {
        match &self.output {
            Some(output) => format!("{}.{}", self.executor_name(), output),
            None => self.executor_name(),
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn parse_name(&mut self) -> Result<FeatureName> {
        let base = self.parse_identifier()?;
        let mut args = Vec::new();
        if self.peek() == Some(b'(') {
            self.pos += 1;
            args = self.parse_args()?;
        }
        let output = if self.peek() == Some(b'.') {
            self.pos += 1;
            Some(self.parse_identifier()?)
        } else {
            None
        };
        Ok(FeatureName { base, args, output })
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(GlaiveError::parse(format!(
                "expected identifier at offset {} in '{}'",
                start, self.text
            )));
        }
        Ok(self.text[start..self.pos].to_string())
    }

    /// Parse the argument list after the opening parenthesis, splitting at
    /// top-level commas only. Each argument that itself parses as a feature
    /// expression is replaced by its canonical form; anything else is kept
    /// as a trimmed literal.
    fn parse_args(&mut self) -> Result<Vec<String>> {
        let mut args = Vec::new();
        let mut start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => {
                    return Err(GlaiveError::parse(format!(
                        "unbalanced parentheses in '{}'",
                        self.text
                    )));
                }
                Some(b'(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b')') if depth == 0 => {
                    let arg = self.text[start..self.pos].trim();
                    self.pos += 1;
                    if !arg.is_empty() {
                        args.push(canonicalize_arg(arg)?);
                    } else if !args.is_empty() {
                        return Err(GlaiveError::parse(format!(
                            "empty argument in '{}'",
                            self.text
                        )));
                    }
                    return Ok(args);
                }
                Some(b')') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(b',') if depth == 0 => {
                    let arg = self.text[start..self.pos].trim();
                    if arg.is_empty() {
                        return Err(GlaiveError::parse(format!(
                            "empty argument in '{}'",
                            self.text
                        )));
                    }
                    args.push(canonicalize_arg(arg)?);
                    self.pos += 1;
                    start = self.pos;
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
    }
}

fn canonicalize_arg(arg: &str) -> Result<String> {
    match arg.as_bytes().first() {
        Some(c) if c.is_ascii_alphabetic() || *c == b'_' => {
            // Feature-expression argument; nested names may carry their own
            // output suffix.
            Ok(FeatureName::parse(arg)?.full_name())
        }
        _ => Ok(arg.to_string()),
    }
}
