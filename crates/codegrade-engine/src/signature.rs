//! Signature verification.
//!
//! Scans the submission for a `def <name>(<params>):` declaration and checks
//! it against the contract. A small hand-rolled scanner, not a regex: it
//! tolerates arbitrary whitespace, skips comment lines, and reports exactly
//! which part of the declaration is wrong.

use codegrade_spec::FunctionContract;
use thiserror::Error;

/// Why a submission failed signature verification.
///
/// These are grading signals, not operational errors: each one zeroes the
/// score and terminates the run as graded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureFailure {
    /// No declaration of the required function was found
    #[error("function '{0}' was not found in the submission")]
    NotFound(String),

    /// The declaration exists but its parameter list does not match
    #[error("function '{name}' expects parameters ({expected}) but declares ({found})")]
    ArgMismatch {
        /// The required function name
        name: String,
        /// Comma-joined required parameter names
        expected: String,
        /// Comma-joined declared parameter names
        found: String,
    },

    /// The declaration uses a form outside the supported subset
    /// (defaults, `*args`/`**kwargs`, annotations)
    #[error("function '{0}' uses an unsupported declaration form")]
    UnsupportedForm(String),
}

/// Verify that `source` declares the contract's function with exactly the
/// contract's parameter names, in order.
///
/// # Errors
///
/// Returns the first [`SignatureFailure`] encountered for the target
/// function, or [`SignatureFailure::NotFound`] when no candidate exists.
pub fn verify_signature(
    source: &str,
    contract: &FunctionContract,
) -> std::result::Result<(), SignatureFailure> {
    let mut scanner = Scanner::new(source);
    while let Some(candidate) = scanner.next_def() {
        if candidate.name != contract.name {
            continue;
        }
        let params = candidate
            .params
            .ok_or_else(|| SignatureFailure::UnsupportedForm(contract.name.clone()))?;
        let expected = contract.param_names();
        if params != expected {
            return Err(SignatureFailure::ArgMismatch {
                name: contract.name.clone(),
                expected: expected.join(", "),
                found: params.join(", "),
            });
        }
        log::debug!("signature of '{}' verified", contract.name);
        return Ok(());
    }
    Err(SignatureFailure::NotFound(contract.name.clone()))
}

/// A `def` declaration found in the source. `params` is `None` when the
/// parameter list uses an unsupported form.
struct DefCandidate {
    name: String,
    params: Option<Vec<String>>,
}

/// Blank out string literals and comments, preserving newlines, so the
/// declaration scan never matches text inside them.
fn strip_noise(source: &str) -> Vec<char> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(' ');
                    i += 1;
                }
            }
            quote @ ('\'' | '"') => {
                let triple =
                    chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote);
                let delim = if triple { 3 } else { 1 };
                for _ in 0..delim {
                    out.push(' ');
                    i += 1;
                }
                while i < chars.len() {
                    if chars[i] == '\\' {
                        out.push(' ');
                        i += 1;
                        if i < chars.len() {
                            out.push(if chars[i] == '\n' { '\n' } else { ' ' });
                            i += 1;
                        }
                        continue;
                    }
                    if chars[i] == quote
                        && (!triple
                            || (chars.get(i + 1) == Some(&quote)
                                && chars.get(i + 2) == Some(&quote)))
                    {
                        for _ in 0..delim {
                            out.push(' ');
                            i += 1;
                        }
                        break;
                    }
                    if chars[i] == '\n' {
                        if !triple {
                            // unterminated one-line literal ends at EOL
                            break;
                        }
                        out.push('\n');
                        i += 1;
                        continue;
                    }
                    out.push(' ');
                    i += 1;
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: strip_noise(source),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            if let Some(c) = self.bump() {
                ident.push(c);
            }
        }
        ident
    }

    /// Advance to the next `def` keyword and parse the declaration head.
    fn next_def(&mut self) -> Option<DefCandidate> {
        loop {
            self.skip_spaces();
            match self.peek()? {
                c if c.is_alphabetic() || c == '_' => {
                    let word = self.read_identifier();
                    if word == "def" {
                        return Some(self.parse_def_head());
                    }
                }
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    /// Parse `<name> ( <params> ) :` after the `def` keyword. A malformed
    /// or unsupported parameter list yields `params: None`.
    fn parse_def_head(&mut self) -> DefCandidate {
        self.skip_spaces();
        let name = self.read_identifier();
        self.skip_spaces();
        if self.peek() != Some('(') {
            return DefCandidate { name, params: None };
        }
        self.pos += 1;

        let mut params = Vec::new();
        let mut supported = true;
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c.is_alphabetic() || c == '_' => {
                    let param = self.read_identifier();
                    self.skip_spaces();
                    match self.peek() {
                        Some(',') => {
                            self.pos += 1;
                            params.push(param);
                        }
                        Some(')') => {
                            params.push(param);
                        }
                        // default value or annotation
                        Some('=' | ':') => {
                            supported = false;
                            self.recover_to_close_paren();
                            break;
                        }
                        _ => {
                            supported = false;
                            self.recover_to_close_paren();
                            break;
                        }
                    }
                }
                // *args, **kwargs, or anything else
                Some(_) => {
                    supported = false;
                    self.recover_to_close_paren();
                    break;
                }
                None => {
                    supported = false;
                    break;
                }
            }
        }

        if supported {
            self.skip_spaces();
            if self.peek() != Some(':') {
                supported = false;
            }
        }

        DefCandidate {
            name,
            params: supported.then_some(params),
        }
    }

    fn recover_to_close_paren(&mut self) {
        while !matches!(self.peek(), None | Some(')')) {
            self.pos += 1;
        }
        if self.peek() == Some(')') {
            self.pos += 1;
        }
    }
}
