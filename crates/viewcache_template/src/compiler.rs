//! The compiler seam and the built-in placeholder language.

use std::path::Path;

use crate::error::CompileError;
use crate::program::{CompiledTemplate, Op};

/// Turns template source into an executable [`CompiledTemplate`].
///
/// Implementations must be deterministic: the same source must always yield
/// an equal program, because the cache relies on byte-identical encodings for
/// identical content. `filename` is informational (error messages, includes).
pub trait TemplateCompiler: Send + Sync {
    /// Compiles `source`, read from `filename`.
    fn compile(&self, source: &str, filename: &Path) -> Result<CompiledTemplate, CompileError>;
}

/// The built-in template language.
///
/// - `{{ a.b }}` emits the value at `a.b`, HTML-escaped
/// - `{{& a.b }}` emits it raw
/// - `{{! ... }}` is a comment
///
/// Everything else is literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderCompiler;

impl PlaceholderCompiler {
    /// Creates the compiler.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateCompiler for PlaceholderCompiler {
    fn compile(&self, source: &str, _filename: &Path) -> Result<CompiledTemplate, CompileError> {
        let mut ops = Vec::new();
        let mut rest = source;
        let mut line = 1;

        while let Some(open) = rest.find("{{") {
            let (text, after) = rest.split_at(open);
            ops.push(Op::Text(text.to_string()));
            line += text.matches('\n').count();

            let body_start = &after[2..];
            let close = body_start
                .find("}}")
                .ok_or(CompileError::UnterminatedTag { line })?;
            let body = &body_start[..close];
            ops.extend(parse_tag(body, line)?);

            line += body.matches('\n').count();
            rest = &body_start[close + 2..];
        }
        ops.push(Op::Text(rest.to_string()));

        Ok(CompiledTemplate::new(ops))
    }
}

fn parse_tag(body: &str, line: usize) -> Result<Option<Op>, CompileError> {
    let trimmed = body.trim();
    if trimmed.starts_with('!') {
        return Ok(None);
    }
    let (raw, expr) = match trimmed.strip_prefix('&') {
        Some(expr) => (true, expr.trim()),
        None => (false, trimmed),
    };
    if expr.is_empty() {
        return Err(CompileError::EmptyTag { line });
    }

    let path = expr
        .split('.')
        .map(|segment| {
            if is_segment(segment) {
                Ok(segment.to_string())
            } else {
                Err(CompileError::InvalidIdentifier {
                    line,
                    segment: segment.to_string(),
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(if raw { Op::Raw(path) } else { Op::Escaped(path) }))
}

/// An identifier (`[A-Za-z_][A-Za-z0-9_-]*`) or an array index (all digits).
fn is_segment(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => s.chars().all(|c| c.is_ascii_digit()),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}
