//! Compiled template programs and their rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProgramCodecError;

/// One instruction of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Emit literal text.
    Text(String),
    /// Look up a dotted path in the render context and emit it HTML-escaped.
    Escaped(Vec<String>),
    /// Look up a dotted path and emit it verbatim.
    Raw(Vec<String>),
}

/// An executable, serializable template.
///
/// The program depends only on the template's content, never on its file
/// name, so two byte-identical sources produce byte-identical encodings and
/// can share one stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompiledTemplate {
    ops: Vec<Op>,
}

impl CompiledTemplate {
    /// Wraps a sequence of ops. Adjacent text ops are merged.
    pub fn new(ops: Vec<Op>) -> Self {
        let mut merged: Vec<Op> = Vec::with_capacity(ops.len());
        for op in ops {
            if let Op::Text(text) = &op {
                if text.is_empty() {
                    continue;
                }
                if let Some(Op::Text(prev)) = merged.last_mut() {
                    prev.push_str(text);
                    continue;
                }
            }
            merged.push(op);
        }
        Self { ops: merged }
    }

    /// Returns the program's instructions.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Renders the template against a JSON context.
    ///
    /// Missing values and `null` render as the empty string.
    pub fn render(&self, ctx: &Value) -> String {
        let mut out = String::new();
        for op in &self.ops {
            match op {
                Op::Text(text) => out.push_str(text),
                Op::Escaped(path) => {
                    if let Some(v) = lookup(ctx, path) {
                        escape_into(&mut out, &stringify(v));
                    }
                }
                Op::Raw(path) => {
                    if let Some(v) = lookup(ctx, path) {
                        out.push_str(&stringify(v));
                    }
                }
            }
        }
        out
    }

    /// Encodes the program with bincode's standard configuration.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProgramCodecError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
            ProgramCodecError {
                reason: e.to_string(),
            }
        })
    }

    /// Decodes a program previously produced by [`CompiledTemplate::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramCodecError> {
        let (program, read) =
            bincode::serde::decode_from_slice::<Self, _>(bytes, bincode::config::standard())
                .map_err(|e| ProgramCodecError {
                    reason: e.to_string(),
                })?;
        if read != bytes.len() {
            return Err(ProgramCodecError {
                reason: format!("{} trailing bytes", bytes.len() - read),
            });
        }
        Ok(program)
    }
}

fn lookup<'a>(ctx: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = ctx;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
