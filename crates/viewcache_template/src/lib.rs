//! Template compilation for the viewcache pre-cache.
//!
//! The cache itself is agnostic to the template language: it only needs a
//! [`TemplateCompiler`] that turns source text into a [`CompiledTemplate`].
//! A compiled template is a plain data program that can be serialized,
//! stored, and reloaded without re-reading or re-evaluating source text.
//!
//! [`PlaceholderCompiler`] is the built-in language: literal text with
//! `{{ path }}` (escaped), `{{& path }}` (raw) and `{{! comment }}` tags.

#![warn(missing_docs)]

pub mod compiler;
pub mod error;
pub mod program;

pub use compiler::{PlaceholderCompiler, TemplateCompiler};
pub use error::{CompileError, ProgramCodecError};
pub use program::{CompiledTemplate, Op};
