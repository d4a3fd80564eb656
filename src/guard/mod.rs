//! Guard grammar: boolean predicates compiled to WHERE-clause fragments.
//!
//! Guards express row/tenant access control. A guard document is either a
//! shorthand string (`"allow"`, `"deny"`, `"tenant"`) or a JSON document
//! with an `expr` tree; compilation renders it to a boolean fragment for
//! the selected target.
//!
//! Parsing and compilation are both total: malformed input degrades to a
//! deny-all literal and unknown operators render as generic function
//! calls, so every guard compiles to *some* text.

pub mod ast;
pub mod compiler;
pub mod parser;

pub use ast::{GuardDocument, GuardExpr, GuardOp, ScalarValue};
pub use compiler::{compile_dsl, compile_guard_to_sql, CompiledGuard, GuardCompiler};
pub use parser::{parse_document, parse_document_str, parse_expr};
