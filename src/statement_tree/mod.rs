//! BL statements and programs represented as a tree where each node owns its
//! nested blocks via `Box` smart pointers, plus the recursive descent parsers
//! that build them.

pub mod program_ast;
pub mod program_recursive_descent_parsing;
pub mod statement_ast;
pub mod statement_recursive_descent_parsing;
