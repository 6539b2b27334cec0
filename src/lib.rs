//! This crate models and parses programs written in BL, a small
//! block-structured language of instructions, conditionals and loops.

pub mod end_to_end;
pub mod lexical_analysis;
pub mod statement_tree;
