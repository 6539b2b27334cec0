//! The BL program: a name, the user-defined instructions (its context), and
//! the main body.

use std::collections::HashMap;

use crate::lexical_analysis::is_identifier;
use crate::statement_tree::statement_ast::{statement_to_string, Kind, Statement, INDENT_SIZE};

/// Name given to a program before one is set or parsed.
pub const DEFAULT_PROGRAM_NAME: &str = "Unnamed";

/// Instructions built into BL, which user instructions may not redefine.
pub const PRIMITIVE_INSTRUCTIONS: [&str; 5] = ["move", "turnleft", "turnright", "infect", "skip"];

/// Maps instruction names to their bodies.
pub type Context = HashMap<String, Statement>;

/// Whether `instruction_name` is one of the primitive instructions.
pub fn is_primitive_instruction(instruction_name: &str) -> bool {
    return PRIMITIVE_INSTRUCTIONS.contains(&instruction_name);
}

/// Represents a whole BL program. The context and body are only reachable
/// for editing through the swap operations, which exchange them with a
/// caller-held value in place.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Program {
    name: String,
    context: Context,
    body: Statement,
}

impl Default for Program {
    fn default() -> Self {
        return Program {
            name: String::from(DEFAULT_PROGRAM_NAME),
            context: Context::new(),
            body: Statement::new(),
        };
    }
}

impl Program {
    pub fn new() -> Self {
        return Self::default();
    }

    pub fn name(&self) -> &str {
        return self.name.as_str();
    }

    /// Replaces the program name. The name must be a valid identifier.
    pub fn set_name(&mut self, name: &str) {
        assert!(
            is_identifier(name),
            "set_name requires a valid identifier, found {:?}.",
            name
        );

        self.name = String::from(name);
    }

    /// Returns a fresh, empty context.
    pub fn new_context(&self) -> Context {
        return Context::new();
    }

    /// Exchanges the program's context with `context`.
    ///
    /// Every entry of the incoming context must map a non-primitive
    /// identifier to a block.
    pub fn swap_context(&mut self, context: &mut Context) {
        for (instruction_name, instruction_body) in context.iter() {
            assert!(
                is_identifier(instruction_name) && !is_primitive_instruction(instruction_name),
                "swap_context requires instruction names to be non-primitive identifiers, found {:?}.",
                instruction_name
            );
            assert!(
                instruction_body.kind() == Kind::Block,
                "swap_context requires the body of {:?} to be a BLOCK statement, found {}.",
                instruction_name,
                instruction_body.kind()
            );
        }

        std::mem::swap(&mut self.context, context);
    }

    /// Returns a fresh, empty body.
    pub fn new_body(&self) -> Statement {
        return Statement::new();
    }

    /// Exchanges the program's body with `body`, which must be a block.
    pub fn swap_body(&mut self, body: &mut Statement) {
        assert!(
            body.kind() == Kind::Block,
            "swap_body requires a BLOCK statement, found {}.",
            body.kind()
        );

        std::mem::swap(&mut self.body, body);
    }

    /// Read-only view of the instructions.
    pub fn context(&self) -> &Context {
        return &self.context;
    }

    /// Read-only view of the main body.
    pub fn body(&self) -> &Statement {
        return &self.body;
    }
}

// Helper function to produce the BL source of a program.
fn program_to_string_helper(program: &Program, string_so_far: &mut String) {
    string_so_far.push_str(format!("PROGRAM {} IS\n\n", program.name).as_str());

    let mut instruction_names: Vec<&String> = program.context.keys().collect();
    instruction_names.sort();

    for instruction_name in instruction_names {
        let pad = " ".repeat(INDENT_SIZE);
        string_so_far.push_str(format!("{}INSTRUCTION {} IS\n", pad, instruction_name).as_str());
        string_so_far.push_str(
            statement_to_string(&program.context[instruction_name], 2 * INDENT_SIZE).as_str(),
        );
        string_so_far.push_str(format!("{}END {}\n\n", pad, instruction_name).as_str());
    }

    string_so_far.push_str("BEGIN\n");
    string_so_far.push_str(statement_to_string(&program.body, INDENT_SIZE).as_str());
    string_so_far.push_str(format!("END {}\n", program.name).as_str());
}

/// Pretty prints a program as BL source. Instructions appear sorted by name.
pub fn program_to_string(program: &Program) -> String {
    let mut out_string = String::new();
    program_to_string_helper(program, &mut out_string);
    return out_string;
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", program_to_string(self).as_str());
    }
}
