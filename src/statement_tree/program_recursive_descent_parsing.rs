//! Recursive descent parser for whole BL programs. Instruction bodies and the
//! main body are handed to the block parser.

use tracing::{debug, info};

use crate::lexical_analysis::{Token, TokenClass, TokenStream};
use crate::statement_tree::program_ast::{is_primitive_instruction, Program};
use crate::statement_tree::statement_ast::Statement;
use crate::statement_tree::statement_recursive_descent_parsing::{
    parse_block, try_token_class, try_token_text, ParseError,
};

/// Pops an identifier and checks that it repeats `expected_name`.
fn try_closing_name(tokens: &mut TokenStream, expected_name: &str) -> Result<Token, ParseError> {
    let name_token = try_token_class(tokens, TokenClass::Identifier)?;

    if name_token.token_text != expected_name {
        return Err(ParseError::MismatchedName {
            expected_name: String::from(expected_name),
            found_name: name_token.token_text,
            line_num: name_token.line_num,
        });
    }

    return Ok(name_token);
}

/// Tries to parse an instruction definition that looks like
/// `INSTRUCTION [IDENTIFIER] IS [BLOCK] END [IDENTIFIER]`.
fn try_instruction_rule(
    tokens: &mut TokenStream,
    max_nesting_depth: usize,
) -> Result<(Token, Statement), ParseError> {
    try_token_text(tokens, "INSTRUCTION")?;
    let name_token = try_token_class(tokens, TokenClass::Identifier)?;

    if is_primitive_instruction(name_token.token_text.as_str()) {
        return Err(ParseError::PrimitiveInstructionRedefined {
            instruction_name: name_token.token_text,
            line_num: name_token.line_num,
        });
    }

    try_token_text(tokens, "IS")?;
    let instruction_body = parse_block(tokens, max_nesting_depth)?;
    try_token_text(tokens, "END")?;
    try_closing_name(tokens, name_token.token_text.as_str())?;

    debug!(
        instruction_name = %name_token.token_text,
        length = instruction_body.length_of_block(),
        "parsed instruction"
    );

    return Ok((name_token, instruction_body));
}

/// Uses recursive descent to parse a whole program:
///
/// ```text
/// PROGRAM [IDENTIFIER] IS
///     (INSTRUCTION [IDENTIFIER] IS [BLOCK] END [IDENTIFIER])*
/// BEGIN
///     [BLOCK]
/// END [IDENTIFIER]
/// ```
///
/// The `PROGRAM [IDENTIFIER] IS` header may be left out, in which case the
/// program takes its name from the final `END`. Duplicate or primitive
/// instruction names, mismatched closing names and tokens after the final
/// name are all errors.
pub fn parse_program(
    tokens: &mut TokenStream,
    max_nesting_depth: usize,
) -> Result<Program, ParseError> {
    let mut program = Program::new();

    let declared_name = match tokens.front_is("PROGRAM") {
        true => {
            try_token_text(tokens, "PROGRAM")?;
            let name_token = try_token_class(tokens, TokenClass::Identifier)?;
            try_token_text(tokens, "IS")?;
            Some(name_token.token_text)
        }
        false => None,
    };

    let mut context = program.new_context();

    while tokens.front_is("INSTRUCTION") {
        let (name_token, instruction_body) = try_instruction_rule(tokens, max_nesting_depth)?;

        if context.contains_key(&name_token.token_text) {
            return Err(ParseError::DuplicateInstruction {
                instruction_name: name_token.token_text,
                line_num: name_token.line_num,
            });
        }

        context.insert(name_token.token_text, instruction_body);
    }

    try_token_text(tokens, "BEGIN")?;
    let mut body = parse_block(tokens, max_nesting_depth)?;
    try_token_text(tokens, "END")?;

    let program_name = match declared_name {
        Some(declared_name) => try_closing_name(tokens, declared_name.as_str())?.token_text,
        None => try_token_class(tokens, TokenClass::Identifier)?.token_text,
    };

    if let Some(token) = tokens.peek() {
        return Err(ParseError::TrailingInput {
            found_token_text: token.token_text.clone(),
            line_num: token.line_num,
        });
    }

    program.set_name(program_name.as_str());
    program.swap_context(&mut context);
    program.swap_body(&mut body);

    info!(
        program_name = %program.name(),
        instruction_count = program.context().len(),
        body_length = program.body().length_of_block(),
        "parsed program"
    );

    return Ok(program);
}

/// Tokenizes and parses a whole program from source text.
pub fn parse_program_str(
    program_str: &str,
    max_nesting_depth: usize,
) -> Result<Program, ParseError> {
    let mut tokens = TokenStream::from_source(program_str);
    return parse_program(&mut tokens, max_nesting_depth);
}
