//! Recursive descent parser that builds BL statements in the box-tree
//! representation from a stream of tokens.

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::lexical_analysis::{Token, TokenClass, TokenStream};
use crate::statement_tree::statement_ast::{Condition, Statement};

/// Default ceiling on how deeply IF and WHILE statements may nest.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Hard ceiling on the nesting depth a caller may request. Each level costs a
/// few stack frames, so larger requests are clamped to this value.
pub const MAX_NESTING_DEPTH_LIMIT: usize = 1024;

// The nesting ceiling actually enforced for a requested one.
fn effective_max_nesting_depth(requested: usize) -> usize {
    if requested > MAX_NESTING_DEPTH_LIMIT {
        warn!(
            requested = requested,
            limit = MAX_NESTING_DEPTH_LIMIT,
            "clamping max nesting depth"
        );
    }

    return requested.min(MAX_NESTING_DEPTH_LIMIT);
}

/// Represents a parsing error.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected token class at line {line_num}. Expected: {expected_token_class}, found: {found_token_class} {found_token_text:?}.")]
    UnexpectedTokenClass {
        expected_token_class: TokenClass,
        found_token_class: TokenClass,
        found_token_text: String,
        line_num: usize,
    },

    #[error("Unexpected token string at line {line_num}. Expected: {expected_token_string:?}, found: {found_token_string:?}.")]
    UnexpectedTokenString {
        expected_token_string: String,
        found_token_string: String,
        line_num: usize,
    },

    #[error("Unexpected token at line {line_num}. Expected: {expected}, found: {found_token_text:?}.")]
    UnexpectedToken {
        expected: String,
        found_token_text: String,
        line_num: usize,
    },

    #[error("Unexpected end of input. Expected: {expected}.")]
    UnexpectedEndOfInput { expected: String },

    #[error("Mismatched name at line {line_num}. Expected: {expected_name:?}, found: {found_name:?}.")]
    MismatchedName {
        expected_name: String,
        found_name: String,
        line_num: usize,
    },

    #[error("Instruction {instruction_name:?} at line {line_num} is already defined.")]
    DuplicateInstruction {
        instruction_name: String,
        line_num: usize,
    },

    #[error("Instruction {instruction_name:?} at line {line_num} redefines a primitive instruction.")]
    PrimitiveInstructionRedefined {
        instruction_name: String,
        line_num: usize,
    },

    #[error("Statements nest more than {max_nesting_depth} levels deep at line {line_num}.")]
    NestingTooDeep {
        max_nesting_depth: usize,
        line_num: usize,
    },

    #[error("Unexpected input after the end of the program at line {line_num}: {found_token_text:?}.")]
    TrailingInput {
        found_token_text: String,
        line_num: usize,
    },
}

/// Pops the front token if it is of the requested class.
pub(crate) fn try_token_class(
    tokens: &mut TokenStream,
    token_class: TokenClass,
) -> Result<Token, ParseError> {
    let Some(token) = tokens.peek() else {
        return Err(ParseError::UnexpectedEndOfInput {
            expected: format!("{}", token_class),
        });
    };

    match token.token_class == token_class {
        true => return Ok(pop_peeked(tokens)),
        false => {
            return Err(ParseError::UnexpectedTokenClass {
                expected_token_class: token_class,
                found_token_class: token.token_class,
                found_token_text: token.token_text.clone(),
                line_num: token.line_num,
            })
        }
    };
}

/// Pops the front token if its text is exactly `token_text`.
pub(crate) fn try_token_text(
    tokens: &mut TokenStream,
    token_text: &str,
) -> Result<Token, ParseError> {
    let Some(token) = tokens.peek() else {
        return Err(ParseError::UnexpectedEndOfInput {
            expected: format!("{:?}", token_text),
        });
    };

    match token.token_text == token_text {
        true => return Ok(pop_peeked(tokens)),
        false => {
            return Err(ParseError::UnexpectedTokenString {
                expected_token_string: String::from(token_text),
                found_token_string: token.token_text.clone(),
                line_num: token.line_num,
            });
        }
    };
}

// Only called right after a successful peek.
fn pop_peeked(tokens: &mut TokenStream) -> Token {
    return tokens
        .pop()
        .expect("A token was peeked, so the stream cannot be empty.");
}

// Line number of the front token, or of nothing if the stream is exhausted.
fn front_line_num(tokens: &TokenStream) -> usize {
    return tokens.peek().map_or(0, |token| token.line_num);
}

/// Tries to parse a condition token.
fn try_condition_rule(tokens: &mut TokenStream) -> Result<Condition, ParseError> {
    let condition_token = try_token_class(tokens, TokenClass::Condition)?;

    return Condition::from_token_text(condition_token.token_text.as_str()).ok_or_else(|| {
        ParseError::UnexpectedTokenClass {
            expected_token_class: TokenClass::Condition,
            found_token_class: condition_token.token_class,
            found_token_text: condition_token.token_text.clone(),
            line_num: condition_token.line_num,
        }
    });
}

/// Tries to parse a statement that looks like
/// `IF [CONDITION] THEN [BLOCK] (ELSE [BLOCK])? END IF`.
fn try_if_statement_rule(
    tokens: &mut TokenStream,
    depth: usize,
    max_nesting_depth: usize,
) -> Result<Statement, ParseError> {
    try_token_text(tokens, "IF")?;
    let condition = try_condition_rule(tokens)?;
    try_token_text(tokens, "THEN")?;
    let mut then_block = parse_block_rule(tokens, depth, max_nesting_depth)?;

    let mut statement = Statement::new();

    // One token of lookahead decides between IF and IF_ELSE.
    if tokens.front_is("ELSE") {
        try_token_text(tokens, "ELSE")?;
        let mut else_block = parse_block_rule(tokens, depth, max_nesting_depth)?;
        try_token_text(tokens, "END")?;
        try_token_text(tokens, "IF")?;

        statement.assemble_if_else(condition, &mut then_block, &mut else_block);
    } else {
        try_token_text(tokens, "END")?;
        try_token_text(tokens, "IF")?;

        statement.assemble_if(condition, &mut then_block);
    }

    trace!(kind = %statement.kind(), %condition, "parsed conditional");

    return Ok(statement);
}

/// Tries to parse a statement that looks like
/// `WHILE [CONDITION] DO [BLOCK] END WHILE`.
fn try_while_statement_rule(
    tokens: &mut TokenStream,
    depth: usize,
    max_nesting_depth: usize,
) -> Result<Statement, ParseError> {
    try_token_text(tokens, "WHILE")?;
    let condition = try_condition_rule(tokens)?;
    try_token_text(tokens, "DO")?;
    let mut body = parse_block_rule(tokens, depth, max_nesting_depth)?;
    try_token_text(tokens, "END")?;
    try_token_text(tokens, "WHILE")?;

    let mut statement = Statement::new();
    statement.assemble_while(condition, &mut body);

    trace!(%condition, "parsed loop");

    return Ok(statement);
}

/// Tries to parse a statement that looks like `[IDENTIFIER]`.
fn try_call_statement_rule(tokens: &mut TokenStream) -> Result<Statement, ParseError> {
    let instruction_token = try_token_class(tokens, TokenClass::Identifier)?;

    let mut statement = Statement::new();
    statement.assemble_call(instruction_token.token_text.as_str());

    return Ok(statement);
}

/// Parses one statement whose nested blocks sit at `depth + 1`.
fn parse_statement_rule(
    tokens: &mut TokenStream,
    depth: usize,
    max_nesting_depth: usize,
) -> Result<Statement, ParseError> {
    let Some(token) = tokens.peek() else {
        return Err(ParseError::UnexpectedEndOfInput {
            expected: String::from("IF, WHILE, or an instruction name"),
        });
    };

    let is_if = token.token_class == TokenClass::Keyword && token.token_text == "IF";
    let is_while = token.token_class == TokenClass::Keyword && token.token_text == "WHILE";
    let is_call = token.token_class == TokenClass::Identifier;

    if (is_if || is_while) && depth >= max_nesting_depth {
        return Err(ParseError::NestingTooDeep {
            max_nesting_depth: max_nesting_depth,
            line_num: token.line_num,
        });
    }

    if !is_if && !is_while && !is_call {
        return Err(ParseError::UnexpectedToken {
            expected: String::from("IF, WHILE, or an instruction name"),
            found_token_text: token.token_text.clone(),
            line_num: token.line_num,
        });
    }

    if is_if {
        return try_if_statement_rule(tokens, depth + 1, max_nesting_depth);
    }

    if is_while {
        return try_while_statement_rule(tokens, depth + 1, max_nesting_depth);
    }

    return try_call_statement_rule(tokens);
}

/// Parses statements until the front token is END or ELSE, or the input runs
/// out.
fn parse_block_rule(
    tokens: &mut TokenStream,
    depth: usize,
    max_nesting_depth: usize,
) -> Result<Statement, ParseError> {
    let mut block = Statement::new();

    while !tokens.is_empty() && !tokens.front_is("END") && !tokens.front_is("ELSE") {
        let mut statement = parse_statement_rule(tokens, depth, max_nesting_depth)?;
        let length = block.length_of_block();
        block.add_to_block(length, &mut statement);
    }

    return Ok(block);
}

/// Uses recursive descent to parse a block (a possibly empty sequence of
/// statements) from the front of `tokens`. Stops in front of END, ELSE, or at
/// the end of input, leaving those for the caller. `max_nesting_depth` is
/// clamped to `MAX_NESTING_DEPTH_LIMIT`.
pub fn parse_block(
    tokens: &mut TokenStream,
    max_nesting_depth: usize,
) -> Result<Statement, ParseError> {
    debug!(
        remaining_tokens = tokens.len(),
        line_num = front_line_num(tokens),
        "parsing block"
    );

    let max_nesting_depth = effective_max_nesting_depth(max_nesting_depth);
    let block = parse_block_rule(tokens, 0, max_nesting_depth)?;

    debug!(length = block.length_of_block(), "parsed block");

    return Ok(block);
}

/// Uses recursive descent to parse a single IF, IF_ELSE, WHILE or CALL
/// statement from the front of `tokens`. `max_nesting_depth` is clamped to
/// `MAX_NESTING_DEPTH_LIMIT`.
pub fn parse_statement(
    tokens: &mut TokenStream,
    max_nesting_depth: usize,
) -> Result<Statement, ParseError> {
    return parse_statement_rule(tokens, 0, effective_max_nesting_depth(max_nesting_depth));
}

#[cfg(test)]
mod tests {
    use crate::statement_tree::statement_ast::Kind;

    use super::*;

    fn parse_block_str(program_str: &str) -> Result<Statement, ParseError> {
        let mut tokens = TokenStream::from_source(program_str);
        return parse_block(&mut tokens, DEFAULT_MAX_NESTING_DEPTH);
    }

    fn call(instruction_name: &str) -> Statement {
        return Statement::Call {
            instruction_name: String::from(instruction_name),
        };
    }

    // Test if we can parse a single call.
    #[test]
    fn test_single_call() {
        let generated_output =
            parse_block_str("move").expect("parse_block returned unexpected parse error");

        assert_eq!(
            generated_output,
            Statement::Block {
                children: vec![call("move")],
            }
        );
    }

    #[test]
    fn test_empty_block() {
        let generated_output =
            parse_block_str("").expect("parse_block returned unexpected parse error");

        assert!(generated_output.is_empty_block());
    }

    // Test if we can parse every kind of statement in one block.
    #[test]
    fn test_mixed_block() {
        let program_str = r"
            infect
            IF next-is-empty THEN
                move
            END IF
            IF next-is-enemy THEN
                infect
            ELSE
                IF next-is-wall THEN
                    turnleft
                ELSE
                    move
                END IF
            END IF
            WHILE true DO
                turnright
                skip
            END WHILE
        ";

        let expected_output = Statement::Block {
            children: vec![
                call("infect"),
                Statement::If {
                    condition: Condition::NextIsEmpty,
                    then_block: Box::new(Statement::Block {
                        children: vec![call("move")],
                    }),
                },
                Statement::IfElse {
                    condition: Condition::NextIsEnemy,
                    then_block: Box::new(Statement::Block {
                        children: vec![call("infect")],
                    }),
                    else_block: Box::new(Statement::Block {
                        children: vec![Statement::IfElse {
                            condition: Condition::NextIsWall,
                            then_block: Box::new(Statement::Block {
                                children: vec![call("turnleft")],
                            }),
                            else_block: Box::new(Statement::Block {
                                children: vec![call("move")],
                            }),
                        }],
                    }),
                },
                Statement::While {
                    condition: Condition::True,
                    body: Box::new(Statement::Block {
                        children: vec![call("turnright"), call("skip")],
                    }),
                },
            ],
        };

        let generated_output =
            parse_block_str(program_str).expect("parse_block returned unexpected parse error");

        assert_eq!(generated_output, expected_output);
        assert_eq!(generated_output.length_of_block(), 4);
    }

    #[test]
    fn test_if_else_branch_sizes() {
        let program_str = r"
            IF next-is-not-wall THEN
                move
                move
            ELSE
                turnleft
                turnleft
                move
            END IF
        ";

        let mut block =
            parse_block_str(program_str).expect("parse_block returned unexpected parse error");

        assert_eq!(block.length_of_block(), 1);

        let mut statement = block.remove_from_block(0);
        assert_eq!(statement.kind(), Kind::IfElse);

        let mut then_block = Statement::new();
        let mut else_block = Statement::new();
        let condition = statement.disassemble_if_else(&mut then_block, &mut else_block);

        assert_eq!(condition, Condition::NextIsNotWall);
        assert_eq!(then_block.length_of_block(), 2);
        assert_eq!(else_block.length_of_block(), 3);
    }

    #[test]
    fn test_empty_nested_blocks() {
        let program_str = "WHILE random DO END WHILE IF true THEN ELSE END IF";

        let generated_output =
            parse_block_str(program_str).expect("parse_block returned unexpected parse error");

        assert_eq!(
            generated_output,
            Statement::Block {
                children: vec![
                    Statement::While {
                        condition: Condition::Random,
                        body: Box::new(Statement::new()),
                    },
                    Statement::IfElse {
                        condition: Condition::True,
                        then_block: Box::new(Statement::new()),
                        else_block: Box::new(Statement::new()),
                    },
                ],
            }
        );
    }

    // The block stops in front of END and leaves it in the stream.
    #[test]
    fn test_block_stops_at_end() {
        let mut tokens = TokenStream::from_source("move skip END here");

        let block = parse_block(&mut tokens, DEFAULT_MAX_NESTING_DEPTH)
            .expect("parse_block returned unexpected parse error");

        assert_eq!(block.length_of_block(), 2);
        assert!(tokens.front_is("END"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_parse_statement_consumes_one_statement() {
        let mut tokens = TokenStream::from_source("WHILE next-is-wall DO turnleft END WHILE move");

        let statement = parse_statement(&mut tokens, DEFAULT_MAX_NESTING_DEPTH)
            .expect("parse_statement returned unexpected parse error");

        assert_eq!(statement.kind(), Kind::While);
        assert!(tokens.front_is("move"));
    }

    #[test]
    fn test_missing_end_if() {
        let parse_result = parse_block_str("IF random THEN move");

        assert_eq!(
            parse_result,
            Err(ParseError::UnexpectedEndOfInput {
                expected: String::from("\"END\""),
            })
        );
    }

    #[test]
    fn test_mismatched_closing_keyword() {
        let parse_result = parse_block_str("WHILE true DO\n  move\nEND IF");

        assert_eq!(
            parse_result,
            Err(ParseError::UnexpectedTokenString {
                expected_token_string: String::from("WHILE"),
                found_token_string: String::from("IF"),
                line_num: 3,
            })
        );
    }

    #[test]
    fn test_missing_then() {
        let parse_result = parse_block_str("IF random move END IF");

        assert_eq!(
            parse_result,
            Err(ParseError::UnexpectedTokenString {
                expected_token_string: String::from("THEN"),
                found_token_string: String::from("move"),
                line_num: 1,
            })
        );
    }

    #[test]
    fn test_bad_condition() {
        let parse_result = parse_block_str("WHILE next-is-lava DO move END WHILE");

        assert_eq!(
            parse_result,
            Err(ParseError::UnexpectedTokenClass {
                expected_token_class: TokenClass::Condition,
                found_token_class: TokenClass::Identifier,
                found_token_text: String::from("next-is-lava"),
                line_num: 1,
            })
        );
    }

    #[test]
    fn test_else_inside_while_is_rejected() {
        let parse_result = parse_block_str("WHILE true DO move ELSE skip END WHILE");

        assert_eq!(
            parse_result,
            Err(ParseError::UnexpectedTokenString {
                expected_token_string: String::from("END"),
                found_token_string: String::from("ELSE"),
                line_num: 1,
            })
        );
    }

    #[test]
    fn test_unexpected_tokens_in_block() {
        for program_str in ["move THEN", "BEGIN", "true", "move ; skip"] {
            let parse_result = parse_block_str(program_str);

            assert!(
                matches!(parse_result, Err(ParseError::UnexpectedToken { .. })),
                "input {program_str:?} gave {parse_result:?}"
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let program_str = "WHILE true DO IF random THEN WHILE true DO move END WHILE END IF END WHILE";

        let mut tokens = TokenStream::from_source(program_str);
        assert!(parse_block(&mut tokens, 3).is_ok());

        let mut tokens = TokenStream::from_source(program_str);
        assert_eq!(
            parse_block(&mut tokens, 2),
            Err(ParseError::NestingTooDeep {
                max_nesting_depth: 2,
                line_num: 1,
            })
        );
    }

    #[test]
    fn test_deeply_nested_input_is_rejected() {
        let depth = DEFAULT_MAX_NESTING_DEPTH + 1;
        let program_str = format!(
            "{}move{}",
            "WHILE true DO ".repeat(depth),
            " END WHILE".repeat(depth)
        );

        let parse_result = parse_block_str(program_str.as_str());

        assert!(matches!(
            parse_result,
            Err(ParseError::NestingTooDeep {
                max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
                ..
            })
        ));
    }

    #[test]
    fn test_max_nesting_depth_is_clamped() {
        assert_eq!(effective_max_nesting_depth(0), 0);
        assert_eq!(effective_max_nesting_depth(DEFAULT_MAX_NESTING_DEPTH), DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(effective_max_nesting_depth(MAX_NESTING_DEPTH_LIMIT), MAX_NESTING_DEPTH_LIMIT);
        assert_eq!(effective_max_nesting_depth(usize::MAX), MAX_NESTING_DEPTH_LIMIT);
    }

    #[test]
    fn test_oversized_limit_reports_clamped_value() {
        let depth = MAX_NESTING_DEPTH_LIMIT + 1;
        let program_str = format!(
            "{}move{}",
            "WHILE true DO ".repeat(depth),
            " END WHILE".repeat(depth)
        );

        let parse_result = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(move || {
                let mut tokens = TokenStream::from_source(program_str.as_str());
                return parse_block(&mut tokens, usize::MAX);
            })
            .expect("Unable to spawn parser thread.")
            .join()
            .expect("Parser thread panicked.");

        assert!(matches!(
            parse_result,
            Err(ParseError::NestingTooDeep {
                max_nesting_depth: MAX_NESTING_DEPTH_LIMIT,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_error_display() {
        let parse_error = ParseError::UnexpectedTokenString {
            expected_token_string: String::from("DO"),
            found_token_string: String::from("move"),
            line_num: 7,
        };

        assert_eq!(
            parse_error.to_string(),
            "Unexpected token string at line 7. Expected: \"DO\", found: \"move\"."
        );
    }
}
