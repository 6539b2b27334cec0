//! Code to configure and run the parser on an input source code file.

use std::fs;

use clap::Parser;
use thiserror::Error;
use tracing::debug;

use crate::lexical_analysis::TokenStream;
use crate::statement_tree::program_ast::Program;
use crate::statement_tree::program_recursive_descent_parsing::parse_program;
use crate::statement_tree::statement_recursive_descent_parsing::{
    ParseError, DEFAULT_MAX_NESTING_DEPTH, MAX_NESTING_DEPTH_LIMIT,
};

/// Config for the parser. Instantiate via `ParserConfig::parse()`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about, long_about = None)]
pub struct ParserConfig {
    /// The input filepath to parse.
    #[arg(short, long)]
    pub src_filepath: String,

    /// How deeply IF and WHILE statements may nest before the input is
    /// rejected (at most 1024).
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_MAX_NESTING_DEPTH,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new()
            .range(0..=MAX_NESTING_DEPTH_LIMIT as u64)
    )]
    pub max_nesting_depth: usize,

    /// Print the parsed program back as formatted BL source instead of a
    /// summary.
    #[arg(short, long)]
    pub pretty_print: bool,

    /// Log parser progress to standard error.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        return ParserConfig {
            src_filepath: String::new(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            pretty_print: false,
            verbose: false,
        };
    }
}

/// Errors that may be thrown when running the parser.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Input file error: {0}")]
    InputFileError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ProgramParseError(#[from] ParseError),
}

/// Describes a parsed program: its name, each instruction with the number of
/// statements in its body, and the number of statements in the main body.
pub fn program_summary(program: &Program) -> String {
    let mut out = vec![format!("Program: {}", program.name())];

    let mut instruction_names: Vec<&String> = program.context().keys().collect();
    instruction_names.sort();

    out.push(format!("Instructions: {}", instruction_names.len()));
    for instruction_name in instruction_names {
        out.push(format!(
            "  {} ({} statements)",
            instruction_name,
            program.context()[instruction_name].length_of_block()
        ));
    }

    out.push(format!(
        "Body: {} statements",
        program.body().length_of_block()
    ));

    return out.join("\n");
}

/// Parse a BL source string according to the given config.
pub fn run_parser_on_str(program_str: &str, config: &ParserConfig) -> Result<String, RunError> {
    // Run lexer.
    let mut tokens = TokenStream::from_source(program_str);
    debug!(token_count = tokens.len(), "tokenized input");

    // Run parser.
    let program = parse_program(&mut tokens, config.max_nesting_depth)?;

    // Render the result.
    if config.pretty_print {
        return Ok(program.to_string());
    }

    return Ok(program_summary(&program));
}

/// Run the parser (i.e. read the file, tokenize and parse it) given a parser
/// config.
pub fn run_parser(config: &ParserConfig) -> Result<String, RunError> {
    // Read the input file into a string.
    let program_string = fs::read_to_string(&config.src_filepath)?;

    return run_parser_on_str(program_string.as_str(), config);
}
