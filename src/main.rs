//! Parse a given BL program and print a summary of it (or the program itself,
//! pretty printed) to standard output.
//!
//! Example usage:
//!
//!     cargo run -- \
//!         --src-filepath test_programs/sample.bl \
//!         --pretty-print

use bl_parse::end_to_end::{run_parser, ParserConfig};
use clap::Parser;
use tracing::Level;

fn main() {
    let parser_config = ParserConfig::parse();

    let max_level = match parser_config.verbose {
        true => Level::DEBUG,
        false => Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let parser_result = run_parser(&parser_config);

    match parser_result {
        Ok(parser_output) => {
            println!("{}", parser_output);
        }

        Err(run_error) => {
            tracing::error!(src_filepath = %parser_config.src_filepath, "parsing failed");
            eprintln!("{}", run_error);
            std::process::exit(1);
        }
    }
}
