//! Splits BL source text into tokens and exposes them as a stream that the
//! recursive descent parsers consume front to back.

use std::collections::VecDeque;

use lazy_static::lazy_static;
use regex::Regex;

use crate::statement_tree::statement_ast::Condition;

// The different classes of tokens that compose the language.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TokenClass {
    Keyword,
    Condition,
    Identifier,
    Whitespace,
    Error,
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let class_name = match self {
            Self::Keyword => "keyword",
            Self::Condition => "condition",
            Self::Identifier => "identifier",
            Self::Whitespace => "whitespace",
            Self::Error => "error",
        };

        return write!(f, "{}", class_name);
    }
}

/// Represents a single token of the language.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub token_class: TokenClass,
    pub token_text: String,
    pub line_num: usize,
}

// Represents how to recognize a token class.
#[derive(Debug)]
struct TokenRule {
    token_class: TokenClass,
    regex: Regex,
}

/// Reserved words of BL.
pub const KEYWORDS: [&str; 10] = [
    "PROGRAM",
    "IS",
    "BEGIN",
    "END",
    "INSTRUCTION",
    "IF",
    "THEN",
    "ELSE",
    "WHILE",
    "DO",
];

// Vector of regex patterns that correspond to each token class. Every pattern
// is anchored at the start of the haystack, so a rule that does not apply
// fails at position 0 instead of scanning the rest of the input. Ties between
// rules of equal match length go to the earlier rule, so keywords and
// conditions win over identifiers spelled the same way.
lazy_static! {
    static ref token_rules: Vec<TokenRule> = vec![
        TokenRule {
            token_class: TokenClass::Keyword,
            regex: Regex::new(&format!(r"\A(?:{})", KEYWORDS.join("|")))
                .expect("Unable to compile Keyword rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Condition,
            regex: Regex::new(&format!(
                r"\A(?:{})",
                Condition::ALL.map(|condition| condition.as_str()).join("|")
            ))
            .expect("Unable to compile Condition rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Identifier,
            regex: Regex::new(r"\A[a-zA-Z][a-zA-Z0-9\-]*")
                .expect("Unable to compile Identifier rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Whitespace,
            regex: Regex::new(r"\A\s+").expect("Unable to compile Whitespace rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Error,
            regex: Regex::new(r"\A\S").expect("Unable to compile Error rule regex."),
        },
    ];
}

// Gets the rule for a specific token class.
fn get_rule_for_token_class(token_class: TokenClass) -> Option<&'static TokenRule> {
    token_rules
        .iter()
        .find(|token_rule| token_rule.token_class == token_class)
}

// Finds the rule that matches the most characters from the start of the input
// string.
fn get_longest_matching_rule(input_str: &str) -> (&'static TokenRule, usize) {
    let mut longest_match_len: usize = 0;
    let mut longest_token_rule = get_rule_for_token_class(TokenClass::Error)
        .expect("Unable to find token rule for Error token class.");

    for token_rule in token_rules.iter() {
        match token_rule
            .regex
            .find(input_str)
            .take_if(|match_obj| match_obj.start() == 0)
        {
            None => continue,
            Some(match_obj) => {
                if match_obj.len() > longest_match_len {
                    longest_match_len = match_obj.len();
                    longest_token_rule = token_rule;
                }
            }
        };
    }

    (longest_token_rule, longest_match_len)
}

// Given a string, returns a vector of tokens that comprise that string.
fn make_token_stream(program_str: &str) -> Vec<Token> {
    let mut curr_idx: usize = 0;
    let mut line_num: usize = 1;
    let mut out = Vec::new();

    while curr_idx < program_str.len() {
        // The Whitespace and Error rules together match any non-empty input,
        // so match_len is never zero here.
        let (token_rule, match_len) = get_longest_matching_rule(&program_str[curr_idx..]);

        let token_text = &program_str[curr_idx..curr_idx + match_len];

        out.push(Token {
            token_class: token_rule.token_class,
            token_text: String::from(token_text),
            line_num: line_num,
        });

        line_num += token_text.matches('\n').count();
        curr_idx += match_len;
    }

    out
}

/// Given a BL source string, returns the tokens that comprise it. When
/// `discard_uninteresting` is set, whitespace tokens are dropped.
pub fn run_lexical_analysis(program_str: &str, discard_uninteresting: bool) -> Vec<Token> {
    let mut tokens = make_token_stream(program_str);

    if discard_uninteresting {
        tokens.retain(|token| token.token_class != TokenClass::Whitespace);
    }

    tracing::trace!(token_count = tokens.len(), "finished lexical analysis");

    return tokens;
}

/// Reports whether `text` is exactly one BL identifier (and therefore not a
/// keyword or condition name).
pub fn is_identifier(text: &str) -> bool {
    let tokens = make_token_stream(text);

    return tokens.len() == 1 && tokens[0].token_class == TokenClass::Identifier;
}

/// Ordered tokens consumed destructively from the front.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    /// Tokenizes `program_str`, discarding whitespace.
    pub fn from_source(program_str: &str) -> Self {
        return Self::from(run_lexical_analysis(program_str, true));
    }

    /// The front token, without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        return self.tokens.front();
    }

    /// Removes and returns the front token.
    pub fn pop(&mut self) -> Option<Token> {
        return self.tokens.pop_front();
    }

    pub fn is_empty(&self) -> bool {
        return self.tokens.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.tokens.len();
    }

    // Whether the front token is exactly `token_text`.
    pub(crate) fn front_is(&self, token_text: &str) -> bool {
        return self
            .peek()
            .is_some_and(|token| token.token_text == token_text);
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(value: Vec<Token>) -> Self {
        return Self {
            tokens: VecDeque::from(value),
        };
    }
}
