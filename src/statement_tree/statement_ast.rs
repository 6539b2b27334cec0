//! Data structures to represent BL statements as a box tree, together with the
//! structural-edit operations used to build and take them apart.
//!
//! Every edit follows the same transfer discipline: a statement passed in by
//! `&mut` to supply a sub-structure gives that structure up and is left as an
//! empty block, and a statement passed in to receive a sub-structure has its
//! previous content replaced.

use crate::lexical_analysis::is_identifier;

/// Number of spaces added per nesting level when pretty printing.
pub const INDENT_SIZE: usize = 4;

/// The tag of a statement node.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Kind {
    Block,
    If,
    IfElse,
    While,
    Call,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_name = match self {
            Self::Block => "BLOCK",
            Self::If => "IF",
            Self::IfElse => "IF_ELSE",
            Self::While => "WHILE",
            Self::Call => "CALL",
        };

        return write!(f, "{}", kind_name);
    }
}

/// The sensor tests that can guard IF, IF_ELSE and WHILE statements.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Condition {
    NextIsEmpty,
    NextIsNotEmpty,
    NextIsWall,
    NextIsNotWall,
    NextIsFriend,
    NextIsNotFriend,
    NextIsEnemy,
    NextIsNotEnemy,
    Random,
    True,
}

impl Condition {
    /// Every condition, in declaration order. The tokenizer builds its
    /// condition rule from this list.
    pub const ALL: [Condition; 10] = [
        Self::NextIsEmpty,
        Self::NextIsNotEmpty,
        Self::NextIsWall,
        Self::NextIsNotWall,
        Self::NextIsFriend,
        Self::NextIsNotFriend,
        Self::NextIsEnemy,
        Self::NextIsNotEnemy,
        Self::Random,
        Self::True,
    ];

    /// The spelling of this condition in BL source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NextIsEmpty => "next-is-empty",
            Self::NextIsNotEmpty => "next-is-not-empty",
            Self::NextIsWall => "next-is-wall",
            Self::NextIsNotWall => "next-is-not-wall",
            Self::NextIsFriend => "next-is-friend",
            Self::NextIsNotFriend => "next-is-not-friend",
            Self::NextIsEnemy => "next-is-enemy",
            Self::NextIsNotEnemy => "next-is-not-enemy",
            Self::Random => "random",
            Self::True => "true",
        }
    }

    /// Looks up a condition by its BL spelling.
    pub fn from_token_text(token_text: &str) -> Option<Condition> {
        return Self::ALL
            .into_iter()
            .find(|condition| condition.as_str() == token_text);
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", self.as_str());
    }
}

/// Represents a BL statement. Nested blocks of IF, IF_ELSE and WHILE
/// statements are always `Block` statements, and the children of a `Block`
/// are never blocks themselves.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Statement {
    Block {
        children: Vec<Statement>,
    },
    If {
        condition: Condition,
        then_block: Box<Statement>,
    },
    IfElse {
        condition: Condition,
        then_block: Box<Statement>,
        else_block: Box<Statement>,
    },
    While {
        condition: Condition,
        body: Box<Statement>,
    },
    Call {
        instruction_name: String,
    },
}

/// The empty block.
impl Default for Statement {
    fn default() -> Self {
        return Statement::Block {
            children: Vec::new(),
        };
    }
}

impl Statement {
    /// Returns an empty block.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Returns a fresh empty block, regardless of what `self` holds.
    pub fn new_instance_like(&self) -> Self {
        return Self::default();
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Block { .. } => Kind::Block,
            Self::If { .. } => Kind::If,
            Self::IfElse { .. } => Kind::IfElse,
            Self::While { .. } => Kind::While,
            Self::Call { .. } => Kind::Call,
        }
    }

    /// Whether `self` is a block with no children.
    pub fn is_empty_block(&self) -> bool {
        return matches!(self, Self::Block { children } if children.is_empty());
    }

    // Borrows the children of a block, panicking if `self` is not a block.
    fn block_children(&self, operation: &str) -> &Vec<Statement> {
        match self {
            Self::Block { children } => children,
            _ => panic!("{} requires a BLOCK statement, found {}.", operation, self.kind()),
        }
    }

    fn block_children_mut(&mut self, operation: &str) -> &mut Vec<Statement> {
        let kind = self.kind();

        match self {
            Self::Block { children } => children,
            _ => panic!("{} requires a BLOCK statement, found {}.", operation, kind),
        }
    }

    /// Number of statements directly inside this block.
    pub fn length_of_block(&self) -> usize {
        return self.block_children("length_of_block").len();
    }

    /// Moves `child` into this block at `index`, shifting later children
    /// right. `child` is left as an empty block.
    pub fn add_to_block(&mut self, index: usize, child: &mut Statement) {
        assert!(
            child.kind() != Kind::Block,
            "add_to_block cannot nest a BLOCK statement directly inside a block."
        );

        let children = self.block_children_mut("add_to_block");
        assert!(
            index <= children.len(),
            "add_to_block index {} out of range for block of length {}.",
            index,
            children.len()
        );

        children.insert(index, std::mem::take(child));
    }

    /// Removes and returns the child at `index`, shifting later children
    /// left.
    pub fn remove_from_block(&mut self, index: usize) -> Statement {
        let children = self.block_children_mut("remove_from_block");
        assert!(
            index < children.len(),
            "remove_from_block index {} out of range for block of length {}.",
            index,
            children.len()
        );

        return children.remove(index);
    }

    /// Turns `self` into an IF statement guarded by `condition` whose
    /// then-branch is the content of `then_block`. Whatever `self` held before
    /// is discarded and `then_block` is left empty.
    pub fn assemble_if(&mut self, condition: Condition, then_block: &mut Statement) {
        assert_block_argument("assemble_if", "then_block", then_block);

        *self = Self::If {
            condition: condition,
            then_block: Box::new(std::mem::take(then_block)),
        };
    }

    /// Takes an IF statement apart: the then-branch moves into `then_block`,
    /// `self` becomes an empty block, and the condition is returned.
    pub fn disassemble_if(&mut self, then_block: &mut Statement) -> Condition {
        assert_kind("disassemble_if", self, Kind::If);
        assert_empty_argument("disassemble_if", "then_block", then_block);

        match std::mem::take(self) {
            Self::If {
                condition,
                then_block: branch,
            } => {
                *then_block = *branch;
                return condition;
            }
            _ => unreachable!("kind was checked above"),
        }
    }

    /// Turns `self` into an IF_ELSE statement. Both branch arguments are left
    /// empty.
    pub fn assemble_if_else(
        &mut self,
        condition: Condition,
        then_block: &mut Statement,
        else_block: &mut Statement,
    ) {
        assert_block_argument("assemble_if_else", "then_block", then_block);
        assert_block_argument("assemble_if_else", "else_block", else_block);

        *self = Self::IfElse {
            condition: condition,
            then_block: Box::new(std::mem::take(then_block)),
            else_block: Box::new(std::mem::take(else_block)),
        };
    }

    /// Takes an IF_ELSE statement apart into its two branches and returns the
    /// condition. `self` becomes an empty block.
    pub fn disassemble_if_else(
        &mut self,
        then_block: &mut Statement,
        else_block: &mut Statement,
    ) -> Condition {
        assert_kind("disassemble_if_else", self, Kind::IfElse);
        assert_empty_argument("disassemble_if_else", "then_block", then_block);
        assert_empty_argument("disassemble_if_else", "else_block", else_block);

        match std::mem::take(self) {
            Self::IfElse {
                condition,
                then_block: then_branch,
                else_block: else_branch,
            } => {
                *then_block = *then_branch;
                *else_block = *else_branch;
                return condition;
            }
            _ => unreachable!("kind was checked above"),
        }
    }

    /// Turns `self` into a WHILE statement looping over the content of
    /// `body`, which is left empty.
    pub fn assemble_while(&mut self, condition: Condition, body: &mut Statement) {
        assert_block_argument("assemble_while", "body", body);

        *self = Self::While {
            condition: condition,
            body: Box::new(std::mem::take(body)),
        };
    }

    /// Takes a WHILE statement apart, moving the loop body into `body`.
    pub fn disassemble_while(&mut self, body: &mut Statement) -> Condition {
        assert_kind("disassemble_while", self, Kind::While);
        assert_empty_argument("disassemble_while", "body", body);

        match std::mem::take(self) {
            Self::While {
                condition,
                body: loop_body,
            } => {
                *body = *loop_body;
                return condition;
            }
            _ => unreachable!("kind was checked above"),
        }
    }

    /// Turns `self` into a call of the instruction named `instruction_name`.
    pub fn assemble_call(&mut self, instruction_name: &str) {
        assert!(
            is_identifier(instruction_name),
            "assemble_call requires a valid identifier, found {:?}.",
            instruction_name
        );

        *self = Self::Call {
            instruction_name: String::from(instruction_name),
        };
    }

    /// Takes a CALL statement apart, returning the instruction name. `self`
    /// becomes an empty block.
    pub fn disassemble_call(&mut self) -> String {
        assert_kind("disassemble_call", self, Kind::Call);

        match std::mem::take(self) {
            Self::Call { instruction_name } => instruction_name,
            _ => unreachable!("kind was checked above"),
        }
    }
}

fn assert_kind(operation: &str, statement: &Statement, expected_kind: Kind) {
    assert!(
        statement.kind() == expected_kind,
        "{} requires a {} statement, found {}.",
        operation,
        expected_kind,
        statement.kind()
    );
}

fn assert_block_argument(operation: &str, argument_name: &str, argument: &Statement) {
    assert!(
        argument.kind() == Kind::Block,
        "{} requires {} to be a BLOCK statement, found {}.",
        operation,
        argument_name,
        argument.kind()
    );
}

fn assert_empty_argument(operation: &str, argument_name: &str, argument: &Statement) {
    assert!(
        argument.is_empty_block(),
        "{} requires {} to be an empty block.",
        operation,
        argument_name
    );
}

// Helper function to produce the BL source of a statement, indented by
// `indent` spaces.
fn statement_to_string_helper(statement: &Statement, indent: usize, string_so_far: &mut String) {
    let pad = " ".repeat(indent);

    match statement {
        Statement::Block { children } => {
            for child in children {
                statement_to_string_helper(child, indent, string_so_far);
            }
        }
        Statement::If {
            condition,
            then_block,
        } => {
            string_so_far.push_str(format!("{}IF {} THEN\n", pad, condition).as_str());
            statement_to_string_helper(then_block, indent + INDENT_SIZE, string_so_far);
            string_so_far.push_str(format!("{}END IF\n", pad).as_str());
        }
        Statement::IfElse {
            condition,
            then_block,
            else_block,
        } => {
            string_so_far.push_str(format!("{}IF {} THEN\n", pad, condition).as_str());
            statement_to_string_helper(then_block, indent + INDENT_SIZE, string_so_far);
            string_so_far.push_str(format!("{}ELSE\n", pad).as_str());
            statement_to_string_helper(else_block, indent + INDENT_SIZE, string_so_far);
            string_so_far.push_str(format!("{}END IF\n", pad).as_str());
        }
        Statement::While { condition, body } => {
            string_so_far.push_str(format!("{}WHILE {} DO\n", pad, condition).as_str());
            statement_to_string_helper(body, indent + INDENT_SIZE, string_so_far);
            string_so_far.push_str(format!("{}END WHILE\n", pad).as_str());
        }
        Statement::Call { instruction_name } => {
            string_so_far.push_str(format!("{}{}\n", pad, instruction_name).as_str());
        }
    };
}

/// Pretty prints `statement` as BL source with every line indented by at
/// least `indent` spaces.
pub fn statement_to_string(statement: &Statement, indent: usize) -> String {
    let mut out_string = String::new();
    statement_to_string_helper(statement, indent, &mut out_string);
    return out_string;
}

// Display trait implementation for Statement using statement_to_string.
impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", statement_to_string(self, 0).as_str());
    }
}
