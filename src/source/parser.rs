// src/source/parser.rs

//! Parser for knowledge source files
//!
//! The accepted language is a small statement syntax:
//!
//! ```text
//! // membership: the class on the left contains every element on the right
//! concept_reusable_component -> my_component;;
//!
//! // relation: subject => relation: object, object, ...;;
//! my_component => nrel_component_address: [https://github.com/owner/repo];;
//! my_component => nrel_component_dependencies: dep_a, dep_b;;
//! ```
//!
//! `[text]` denotes a link literal; anything else on the right-hand side is a
//! node identifier. Statements end with `;;`.

use super::ParseError;
use std::iter::Peekable;
use std::str::Chars;

/// Right-hand side of a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Named node
    Node(String),
    /// Link literal with text content
    Link(String),
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `class -> element, ...;;`
    Membership { class: String, elements: Vec<Target> },
    /// `subject => relation: object, ...;;`
    Relation {
        subject: String,
        relation: String,
        objects: Vec<Target>,
    },
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            message: message.into(),
        }
    }

    /// Skip whitespace and `//` comments
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() != Some(&'/') {
                        return;
                    }
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), ParseError> {
        self.skip_trivia();
        for expected in token.chars() {
            match self.peek() {
                Some(c) if c == expected => {
                    self.bump();
                }
                Some(c) => {
                    return Err(self.error(format!("expected '{}', found '{}'", token, c)));
                }
                None => {
                    return Err(self.error(format!("expected '{}', found end of input", token)));
                }
            }
        }
        Ok(())
    }

    fn identifier(&mut self) -> Result<String, ParseError> {
        self.skip_trivia();
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '-') {
                // "->" is an operator, not part of an identifier
                if c == '-' {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'>') {
                        break;
                    }
                }
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if ident.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected identifier, found '{}'", c)),
                None => self.error("expected identifier, found end of input"),
            });
        }
        Ok(ident)
    }

    fn target(&mut self) -> Result<Target, ParseError> {
        self.skip_trivia();
        if self.peek() != Some('[') {
            return self.identifier().map(Target::Node);
        }

        let start_line = self.line;
        self.bump();
        let mut content = String::new();
        loop {
            match self.bump() {
                Some(']') => return Ok(Target::Link(content)),
                Some(c) => content.push(c),
                None => {
                    return Err(ParseError {
                        line: start_line,
                        message: "unterminated link literal".to_string(),
                    });
                }
            }
        }
    }

    fn targets(&mut self) -> Result<Vec<Target>, ParseError> {
        let mut targets = vec![self.target()?];
        loop {
            self.skip_trivia();
            if self.peek() == Some(',') {
                self.bump();
                targets.push(self.target()?);
            } else {
                return Ok(targets);
            }
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let subject = self.identifier()?;
        self.skip_trivia();

        let statement = match self.peek() {
            Some('-') => {
                self.expect("->")?;
                Statement::Membership {
                    class: subject,
                    elements: self.targets()?,
                }
            }
            Some('=') => {
                self.expect("=>")?;
                let relation = self.identifier()?;
                self.expect(":")?;
                Statement::Relation {
                    subject,
                    relation,
                    objects: self.targets()?,
                }
            }
            Some(c) => return Err(self.error(format!("expected '->' or '=>', found '{}'", c))),
            None => return Err(self.error("expected '->' or '=>', found end of input")),
        };

        self.expect(";;")?;
        Ok(statement)
    }
}

/// Parse the full text of a source file into statements
pub fn parse_source(input: &str) -> Result<Vec<Statement>, ParseError> {
    let mut cursor = Cursor::new(input);
    let mut statements = Vec::new();

    loop {
        cursor.skip_trivia();
        if cursor.peek().is_none() {
            return Ok(statements);
        }
        statements.push(cursor.statement()?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_membership() {
        let statements = parse_source("concept_reusable_component -> comp_a, comp_b;;").unwrap();
        assert_eq!(
            statements,
            vec![Statement::Membership {
                class: "concept_reusable_component".to_string(),
                elements: vec![
                    Target::Node("comp_a".to_string()),
                    Target::Node("comp_b".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn test_parse_relation_with_link() {
        let statements =
            parse_source("comp => nrel_component_address: [https://github.com/owner/repo];;")
                .unwrap();
        assert_eq!(
            statements,
            vec![Statement::Relation {
                subject: "comp".to_string(),
                relation: "nrel_component_address".to_string(),
                objects: vec![Target::Link("https://github.com/owner/repo".to_string())],
            }]
        );
    }

    #[test]
    fn test_comments_and_whitespace() {
        let input = r#"
// Components
concept_reusable_component
    -> comp;; // trailing comment

comp => nrel_component_dependencies:
    dep-one,
    dep.two;;
"#;
        let statements = parse_source(input).unwrap();
        assert_eq!(statements.len(), 2);
        match &statements[1] {
            Statement::Relation { objects, .. } => {
                assert_eq!(
                    objects,
                    &vec![
                        Target::Node("dep-one".to_string()),
                        Target::Node("dep.two".to_string())
                    ]
                );
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_identifier_followed_by_arrow_without_space() {
        let statements = parse_source("class->element;;").unwrap();
        assert_eq!(
            statements,
            vec![Statement::Membership {
                class: "class".to_string(),
                elements: vec![Target::Node("element".to_string())],
            }]
        );
    }

    #[test]
    fn test_missing_terminator_reports_line() {
        let err = parse_source("a -> b;;\nc -> d\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains(";;"));
    }

    #[test]
    fn test_unterminated_link() {
        let err = parse_source("a => rel: [never closed;;").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_bad_operator() {
        let err = parse_source("a ~ b;;").unwrap_err();
        assert!(err.message.contains("'->' or '=>'"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_source("  // nothing here\n").unwrap().is_empty());
    }
}
