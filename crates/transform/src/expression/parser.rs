//! Tokenizer and recursive-descent parser for filter expressions

use super::{Condition, Node, Path, Step, Test};
use crate::bindings::Bindings;
use crate::error::ExpressionError;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Variable(String),
    Literal(String),
    This,
    Dot,
    Equals,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Equals);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '\'' | '"' => {
                chars.next();
                tokens.push(Token::Literal(read_literal(&mut chars, ch, src)?));
            }
            '%' => {
                chars.next();
                let name = read_ident(&mut chars);
                if name.is_empty() {
                    return Err(ExpressionError::parse(src, "expected variable name after '%'"));
                }
                tokens.push(Token::Variable(name));
            }
            '$' => {
                chars.next();
                match read_ident(&mut chars).as_str() {
                    "this" => tokens.push(Token::This),
                    other => {
                        return Err(ExpressionError::parse(
                            src,
                            format!("unsupported special variable '${}'", other),
                        ))
                    }
                }
            }
            c if is_ident_start(c) => tokens.push(Token::Ident(read_ident(&mut chars))),
            other => {
                return Err(ExpressionError::parse(
                    src,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

fn read_literal(
    chars: &mut Peekable<Chars<'_>>,
    quote: char,
    src: &str,
) -> Result<String, ExpressionError> {
    let mut literal = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => literal.push(escaped),
                None => break,
            },
            c if c == quote => return Ok(literal),
            c => literal.push(c),
        }
    }
    Err(ExpressionError::parse(src, "unterminated string literal"))
}

/// Parse `src` into an AST, resolving every `%var` against `bindings`
pub(super) fn parse(src: &str, bindings: &Bindings) -> Result<Node, ExpressionError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        src,
        bindings,
        tokens,
        pos: 0,
    };
    let node = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(ExpressionError::parse(
            src,
            format!("unexpected trailing token {:?}", token),
        ));
    }
    Ok(node)
}

struct Parser<'a> {
    src: &'a str,
    bindings: &'a Bindings,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> ExpressionError {
        ExpressionError::parse(self.src, message)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExpressionError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!("expected {:?}, found {:?}", expected, token))),
            None => Err(self.error(format!("expected {:?}, found end of input", expected))),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == keyword)
    }

    // expression := path [ '=' literal | 'in' %var ]
    fn expression(&mut self) -> Result<Node, ExpressionError> {
        let path = self.path()?;
        match self.test()? {
            None => Ok(Node::Path(path)),
            Some(Test::Equals(literal)) => Ok(Node::Equals { path, literal }),
            Some(Test::Membership { var, values }) => Ok(Node::Membership { path, var, values }),
        }
    }

    // path := Kind ( '.' field | '.' 'where' '(' condition ( 'or' condition )* ')' )*
    fn path(&mut self) -> Result<Path, ExpressionError> {
        let kind = match self.next() {
            Some(Token::Ident(kind)) => kind,
            _ => return Err(self.error("expression must start with a resource kind")),
        };

        let mut steps = Vec::new();
        while self.peek() == Some(&Token::Dot) {
            self.next();
            let name = match self.next() {
                Some(Token::Ident(name)) => name,
                _ => return Err(self.error("expected field name after '.'")),
            };

            if name == "where" && self.peek() == Some(&Token::LParen) {
                if steps.is_empty() {
                    return Err(self.error("where() must follow a field"));
                }
                self.next();
                let mut conditions = vec![self.condition()?];
                while self.is_keyword("or") {
                    self.next();
                    conditions.push(self.condition()?);
                }
                self.expect(Token::RParen)?;
                steps.push(Step::Where(conditions));
            } else {
                steps.push(Step::Field(name));
            }
        }

        Ok(Path { kind, steps })
    }

    // condition := '$this' ( '.' field )* ( '=' literal | 'in' %var )
    fn condition(&mut self) -> Result<Condition, ExpressionError> {
        self.expect(Token::This)?;
        let mut path = Vec::new();
        while self.peek() == Some(&Token::Dot) {
            self.next();
            match self.next() {
                Some(Token::Ident(name)) => path.push(name),
                _ => return Err(self.error("expected field name after '$this.'")),
            }
        }
        match self.test()? {
            Some(test) => Ok(Condition { path, test }),
            None => Err(self.error("where() condition needs '=' or 'in'")),
        }
    }

    fn test(&mut self) -> Result<Option<Test>, ExpressionError> {
        if self.peek() == Some(&Token::Equals) {
            self.next();
            return match self.next() {
                Some(Token::Literal(literal)) => Ok(Some(Test::Equals(literal))),
                _ => Err(self.error("expected string literal after '='")),
            };
        }

        if self.is_keyword("in") {
            self.next();
            return match self.next() {
                Some(Token::Variable(var)) => {
                    let values = self
                        .bindings
                        .get(&var)
                        .ok_or_else(|| ExpressionError::UnresolvedVariable {
                            name: var.clone(),
                            expr: self.src.to_string(),
                        })?
                        .to_vec();
                    Ok(Some(Test::Membership { var, values }))
                }
                _ => Err(self.error("expected %variable after 'in'")),
            };
        }

        Ok(None)
    }
}
