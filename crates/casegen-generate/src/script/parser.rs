//! Recursive-descent parser producing the program AST.

use super::ScriptError;
use super::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Expr>),
    Name(String),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Expr,
    pub line: usize,
}

/// Parsed program: functions and top-level bindings in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub functions: Vec<FnDef>,
    pub bindings: Vec<(String, Expr)>,
}

impl Program {
    pub fn function(&self, name: &str) -> Option<&FnDef> {
        self.functions.iter().find(|def| def.name == name)
    }
}

pub fn parse(tokens: Vec<Token>) -> Result<Program, ScriptError> {
    Parser { tokens, pos: 0 }.program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn program(mut self) -> Result<Program, ScriptError> {
        let mut program = Program::default();
        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Fn => {
                    let def = self.function()?;
                    if program.function(&def.name).is_some() {
                        return Err(ScriptError::Syntax {
                            line: def.line,
                            message: format!("function '{}' is defined twice", def.name),
                        });
                    }
                    program.functions.push(def);
                }
                TokenKind::Let => {
                    self.advance();
                    let name = self.ident()?;
                    self.expect(TokenKind::Assign, "'='")?;
                    let value = self.expr()?;
                    program.bindings.push((name, value));
                }
                _ => return Err(self.error("expected 'fn' or 'let'")),
            }
            self.end_of_statement()?;
        }
        Ok(program)
    }

    fn function(&mut self) -> Result<FnDef, ScriptError> {
        let line = self.line();
        self.advance();
        let name = self.ident()?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param = self.ident()?;
                if params.contains(&param) {
                    return Err(self.error(format!("duplicate parameter '{param}'")));
                }
                params.push(param);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Assign, "'='")?;
        let body = self.expr()?;
        Ok(FnDef {
            name,
            params,
            body,
            line,
        })
    }

    fn end_of_statement(&mut self) -> Result<(), ScriptError> {
        match self.peek() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.error("expected end of statement")),
        }
    }

    fn expr(&mut self) -> Result<Expr, ScriptError> {
        if self.eat(&TokenKind::If) {
            let cond = self.expr()?;
            self.expect(TokenKind::Then, "'then'")?;
            let then_branch = self.expr()?;
            self.expect(TokenKind::Else, "'else'")?;
            let else_branch = self.expr()?;
            return Ok(Expr::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.and_expr()?;
        while self.eat(&TokenKind::Or) {
            let right = self.and_expr()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.not_expr()?;
        while self.eat(&TokenKind::And) {
            let right = self.not_expr()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ScriptError> {
        if self.eat(&TokenKind::Not) {
            let operand = self.not_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ScriptError> {
        let left = self.additive()?;
        let op = match self.peek() {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.additive()?;
        Ok(binary(op, left, right))
    }

    fn additive(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = binary(op, left, right);
        }
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        if self.eat(&TokenKind::Minus) {
            let operand = self.unary()?;
            return Ok(match operand {
                Expr::Int(value) => Expr::Int(-value),
                Expr::Float(value) => Expr::Float(-value),
                other => Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(other),
                },
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.primary()?;
        while self.eat(&TokenKind::LBracket) {
            let index = self.expr()?;
            self.expect(TokenKind::RBracket, "']'")?;
            expr = Expr::Index {
                target: Box::new(expr),
                index: Box::new(index),
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(value) => Ok(Expr::Int(value)),
            TokenKind::Float(value) => Ok(Expr::Float(value)),
            TokenKind::Str(value) => Ok(Expr::Str(value)),
            TokenKind::True => Ok(Expr::Bool(true)),
            TokenKind::False => Ok(Expr::Bool(false)),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                let items = self.list_items(TokenKind::RBracket, "']'")?;
                Ok(Expr::List(items))
            }
            TokenKind::Ident(name) => {
                if self.eat(&TokenKind::LParen) {
                    let args = self.list_items(TokenKind::RParen, "')'")?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Name(name))
                }
            }
            other => Err(ScriptError::Syntax {
                line: token.line,
                message: format!("unexpected {}", describe(&other)),
            }),
        }
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn list_items(&mut self, close: TokenKind, label: &str) -> Result<Vec<Expr>, ScriptError> {
        let mut items = Vec::new();
        while !self.check(&close) {
            items.push(self.expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, label)?;
        Ok(items)
    }

    fn ident(&mut self) -> Result<String, ScriptError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|token| &token.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|token| token.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token {
            kind: TokenKind::Eof,
            line: self.line(),
        });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, label: &str) -> Result<(), ScriptError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {label}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        let message = message.into();
        ScriptError::Syntax {
            line: self.line(),
            message: format!("{message}, found {}", describe(self.peek())),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(name) => format!("identifier '{name}'"),
        TokenKind::Int(value) => format!("number {value}"),
        TokenKind::Float(value) => format!("number {value}"),
        TokenKind::Str(value) => format!("string '{value}'"),
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Eof => "end of input".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Program, ScriptError> {
        parse(tokenize(source)?)
    }

    fn parse_expr(source: &str) -> Expr {
        let program = parse_source(&format!("let x = {source}")).expect("parse");
        program.bindings[0].1.clone()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_expr("1 + 2 * 3"),
            binary(
                BinaryOp::Add,
                Expr::Int(1),
                binary(BinaryOp::Mul, Expr::Int(2), Expr::Int(3))
            )
        );
    }

    #[test]
    fn negative_literals_fold() {
        assert_eq!(parse_expr("-5"), Expr::Int(-5));
        assert_eq!(
            parse_expr("-n"),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(Expr::Name("n".to_string()))
            }
        );
    }

    #[test]
    fn parses_functions_and_bindings_in_order() {
        let program = parse_source(
            "let base = 10\nfn pick(a, b) = if a > b then a else b; fn generate_data() = pick(base, 3)",
        )
        .expect("parse");
        assert_eq!(program.bindings.len(), 1);
        assert_eq!(program.functions.len(), 2);
        assert_eq!(program.functions[0].params, vec!["a", "b"]);
        assert_eq!(program.functions[1].name, "generate_data");
    }

    #[test]
    fn indexing_chains_after_calls() {
        assert_eq!(
            parse_expr("split(s)[0]"),
            Expr::Index {
                target: Box::new(Expr::Call {
                    name: "split".to_string(),
                    args: vec![Expr::Name("s".to_string())]
                }),
                index: Box::new(Expr::Int(0)),
            }
        );
    }

    #[test]
    fn rejects_duplicate_function() {
        let err = parse_source("fn f() = 1\nfn f() = 2").unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn rejects_trailing_tokens() {
        let err = parse_source("let x = 1 2").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { line: 1, .. }));
    }
}
