//! 公式语法分析：递归下降，生成表达式树
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | IDENT | FUNC '(' expr (',' expr)* ')' | '(' expr ')'
//! ```

use std::collections::BTreeSet;

use super::lexer::{Spanned, Token, tokenize};
use crate::errors::{NotaDezError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Min,
    Max,
    Avg,
    Sum,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "MIN" => Some(Function::Min),
            "MAX" => Some(Function::Max),
            "AVG" | "MEDIA" => Some(Function::Avg),
            "SUM" | "SOMA" => Some(Function::Sum),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// 成绩组成项缩写
    Component(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// 收集表达式中引用的所有缩写
    pub fn collect_references(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Component(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) => inner.collect_references(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_references(out);
                rhs.collect_references(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_references(out);
                }
            }
        }
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    source_len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|s| s.pos)
            .unwrap_or(self.source_len)
            + 1
    }

    fn unexpected(&self) -> NotaDezError {
        match self.peek() {
            Some(token) => NotaDezError::formula(format!(
                "Unexpected {} at position {}",
                token.describe(),
                self.position()
            )),
            None => NotaDezError::formula("Unexpected end of formula"),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(match self.peek() {
                Some(_) => NotaDezError::formula(format!(
                    "Expected {} at position {}",
                    expected.describe(),
                    self.position()
                )),
                None => NotaDezError::formula(format!(
                    "Expected {} but the formula ended",
                    expected.describe()
                )),
            })
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let is_call = matches!(
            (self.peek(), self.peek_at(1)),
            (Some(Token::Ident(_)), Some(Token::LParen))
        );

        match self.peek().cloned() {
            Some(Token::Number(value)) => {
                self.pos += 1;
                Ok(Expr::Number(value))
            }
            Some(Token::Ident(name)) if is_call => {
                let position = self.position();
                let func = Function::from_name(&name).ok_or_else(|| {
                    NotaDezError::formula(format!(
                        "Unknown function '{name}' at position {position}"
                    ))
                })?;
                self.pos += 2;

                let mut args = vec![self.parse_expr()?];
                while self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                    args.push(self.parse_expr()?);
                }
                self.expect(Token::RParen)?;
                Ok(Expr::Call { func, args })
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(Expr::Component(name))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// 解析公式文本
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(NotaDezError::formula("Formula is empty"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        source_len: source.chars().count(),
    };
    let expr = parser.parse_expr()?;

    if parser.advance().is_some() {
        parser.pos -= 1;
        return Err(parser.unexpected());
    }

    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str) -> Box<Expr> {
        Box::new(Expr::Component(name.to_string()))
    }

    #[test]
    fn test_precedence() {
        let expr = parse("P1 + P2 * 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: component("P1"),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs: component("P2"),
                    rhs: Box::new(Expr::Number(2.0)),
                }),
            }
        );
    }

    #[test]
    fn test_left_associative_subtraction() {
        let expr = parse("10 - 4 - 3").unwrap();
        match expr {
            Expr::Binary { op, lhs, rhs } => {
                assert_eq!(op, BinaryOp::Sub);
                assert_eq!(*rhs, Expr::Number(3.0));
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_function_calls_are_case_insensitive() {
        let expr = parse("max(P1, P2) + Avg(T1, T2, T3)").unwrap();
        let mut refs = BTreeSet::new();
        expr.collect_references(&mut refs);
        assert_eq!(
            refs.into_iter().collect::<Vec<_>>(),
            vec!["P1", "P2", "T1", "T2", "T3"]
        );
    }

    #[test]
    fn test_unknown_function() {
        let err = parse("POW(P1, 2)").unwrap_err();
        assert!(err.message().contains("Unknown function 'POW'"));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(parse("(P1 + P2").is_err());
        assert!(parse("P1 + P2)").is_err());
    }

    #[test]
    fn test_dangling_operator() {
        let err = parse("P1 +").unwrap_err();
        assert_eq!(err.message(), "Unexpected end of formula");
    }

    #[test]
    fn test_adjacent_operands_rejected() {
        let err = parse("P1 P2").unwrap_err();
        assert!(err.message().contains("'P2'"));
    }

    #[test]
    fn test_empty_formula() {
        assert!(parse("   ").is_err());
        assert!(parse("MIN()").is_err());
    }
}
