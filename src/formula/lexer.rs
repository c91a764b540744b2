//! 公式词法分析

use crate::errors::{NotaDezError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Ident(name) => format!("'{name}'"),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Star => "'*'".into(),
            Token::Slash => "'/'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Comma => "','".into(),
        }
    }
}

/// 带位置（字符偏移，从 0 开始）的词法单元
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub pos: usize,
    pub token: Token,
}

pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            c if c.is_ascii_digit() || c == '.' => {
                let mut seen_dot = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    if chars[i] == '.' {
                        if seen_dot {
                            return Err(NotaDezError::formula(format!(
                                "Malformed number at position {}",
                                start + 1
                            )));
                        }
                        seen_dot = true;
                    }
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal.parse::<f64>().map_err(|_| {
                    NotaDezError::formula(format!(
                        "Malformed number '{literal}' at position {}",
                        start + 1
                    ))
                })?;
                tokens.push(Spanned {
                    pos: start,
                    token: Token::Number(value),
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Spanned {
                    pos: start,
                    token: Token::Ident(chars[start..i].iter().collect()),
                });
                continue;
            }
            other => {
                return Err(NotaDezError::formula(format!(
                    "Unexpected character '{other}' at position {}",
                    start + 1
                )));
            }
        };

        tokens.push(Spanned { pos: start, token });
        i += 1;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_tokenize_weighted_sum() {
        assert_eq!(
            kinds("(P1*0.4) + P2 * .6"),
            vec![
                Token::LParen,
                Token::Ident("P1".into()),
                Token::Star,
                Token::Number(0.4),
                Token::RParen,
                Token::Plus,
                Token::Ident("P2".into()),
                Token::Star,
                Token::Number(0.6),
            ]
        );
    }

    #[test]
    fn test_identifiers_keep_digits_and_underscores() {
        assert_eq!(
            kinds("P10 trab_1"),
            vec![Token::Ident("P10".into()), Token::Ident("trab_1".into())]
        );
    }

    #[test]
    fn test_positions_are_char_offsets() {
        let tokens = tokenize("A + B").unwrap();
        assert_eq!(tokens[0].pos, 0);
        assert_eq!(tokens[1].pos, 2);
        assert_eq!(tokens[2].pos, 4);
    }

    #[test]
    fn test_rejects_unknown_characters() {
        let err = tokenize("P1 ^ 2").unwrap_err();
        assert!(err.message().contains("'^'"));
        assert!(err.message().contains("position 4"));
    }

    #[test]
    fn test_rejects_double_dot() {
        assert!(tokenize("1.2.3").is_err());
    }
}
