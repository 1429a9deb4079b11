//! Lexer for constraint expressions using logos

use logos::Logos;

use crate::error::{ParseError, Span};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Relations (longer first)
    #[token(">=")]
    GreaterOrEqual,
    #[token("<=")]
    LessOrEqual,
    #[token("==")]
    #[token("=")]
    Equals,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,

    // Punctuation
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token(";")]
    Semicolon,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Quoted box id, for ids that are not plain identifiers
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
}

/// Strip the quotes from a quoted id and resolve `\x` escapes to `x`
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.extend(chars.next());
        } else {
            out.push(c);
        }
    }
    out
}

/// Lex input into tokens with spans, failing on the first unrecognized input
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(t) => Ok((t, span)),
            Err(()) => Err(ParseError::Syntax {
                message: format!("Unexpected character '{}'", &input[span.clone()]),
                span,
                expected: Vec::new(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_constraint_tokens() {
        assert_eq!(
            tokens("b.left = a.width + 10"),
            vec![
                Token::Ident("b".to_string()),
                Token::Dot,
                Token::Ident("left".to_string()),
                Token::Equals,
                Token::Ident("a".to_string()),
                Token::Dot,
                Token::Ident("width".to_string()),
                Token::Plus,
                Token::Number(10.0),
            ]
        );
    }

    #[test]
    fn test_relations() {
        assert_eq!(
            tokens(">= <= == ="),
            vec![
                Token::GreaterOrEqual,
                Token::LessOrEqual,
                Token::Equals,
                Token::Equals
            ]
        );
    }

    #[test]
    fn test_numbers_and_priority() {
        assert_eq!(
            tokens("0.5 * 3 @ 250"),
            vec![
                Token::Number(0.5),
                Token::Star,
                Token::Number(3.0),
                Token::At,
                Token::Number(250.0)
            ]
        );
    }

    #[test]
    fn test_quoted_id_and_comment() {
        assert_eq!(
            tokens("\"hero-image\" // trailing note\n;"),
            vec![Token::String("hero-image".to_string()), Token::Semicolon]
        );
    }

    #[test]
    fn test_quoted_id_escapes() {
        assert_eq!(
            tokens(r#""say\"hi\"" "back\\slash""#),
            vec![
                Token::String("say\"hi\"".to_string()),
                Token::String("back\\slash".to_string())
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        match lex("a.left = 5 $") {
            Err(ParseError::Syntax { span, message, .. }) => {
                assert_eq!(span, 11..12);
                assert!(message.contains('$'));
            }
            other => panic!("Expected syntax error, got: {:?}", other),
        }
    }
}
