//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::layout::constraint::DEFAULT_PRIORITY;
use crate::layout::{Attribute, AttributeRef, LayoutConstraint, Relation};
use crate::parser::lexer::{lex, Token};

/// Right-hand side before the trailing offset
#[derive(Debug, Clone)]
struct Term {
    anchor: Option<AttributeRef>,
    multiplier: f64,
    constant: f64,
}

/// Parse a list of constraint expressions.
///
/// Expressions may be separated by `;` or simply follow each other.
pub fn parse_constraints(input: &str) -> Result<Vec<LayoutConstraint>, Vec<ParseError>> {
    let len = input.len();
    let tokens = lex(input).map_err(|e| vec![e])?;

    let token_stream = Stream::from_iter(tokens.into_iter().map(|(tok, span)| (tok, span.into())))
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    constraints_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Parse exactly one constraint expression
pub fn parse_constraint(input: &str) -> Result<LayoutConstraint, Vec<ParseError>> {
    let mut constraints = parse_constraints(input)?;
    if constraints.len() != 1 {
        return Err(vec![ParseError::Syntax {
            span: 0..input.len(),
            message: format!("Expected one constraint, found {}", constraints.len()),
            expected: Vec::new(),
        }]);
    }
    Ok(constraints.remove(0))
}

fn constraints_parser<'a, I>(
) -> impl Parser<'a, I, Vec<LayoutConstraint>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let box_id = select! {
        Token::Ident(s) => s,
        Token::String(s) => s,
    }
    .labelled("box id");

    let number = select! {
        Token::Number(n) => n,
    }
    .labelled("number");

    let signed_number = just(Token::Minus)
        .or_not()
        .then(number.clone())
        .map(|(neg, n)| if neg.is_some() { -n } else { n });

    // box.attribute, with the attribute name checked against the known set
    let attribute = select! {
        Token::Ident(s) => s,
    }
    .labelled("attribute")
    .try_map(|name, span| {
        name.parse::<Attribute>()
            .map_err(|msg| Rich::custom(span, msg))
    });

    let attr_ref = box_id
        .then_ignore(just(Token::Dot))
        .then(attribute)
        .map(|(id, attribute)| AttributeRef::new(id, attribute));

    let relation = select! {
        Token::Equals => Relation::Equal,
        Token::GreaterOrEqual => Relation::GreaterOrEqual,
        Token::LessOrEqual => Relation::LessOrEqual,
    }
    .labelled("relation");

    // number, number * number, number * box.attr
    let scalar_term = signed_number
        .clone()
        .then(
            just(Token::Star)
                .ignore_then(
                    attr_ref
                        .clone()
                        .map(Ok)
                        .or(signed_number.clone().map(Err)),
                )
                .or_not(),
        )
        .map(|(n, factor)| match factor {
            Some(Ok(anchor)) => Term {
                anchor: Some(anchor),
                multiplier: n,
                constant: 0.0,
            },
            Some(Err(m)) => Term {
                anchor: None,
                multiplier: m,
                constant: n,
            },
            None => Term {
                anchor: None,
                multiplier: 1.0,
                constant: n,
            },
        });

    // box.attr, box.attr * number
    let anchor_term = attr_ref
        .clone()
        .then(just(Token::Star).ignore_then(signed_number.clone()).or_not())
        .map(|(anchor, multiplier)| Term {
            anchor: Some(anchor),
            multiplier: multiplier.unwrap_or(1.0),
            constant: 0.0,
        });

    let term = choice((anchor_term, scalar_term));

    let offset = choice((
        just(Token::Plus).ignore_then(number.clone()),
        just(Token::Minus).ignore_then(number.clone()).map(|n| -n),
    ));

    let priority = just(Token::At).ignore_then(number.try_map(|n, span| {
        if n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 {
            Ok(n as u32)
        } else {
            Err(Rich::custom(
                span,
                format!("Priority must be a whole non-negative number, got {}", n),
            ))
        }
    }));

    let constraint = attr_ref
        .then(relation)
        .then(term)
        .then(offset.or_not())
        .then(priority.or_not())
        .map(|((((target, relation), term), offset), priority)| {
            // Unanchored values are constant * multiplier, so fold the offset in after scaling
            let (multiplier, constant) = match (&term.anchor, offset) {
                (None, Some(off)) => (1.0, term.constant * term.multiplier + off),
                (_, off) => (term.multiplier, term.constant + off.unwrap_or(0.0)),
            };
            LayoutConstraint {
                target,
                relation,
                anchor: term.anchor,
                multiplier,
                constant,
                priority: priority.unwrap_or(DEFAULT_PRIORITY),
            }
        });

    constraint
        .then_ignore(just(Token::Semicolon).or_not())
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}
