//! Requirement notation.
//!
//! ```text
//! expr   := and ('|' and)*
//! and    := chain ('&' chain)*
//! chain  := head '>' chain | term
//! head   := KIND | '*'
//! term   := KIND | '(' expr ')' | '*'
//! ```
//!
//! `A > B` attaches `B` below `A`, `&` requires layers together, `|` offers
//! alternatives and `*` is the unconstrained container. This is the same
//! form `LinkTree` renders through `Display`.
//!
//! Parsing only checks syntax and yields a [`Notation`]. Lowering runs the
//! result through the kernel's builder against a [`Lineage`], so ancestry
//! errors surface there.

use chumsky::Stream;
use chumsky::error::SimpleReason;
use chumsky::prelude::*;
use linkage_kernel::{Expr, Lineage, LinkKind, LinkTree, LinkageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct NotationError {
    pub message: String,
    pub offset: usize,
}

fn to_notation_error<T: fmt::Display + Hash + Eq>(err: Simple<T>) -> NotationError {
    let message = match err.reason() {
        SimpleReason::Custom(message) => message.clone(),
        _ => err.to_string(),
    };
    NotationError {
        message,
        offset: err.span().start,
    }
}

fn first_error<T: fmt::Display + Hash + Eq>(errs: Vec<Simple<T>>) -> NotationError {
    errs.into_iter()
        .next()
        .map(to_notation_error)
        .unwrap_or_else(|| NotationError {
            message: "invalid notation".to_string(),
            offset: 0,
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Token {
    Kind(String),
    Over,
    And,
    Or,
    Open,
    Close,
    Any,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(name) => write!(f, "kind `{name}`"),
            Self::Over => f.write_str("`>`"),
            Self::And => f.write_str("`&`"),
            Self::Or => f.write_str("`|`"),
            Self::Open => f.write_str("`(`"),
            Self::Close => f.write_str("`)`"),
            Self::Any => f.write_str("`*`"),
        }
    }
}

fn is_kind_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':')
}

fn lexer() -> impl Parser<char, Vec<(Token, Range<usize>)>, Error = Simple<char>> {
    let kind = filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .chain(filter(|c: &char| is_kind_char(*c)).repeated())
        .collect::<String>()
        .map(Token::Kind);

    let op = choice::<_, Simple<char>>((
        just('>').to(Token::Over),
        just('&').to(Token::And),
        just('|').to(Token::Or),
        just('(').to(Token::Open),
        just(')').to(Token::Close),
        just('*').to(Token::Any),
    ));

    choice::<_, Simple<char>>((op, kind))
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}

/// Parsed requirement, not yet checked against any graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notation {
    Kind(LinkKind),
    Any,
    /// `kind > lower`; a `None` head is `*`.
    Over {
        kind: Option<LinkKind>,
        lower: Box<Notation>,
    },
    And(Vec<Notation>),
    Or(Vec<Notation>),
}

fn collapse(mut items: Vec<Notation>, wrap: fn(Vec<Notation>) -> Notation) -> Notation {
    if items.len() == 1 {
        items.remove(0)
    } else {
        wrap(items)
    }
}

fn parser() -> impl Parser<Token, Notation, Error = Simple<Token>> {
    let kind = select! { Token::Kind(name) => LinkKind::new(name) };

    recursive(|expr| {
        let term = choice::<_, Simple<Token>>((
            kind.clone().map(Notation::Kind),
            just(Token::Any).to(Notation::Any),
            expr.delimited_by(just(Token::Open), just(Token::Close)),
        ));
        // Only a kind or `*` can carry lower layers.
        let head = choice::<_, Simple<Token>>((
            kind.clone().map(Some),
            just(Token::Any).to(None),
        ));
        let chain = recursive(|chain| {
            choice::<_, Simple<Token>>((
                head.then_ignore(just(Token::Over))
                    .then(chain)
                    .map(|(kind, lower)| Notation::Over {
                        kind,
                        lower: Box::new(lower),
                    }),
                term,
            ))
        });

        chain
            .separated_by(just(Token::And))
            .at_least(1)
            .map(|items| collapse(items, Notation::And))
            .separated_by(just(Token::Or))
            .at_least(1)
            .map(|items| collapse(items, Notation::Or))
    })
    .then_ignore(end())
}

impl Notation {
    pub fn parse(text: &str) -> Result<Self, NotationError> {
        let tokens = lexer().parse(text).map_err(first_error)?;
        let end_of_input = text.len()..text.len() + 1;
        parser()
            .parse(Stream::from_iter(end_of_input, tokens.into_iter()))
            .map_err(first_error)
    }

    fn to_expr(&self, lineage: &Lineage<'_>) -> Result<Expr, LinkageError> {
        Ok(match self {
            Self::Kind(kind) => Expr::Kind(kind.clone()),
            Self::Any => Expr::Tree(LinkTree::container()),
            Self::Over { kind, lower } => {
                let base = kind.clone().map(LinkTree::new).unwrap_or_default();
                Expr::Tree(lineage.combine(&base, lower.to_expr(lineage)?)?)
            }
            Self::And(items) => fold(items, lineage, |a, b| a.and(b))?,
            Self::Or(items) => fold(items, lineage, |a, b| a.or(b))?,
        })
    }

    /// Build the requirement through the kernel's builder.
    pub fn lower(&self, lineage: &Lineage<'_>) -> Result<LinkTree, LinkageError> {
        lineage.build(self.to_expr(lineage)?)
    }
}

fn fold(
    items: &[Notation],
    lineage: &Lineage<'_>,
    join: fn(Expr, Expr) -> Expr,
) -> Result<Expr, LinkageError> {
    let mut out: Option<Expr> = None;
    for item in items {
        let next = item.to_expr(lineage)?;
        out = Some(match out {
            Some(acc) => join(acc, next),
            None => next,
        });
    }
    out.ok_or_else(|| LinkageError::InvalidExpression("empty expression".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage_kernel::{DEFAULT_GRAPH, KindRegistry};

    fn registry() -> KindRegistry {
        let mut reg = KindRegistry::new();
        for root in ["OpticalFiber", "WirelessLan", "Usb"] {
            reg.register(root, DEFAULT_GRAPH, Vec::<LinkKind>::new());
        }
        reg.register("Ethernet", DEFAULT_GRAPH, ["OpticalFiber"]);
        reg.register("IPv4", DEFAULT_GRAPH, ["Ethernet", "WirelessLan", "Usb"]);
        reg.register("Tcp", DEFAULT_GRAPH, ["IPv4"]);
        reg
    }

    fn lower(text: &str) -> Result<LinkTree, LinkageError> {
        let reg = registry();
        Notation::parse(text).unwrap().lower(&reg.lineage())
    }

    #[test]
    fn precedence_binds_chain_then_and_then_or() {
        let parsed = Notation::parse("A > B & C | D").unwrap();
        assert_eq!(
            parsed,
            Notation::Or(vec![
                Notation::And(vec![
                    Notation::Over {
                        kind: Some(LinkKind::new("A")),
                        lower: Box::new(Notation::Kind(LinkKind::new("B"))),
                    },
                    Notation::Kind(LinkKind::new("C")),
                ]),
                Notation::Kind(LinkKind::new("D")),
            ])
        );
    }

    #[test]
    fn lowering_renders_back_the_same_text() {
        for text in [
            "Tcp > IPv4 > Ethernet > OpticalFiber",
            "IPv4 > (Ethernet > OpticalFiber | WirelessLan)",
            "IPv4 > (Ethernet & Usb)",
            "Ethernet & Usb",
            "Ethernet | WirelessLan",
            "*",
        ] {
            assert_eq!(lower(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn display_parses_to_an_equal_tree() {
        let reg = registry();
        let lineage = reg.lineage();
        let tree = lower("Tcp > (OpticalFiber | WirelessLan & Usb)").unwrap();
        let again = Notation::parse(&tree.to_string())
            .unwrap()
            .lower(&lineage)
            .unwrap();
        assert!(lineage.equals(&tree, &again, false).unwrap());
    }

    #[test]
    fn lowering_reports_kernel_errors() {
        assert!(matches!(
            lower("Usb > WirelessLan"),
            Err(LinkageError::IllegalLinkType { .. })
        ));
        assert!(matches!(
            lower("(* > (Ethernet | Usb)) & WirelessLan"),
            Err(LinkageError::InvalidExpression(_))
        ));
        assert_eq!(
            lower("Tcp > ((Ethernet | Usb) & WirelessLan)").unwrap().to_string(),
            "Tcp > (Ethernet & WirelessLan | Usb & WirelessLan)"
        );
    }

    #[test]
    fn syntax_errors_carry_offsets() {
        let err = Notation::parse("IPv4 > (Ethernet | ").unwrap_err();
        assert_eq!(err.offset, 19);
        assert!(err.message.contains("end of input"), "{err}");
        assert!(err.to_string().ends_with("at offset 19"));

        let err = Notation::parse("(Ethernet | Usb) > OpticalFiber").unwrap_err();
        assert_eq!(err.offset, 17);

        let err = Notation::parse("Ethernet Usb").unwrap_err();
        assert_eq!(err.offset, 9);

        let err = Notation::parse("Ethernet + Usb").unwrap_err();
        assert_eq!(err.offset, 9);
        assert!(err.message.contains('+'), "{err}");

        assert_eq!(Notation::parse("").unwrap_err().offset, 0);
    }

    #[test]
    fn kinds_allow_qualified_names() {
        assert_eq!(
            Notation::parse(" * > ieee:802.11-ac ").unwrap(),
            Notation::Over {
                kind: None,
                lower: Box::new(Notation::Kind(LinkKind::new("ieee:802.11-ac"))),
            }
        );
    }
}
