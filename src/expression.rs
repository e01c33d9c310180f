//! Compound license expression parsing and classification (component B).
//!
//! Grammar: a single identifier, a disjunction `A OR B OR C`, a conjunction
//! `A AND B AND C`, or parenthesized groupings thereof. `OR`/`AND` are
//! matched as whole words, case-insensitively. Precedence between `AND` and
//! `OR` is never inferred — a group (top level or inside one set of
//! parentheses) that mixes both operators is a parse error; nest
//! parentheses to disambiguate instead.

use serde::Serialize;

use crate::canonicalize::canonicalize;
use crate::error::{LreError, LreResult};
use crate::graph::KnowledgeGraph;
use crate::models::LicenseCategory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    License(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
enum OpKind {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Word(String),
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    for ch in input.chars() {
        match ch {
            '(' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::LParen);
            }
            ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::RParen);
            }
            c if c.is_whitespace() => flush(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

fn op_at(tokens: &[Token], pos: usize) -> Option<OpKind> {
    match tokens.get(pos) {
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("or") => Some(OpKind::Or),
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("and") => Some(OpKind::And),
        _ => None,
    }
}

fn parse_primary(tokens: &[Token], pos: &mut usize) -> LreResult<Expr> {
    match tokens.get(*pos) {
        Some(Token::LParen) => {
            *pos += 1;
            let inner = parse_group(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Token::RParen) => {
                    *pos += 1;
                    Ok(inner)
                }
                _ => Err(invalid("expected closing parenthesis")),
            }
        }
        Some(Token::Word(w)) => {
            *pos += 1;
            Ok(Expr::License(w.clone()))
        }
        _ => Err(invalid("expected a license identifier or '('")),
    }
}

fn parse_group(tokens: &[Token], pos: &mut usize) -> LreResult<Expr> {
    let mut operands = vec![parse_primary(tokens, pos)?];
    let mut seen: Option<OpKind> = None;

    while let Some(op) = op_at(tokens, *pos) {
        if let Some(prev) = seen {
            if prev != op {
                return Err(invalid(
                    "mixed AND/OR within a single parenthesis group; use parentheses to disambiguate",
                ));
            }
        }
        seen = Some(op);
        *pos += 1;
        operands.push(parse_primary(tokens, pos)?);
    }

    Ok(match seen {
        None => operands.into_iter().next().expect("at least one operand"),
        Some(OpKind::And) => Expr::And(operands),
        Some(OpKind::Or) => Expr::Or(operands),
    })
}

fn invalid(reason: &str) -> LreError {
    LreError::InvalidExpression {
        expression: String::new(),
        reason: reason.to_string(),
    }
}

/// Parse a license expression string. Never fails on empty input — an empty
/// or all-whitespace string parses to a single blank identifier, which
/// [`canonicalize`] resolves to `Unknown`.
pub fn parse(input: &str) -> LreResult<Expr> {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Ok(Expr::License(String::new()));
    }
    let mut pos = 0;
    let expr = parse_group(&tokens, &mut pos).map_err(|e| match e {
        LreError::InvalidExpression { reason, .. } => LreError::InvalidExpression {
            expression: input.to_string(),
            reason,
        },
        other => other,
    })?;
    if pos != tokens.len() {
        return Err(LreError::InvalidExpression {
            expression: input.to_string(),
            reason: "unexpected trailing tokens".to_string(),
        });
    }
    Ok(expr)
}

/// Result of classifying a license or a compound expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Classification {
    Category(LicenseCategory),
    /// An `OR` expression whose options straddle the copyleft/non-copyleft
    /// boundary: no single category answers "what license governs this?".
    DualLicense {
        options: Vec<LicenseCategory>,
        requires_review: bool,
    },
    Unknown,
}

impl Classification {
    pub fn requires_review(&self) -> bool {
        match self {
            Classification::Unknown => true,
            Classification::DualLicense { requires_review, .. } => *requires_review,
            Classification::Category(_) => false,
        }
    }

    /// The single category this classification collapses to for scoring
    /// purposes (e.g. tree-analyzer dominant-license selection): the worst
    /// (highest risk) option for a `DualLicense`, `Unknown`'s own category
    /// for `Unknown`.
    pub fn worst_category(&self) -> LicenseCategory {
        match self {
            Classification::Category(c) => *c,
            Classification::Unknown => LicenseCategory::Unknown,
            Classification::DualLicense { options, .. } => *options
                .iter()
                .max_by_key(|c| c.risk_level())
                .unwrap_or(&LicenseCategory::Unknown),
        }
    }
}

/// Possible outcome categories of `expr`, or `Err` if any operand resolves to
/// `Unknown` (propagates through the expression tree).
fn categories_of(expr: &Expr, graph: &KnowledgeGraph) -> Result<Vec<LicenseCategory>, ()> {
    match expr {
        Expr::License(id) => match canonicalize(id, graph) {
            crate::canonicalize::Canonical::Known(key) => {
                let node = graph.get_license(&key).ok_or(())?;
                Ok(vec![node.category])
            }
            crate::canonicalize::Canonical::Unknown { .. } => Err(()),
        },
        Expr::Or(ops) => {
            let mut all = Vec::new();
            for op in ops {
                all.extend(categories_of(op, graph)?);
            }
            Ok(all)
        }
        Expr::And(ops) => {
            let mut worst: Option<LicenseCategory> = None;
            for op in ops {
                for cat in categories_of(op, graph)? {
                    worst = Some(match worst {
                        Some(w) if w.risk_level() >= cat.risk_level() => w,
                        _ => cat,
                    });
                }
            }
            Ok(vec![worst.ok_or(())?])
        }
    }
}

/// Classify a parsed expression: fold per-operand categories through the
/// OR (least-restrictive-wins, dual-license on straddle) / AND
/// (most-restrictive-wins) rules.
pub fn classify_expr(expr: &Expr, graph: &KnowledgeGraph) -> Classification {
    match categories_of(expr, graph) {
        Err(()) => Classification::Unknown,
        Ok(cats) if cats.len() == 1 => Classification::Category(cats[0]),
        Ok(cats) => {
            let any_copyleft = cats.iter().any(|c| c.is_copyleft());
            let any_non_copyleft = cats.iter().any(|c| !c.is_copyleft());
            if any_copyleft && any_non_copyleft {
                let mut options = cats;
                options.sort_by_key(|c| c.risk_level());
                options.dedup();
                Classification::DualLicense {
                    options,
                    requires_review: true,
                }
            } else {
                let best = *cats.iter().min_by_key(|c| c.risk_level()).expect("non-empty");
                Classification::Category(best)
            }
        }
    }
}

/// Parse and classify `raw` in one step.
pub fn classify_str(raw: &str, graph: &KnowledgeGraph) -> Classification {
    match parse(raw) {
        Ok(expr) => classify_expr(&expr, graph),
        Err(_) => Classification::Unknown,
    }
}

/// Non-empty reason string when `expr` needs human review: it contains an
/// unrecognized operand, an `OR` straddles the copyleft boundary, or an `AND`
/// includes any copyleft operand.
pub fn requires_review(expr: &Expr, graph: &KnowledgeGraph) -> Option<String> {
    let mut reasons = Vec::new();
    collect_review_reasons(expr, graph, &mut reasons);
    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join("; "))
    }
}

fn collect_review_reasons(expr: &Expr, graph: &KnowledgeGraph, reasons: &mut Vec<String>) {
    match expr {
        Expr::License(id) => {
            if !canonicalize(id, graph).is_known() {
                reasons.push(format!("'{id}' is not a recognized license identifier"));
            }
        }
        Expr::Or(ops) => {
            for op in ops {
                collect_review_reasons(op, graph, reasons);
            }
            if let Ok(cats) = categories_of(expr, graph) {
                let any_copyleft = cats.iter().any(|c| c.is_copyleft());
                let any_non = cats.iter().any(|c| !c.is_copyleft());
                if any_copyleft && any_non {
                    reasons.push("OR expression straddles the copyleft boundary".to_string());
                }
            }
        }
        Expr::And(ops) => {
            for op in ops {
                collect_review_reasons(op, graph, reasons);
            }
            if let Ok(cats) = categories_of(expr, graph) {
                if cats.iter().any(|c| c.is_copyleft()) {
                    reasons.push("AND expression includes a copyleft operand".to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb;

    #[test]
    fn single_identifier() {
        let expr = parse("MIT").unwrap();
        assert_eq!(expr, Expr::License("MIT".to_string()));
    }

    #[test]
    fn or_expression_parses_flat() {
        let expr = parse("MIT OR GPL-3.0-ONLY").unwrap();
        assert_eq!(
            expr,
            Expr::Or(vec![
                Expr::License("MIT".to_string()),
                Expr::License("GPL-3.0-ONLY".to_string())
            ])
        );
    }

    #[test]
    fn mixed_operators_without_parens_is_invalid() {
        let err = parse("MIT AND GPL-3.0-ONLY OR APACHE-2.0").unwrap_err();
        assert!(matches!(err, LreError::InvalidExpression { .. }));
    }

    #[test]
    fn nested_parens_disambiguate_mixed_operators() {
        let expr = parse("MIT OR (GPL-3.0-ONLY AND LGPL-3.0-ONLY)").unwrap();
        assert_eq!(
            expr,
            Expr::Or(vec![
                Expr::License("MIT".to_string()),
                Expr::And(vec![
                    Expr::License("GPL-3.0-ONLY".to_string()),
                    Expr::License("LGPL-3.0-ONLY".to_string())
                ])
            ])
        );
    }

    #[test]
    fn empty_input_yields_unknown_not_error() {
        let graph = kb::seed();
        assert_eq!(classify_str("", &graph), Classification::Unknown);
    }

    #[test]
    fn or_of_permissives_picks_least_restrictive() {
        let graph = kb::seed();
        let c = classify_str("MIT OR APACHE-2.0", &graph);
        assert_eq!(c, Classification::Category(LicenseCategory::Permissive));
    }

    #[test]
    fn or_straddling_copyleft_boundary_is_dual_license() {
        let graph = kb::seed();
        let c = classify_str("MIT OR GPL-3.0-ONLY", &graph);
        assert!(matches!(c, Classification::DualLicense { requires_review: true, .. }));
        assert!(c.requires_review());
    }

    #[test]
    fn and_picks_most_restrictive() {
        let graph = kb::seed();
        let c = classify_str("MIT AND GPL-3.0-ONLY", &graph);
        assert_eq!(c, Classification::Category(LicenseCategory::StrongCopyleft));
    }

    #[test]
    fn unknown_operand_propagates() {
        let graph = kb::seed();
        let c = classify_str("MIT OR TOTALLY-MADE-UP-LICENSE", &graph);
        assert_eq!(c, Classification::Unknown);
    }
}
