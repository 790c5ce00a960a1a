//! PEST-based parser for do-notation bodies
//!
//! Produces the executor's AST, with span information for error reporting.
//! Operators other than `&&` and `||` are desugared into
//! operator builtins (`a + b` becomes `Builtin { op: Add, .. }`).

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::types::ast::{is_default_span, BinaryOp, Expr, Op, Span, Stmt};

pub mod semantic_validator;


/* ===================== Function Definition ===================== */

/// A parsed `do function name(params) { body }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    /// Parameter names, bound positionally on each call
    pub params: Vec<String>,
    /// Function body, always a `Stmt::Block`
    pub body: Stmt,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/donotation.pest"]
struct DoParser;

/* ===================== Error Types ===================== */

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    PestError(String, Option<Span>),
    #[error("{0}")]
    BuildError(String, Option<Span>),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::PestError(_, span) => *span,
            ParseError::BuildError(_, span) => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::PestError(msg, _) => msg,
            ParseError::BuildError(msg, _) => msg,
        }
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let span = match err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => Span {
                start: 0,
                end: 0,
                start_line: line.saturating_sub(1),
                start_col: col.saturating_sub(1),
                end_line: line.saturating_sub(1),
                end_col: col,
            },
            pest::error::LineColLocation::Span((start_line, start_col), (end_line, end_col)) => {
                Span {
                    start: 0,
                    end: 0,
                    start_line: start_line.saturating_sub(1),
                    start_col: start_col.saturating_sub(1),
                    end_line: end_line.saturating_sub(1),
                    end_col: end_col.saturating_sub(1),
                }
            }
        };
        ParseError::PestError(err.to_string(), Some(span))
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Span Helpers ===================== */

/// Convert a PEST pair's span to our Span type
fn pair_to_span(pair: &Pair<Rule>, source: &str) -> Span {
    let pest_span = pair.as_span();
    let start = pest_span.start();
    let end = pest_span.end();

    let (start_line, start_col) = offset_to_line_col(source, start);
    let (end_line, end_col) = offset_to_line_col(source, end);

    Span::new(start, end, start_line, start_col, end_line, end_col)
}

/// Convert byte offset to (line, column) - 0-indexed
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/* ===================== Pair Helpers ===================== */

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_do
            | Rule::kw_function
            | Rule::kw_let
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_for
            | Rule::kw_of
            | Rule::kw_return
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_yield
    )
}

/// Inner pairs without keyword tokens
fn children(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn next_pair<'a>(
    inner: &mut impl Iterator<Item = Pair<'a, Rule>>,
    what: &str,
    span: Span,
) -> ParseResult<Pair<'a, Rule>> {
    inner
        .next()
        .ok_or_else(|| ParseError::BuildError(format!("Expected {}", what), Some(span)))
}

/* ===================== Public API ===================== */

/// Parse a source file holding a single `do function`
pub fn parse_function(source: &str) -> ParseResult<FunctionDef> {
    let (content, program_span) = parse_program(source)?;

    match content.as_rule() {
        Rule::do_function => build_do_function(content, source),
        Rule::bare_body => Err(ParseError::BuildError(
            "Source must contain a single 'do function name(...) { ... }'".to_string(),
            Some(program_span),
        )),
        _ => Err(ParseError::BuildError(
            format!("Unexpected program content: {:?}", content.as_rule()),
            Some(program_span),
        )),
    }
}

/// Parse source into a statement block (testing API)
///
/// Accepts bare statement lists as well as a `do function`, in which case
/// its body is returned.
pub fn parse(source: &str) -> ParseResult<Stmt> {
    let (content, program_span) = parse_program(source)?;

    match content.as_rule() {
        Rule::do_function => Ok(build_do_function(content, source)?.body),
        Rule::bare_body => {
            let body = children(content)
                .map(|stmt_pair| build_statement(stmt_pair, source))
                .collect::<ParseResult<Vec<_>>>()?;
            Ok(Stmt::Block {
                body,
                span: program_span,
            })
        }
        _ => Err(ParseError::BuildError(
            format!("Unexpected program content: {:?}", content.as_rule()),
            Some(program_span),
        )),
    }
}

fn parse_program(source: &str) -> ParseResult<(Pair<'_, Rule>, Span)> {
    let mut pairs = DoParser::parse(Rule::program, source)?;
    let program = next_pair(&mut pairs, "program", Span::default())?;
    let program_span = pair_to_span(&program, source);
    let content = next_pair(&mut program.into_inner(), "program content", program_span)?;
    Ok((content, program_span))
}

/* ===================== AST Builder ===================== */

fn build_do_function(pair: Pair<Rule>, source: &str) -> ParseResult<FunctionDef> {
    let span = pair_to_span(&pair, source);
    let mut inner = children(pair);

    let name = next_pair(&mut inner, "function name", span)?.as_str().to_string();

    let next = next_pair(&mut inner, "parameter list or body", span)?;
    let (params, block_pair) = if next.as_rule() == Rule::param_list {
        let params = children(next).map(|p| p.as_str().to_string()).collect();
        (params, next_pair(&mut inner, "function body", span)?)
    } else {
        (vec![], next)
    };

    let body = build_block(block_pair, source)?;

    Ok(FunctionDef {
        name,
        params,
        body,
        span,
    })
}

fn build_block(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let statements: Result<Vec<Stmt>, ParseError> = children(pair)
        .map(|stmt_pair| build_statement(stmt_pair, source))
        .collect();

    Ok(Stmt::Block {
        body: statements?,
        span,
    })
}

fn build_statement(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);

    match pair.as_rule() {
        Rule::statement => {
            let inner = next_pair(&mut children(pair), "statement", span)?;
            build_statement(inner, source)
        }
        Rule::return_stmt => {
            let value = match children(pair).next() {
                Some(expr_pair) => Some(build_expression(expr_pair, source)?),
                None => None,
            };
            Ok(Stmt::Return { value, span })
        }
        Rule::if_stmt => build_if_stmt(pair, source),
        Rule::while_stmt => build_while_stmt(pair, source),
        Rule::for_loop_stmt => build_for_loop_stmt(pair, source),
        Rule::break_stmt => Ok(Stmt::Break { span }),
        Rule::continue_stmt => Ok(Stmt::Continue { span }),
        Rule::block => build_block(pair, source),
        Rule::declare_stmt => build_declare_stmt(pair, source),
        Rule::assign_stmt => build_assign_stmt(pair, source),
        Rule::expr_stmt => {
            let expr_pair = next_pair(&mut children(pair), "expression", span)?;
            let expr = build_expression(expr_pair, source)?;
            Ok(Stmt::Expr { expr, span })
        }
        _ => Err(ParseError::BuildError(
            format!("Unexpected statement rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn build_if_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = children(pair);

    let test = build_expression(next_pair(&mut inner, "condition", span)?, source)?;
    let then_s = build_statement(next_pair(&mut inner, "then branch", span)?, source)?;

    let else_s = match inner.next() {
        Some(else_clause) => {
            let else_inner = next_pair(&mut children(else_clause), "else branch", span)?;
            Some(Box::new(build_statement(else_inner, source)?))
        }
        None => None,
    };

    Ok(Stmt::If {
        test,
        then_s: Box::new(then_s),
        else_s,
        span,
    })
}

fn build_while_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = children(pair);

    let test = build_expression(next_pair(&mut inner, "condition", span)?, source)?;
    let body = build_statement(next_pair(&mut inner, "loop body", span)?, source)?;

    Ok(Stmt::While {
        test,
        body: Box::new(body),
        span,
    })
}

fn build_for_loop_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = children(pair);

    let binding_pair = next_pair(&mut inner, "loop variable", span)?;
    let binding_span = pair_to_span(&binding_pair, source);
    let binding = binding_pair.as_str().to_string();

    let iterable = build_expression(next_pair(&mut inner, "iterable", span)?, source)?;
    let body = build_statement(next_pair(&mut inner, "loop body", span)?, source)?;

    Ok(Stmt::ForLoop {
        binding,
        binding_span,
        iterable,
        body: Box::new(body),
        span,
    })
}

fn build_declare_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = children(pair);

    let name_pair = next_pair(&mut inner, "variable name", span)?;
    let name_span = pair_to_span(&name_pair, source);
    let name = name_pair.as_str().to_string();

    let init = match inner.next() {
        Some(expr_pair) => Some(build_expression(expr_pair, source)?),
        None => None,
    };

    Ok(Stmt::Declare {
        name,
        name_span,
        init,
        span,
    })
}

fn build_assign_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = children(pair);

    let var_pair = next_pair(&mut inner, "variable name", span)?;
    let var_span = pair_to_span(&var_pair, source);
    let var = var_pair.as_str().to_string();

    let value = build_expression(next_pair(&mut inner, "assigned value", span)?, source)?;

    Ok(Stmt::Assign {
        var,
        var_span,
        value,
        span,
    })
}

fn builtin(op: Op, args: Vec<Expr>, span: Span) -> Expr {
    Expr::Builtin { op, args, span }
}

fn build_binary_expr(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let mut left = build_expression(next_pair(&mut inner, "operand", span)?, source)?;

    while let Some(op_pair) = inner.next() {
        let op_rule = op_pair.as_rule();
        let right_pair = next_pair(&mut inner, "right operand after operator", span)?;
        let right = build_expression(right_pair, source)?;
        let new_span = left.span().merge(&right.span());

        left = match op_rule {
            Rule::op_and => Expr::BinaryOp {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            },
            Rule::op_or => Expr::BinaryOp {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            },
            _ => {
                let op = match op_rule {
                    Rule::op_eq => Op::Eq,
                    Rule::op_ne => Op::Ne,
                    Rule::op_lt => Op::Lt,
                    Rule::op_lte => Op::Lte,
                    Rule::op_gt => Op::Gt,
                    Rule::op_gte => Op::Gte,
                    Rule::op_add => Op::Add,
                    Rule::op_sub => Op::Sub,
                    Rule::op_mul => Op::Mul,
                    Rule::op_div => Op::Div,
                    Rule::op_mod => Op::Mod,
                    _ => {
                        return Err(ParseError::BuildError(
                            format!("Expected operator, got {:?}", op_rule),
                            Some(span),
                        ))
                    }
                };
                builtin(op, vec![left, right], new_span)
            }
        };
    }

    Ok(left)
}

fn build_expression(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);

    match pair.as_rule() {
        Rule::expression | Rule::primary | Rule::literal => {
            let inner = next_pair(&mut children(pair), "expression", span)?;
            build_expression(inner, source)
        }
        Rule::yield_expr => {
            let operand = next_pair(&mut children(pair), "operand after 'yield'", span)?;
            Ok(Expr::Yield {
                inner: Box::new(build_expression(operand, source)?),
                span,
            })
        }
        Rule::ternary_expr => {
            let mut inner = pair.into_inner();
            let condition = build_expression(next_pair(&mut inner, "condition", span)?, source)?;

            match inner.next() {
                Some(consequent_pair) => {
                    let consequent = build_expression(consequent_pair, source)?;
                    let alternate =
                        build_expression(next_pair(&mut inner, "':' branch", span)?, source)?;
                    Ok(Expr::Ternary {
                        condition: Box::new(condition),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                        span,
                    })
                }
                None => Ok(condition),
            }
        }
        Rule::logical_or_expr
        | Rule::logical_and_expr
        | Rule::equality_expr
        | Rule::comparison_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => build_binary_expr(pair, source),
        Rule::unary_expr => {
            let mut inner = pair.into_inner();
            let first = next_pair(&mut inner, "expression", span)?;

            let op = match first.as_rule() {
                Rule::op_not => Op::Not,
                Rule::op_neg => Op::Neg,
                _ => return build_expression(first, source),
            };
            let operand = build_expression(next_pair(&mut inner, "operand", span)?, source)?;
            Ok(builtin(op, vec![operand], span))
        }
        Rule::call_expr => {
            let mut inner = pair.into_inner();
            let mut expr = build_expression(next_pair(&mut inner, "expression", span)?, source)?;

            for postfix_pair in inner {
                let postfix_span = pair_to_span(&postfix_pair, source);
                let postfix_inner = next_pair(&mut postfix_pair.into_inner(), "postfix", span)?;
                let new_span = expr.span().merge(&postfix_span);

                expr = match postfix_inner.as_rule() {
                    Rule::call_suffix => {
                        let args = match postfix_inner.into_inner().next() {
                            Some(arg_list) => build_expression_list(arg_list, source)?,
                            None => vec![],
                        };
                        Expr::Call {
                            callee: Box::new(expr),
                            args,
                            span: new_span,
                        }
                    }
                    Rule::member_access => {
                        let prop_pair =
                            next_pair(&mut postfix_inner.into_inner(), "property name", span)?;
                        Expr::Member {
                            object: Box::new(expr),
                            property: prop_pair.as_str().to_string(),
                            property_span: pair_to_span(&prop_pair, source),
                            span: new_span,
                        }
                    }
                    other => {
                        return Err(ParseError::BuildError(
                            format!("Unexpected postfix rule: {:?}", other),
                            Some(postfix_span),
                        ))
                    }
                };
            }

            Ok(expr)
        }
        Rule::identifier => Ok(Expr::Ident {
            name: pair.as_str().to_string(),
            span,
        }),
        Rule::number => {
            let num_str = pair.as_str();
            let value = num_str.parse::<f64>().map_err(|e| {
                ParseError::BuildError(
                    format!("Failed to parse number '{}': {}", num_str, e),
                    Some(span),
                )
            })?;
            Ok(Expr::LitNum { v: value, span })
        }
        Rule::boolean => Ok(Expr::LitBool {
            v: pair.as_str() == "true",
            span,
        }),
        Rule::string => Ok(Expr::LitStr {
            v: string_value(pair, span)?,
            span,
        }),
        Rule::null_lit => Ok(Expr::LitNull { span }),
        Rule::object_lit => build_object_literal(pair, source),
        Rule::array_lit => {
            let elements = match pair.into_inner().next() {
                Some(element_list) => build_expression_list(element_list, source)?,
                None => vec![],
            };
            Ok(Expr::LitList { elements, span })
        }
        _ => Err(ParseError::BuildError(
            format!("Unexpected expression rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn build_expression_list(pair: Pair<Rule>, source: &str) -> ParseResult<Vec<Expr>> {
    pair.into_inner()
        .map(|expr_pair| build_expression(expr_pair, source))
        .collect()
}

fn build_object_literal(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);

    let properties = match pair.into_inner().next() {
        Some(property_list) => property_list
            .into_inner()
            .map(|property| build_property(property, source))
            .collect::<ParseResult<Vec<_>>>()?,
        None => vec![],
    };

    Ok(Expr::LitObj { properties, span })
}

fn build_property(pair: Pair<Rule>, source: &str) -> ParseResult<(String, Span, Expr)> {
    let span = pair_to_span(&pair, source);
    let inner = next_pair(&mut pair.into_inner(), "property", span)?;
    let inner_span = pair_to_span(&inner, source);

    match inner.as_rule() {
        Rule::property_pair => {
            let mut inner_pairs = inner.into_inner();
            let key_pair = next_pair(&mut inner_pairs, "property key", inner_span)?;
            let key_span = pair_to_span(&key_pair, source);
            let key = match key_pair.as_rule() {
                Rule::string => string_value(key_pair, key_span)?,
                _ => key_pair.as_str().to_string(),
            };
            let value_pair = next_pair(&mut inner_pairs, "property value", inner_span)?;
            let value = build_expression(value_pair, source)?;
            Ok((key, key_span, value))
        }
        Rule::property_shorthand => {
            let key = inner.as_str().to_string();
            let value = Expr::Ident {
                name: key.clone(),
                span: inner_span,
            };
            Ok((key, inner_span, value))
        }
        _ => Err(ParseError::BuildError(
            format!("Unexpected property rule: {:?}", inner.as_rule()),
            Some(inner_span),
        )),
    }
}

fn string_value(pair: Pair<Rule>, span: Span) -> ParseResult<String> {
    let content = next_pair(&mut pair.into_inner(), "string content", span)?;
    Ok(unescape(content.as_str()))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
