//! The two small expression grammars used by the block library.
//!
//! Comparison grammar (if/any/all/break/stop): `<left><op><right>` with
//! `==  !=  >=  <=  >  <`. Both sides numeric ⇒ numeric comparison, else
//! string comparison. Arithmetic grammar (math): `+ - * / // % **` with
//! parentheses and unary minus over a safe AST walker — no names, no
//! attribute access. Malformed input yields `None` so the calling block
//! declines and the verb is rewritten literally.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{anychar, char, multispace0, one_of},
    combinator::{all_consuming, map, not, opt, peek, value},
    multi::{fold_many0, many_till},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

// =============================================================================
// COMPARISON GRAMMAR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

fn comp_op(input: &str) -> IResult<&str, CompOp> {
    // Two-character operators first so ">=" never lexes as ">" "=".
    alt((
        value(CompOp::Eq, tag("==")),
        value(CompOp::Ne, tag("!=")),
        value(CompOp::Ge, tag(">=")),
        value(CompOp::Le, tag("<=")),
        value(CompOp::Gt, tag(">")),
        value(CompOp::Lt, tag("<")),
    ))(input)
}

/// Evaluate one comparison expression. Bare `true`/`false` are allowed;
/// anything without an operator is malformed.
pub(crate) fn evaluate_comparison(expression: &str) -> Option<bool> {
    let trimmed = expression.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(false);
    }

    let (right, (left_chars, op)) =
        many_till(anychar, comp_op)(trimmed).ok()?;
    let left: String = left_chars.into_iter().collect();
    let left = left.trim();
    let right = right.trim();

    let result = match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(a), Ok(b)) => match op {
            CompOp::Eq => a == b,
            CompOp::Ne => a != b,
            CompOp::Ge => a >= b,
            CompOp::Le => a <= b,
            CompOp::Gt => a > b,
            CompOp::Lt => a < b,
        },
        _ => match op {
            CompOp::Eq => left == right,
            CompOp::Ne => left != right,
            CompOp::Ge => left >= right,
            CompOp::Le => left <= right,
            CompOp::Gt => left > right,
            CompOp::Lt => left < right,
        },
    };
    Some(result)
}

// =============================================================================
// ARITHMETIC GRAMMAR
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, init) = term(input)?;
    fold_many0(
        pair(
            preceded(multispace0, one_of("+-")),
            preceded(multispace0, term),
        ),
        move || init.clone(),
        |acc, (op, rhs)| {
            let op = if op == '+' { BinOp::Add } else { BinOp::Sub };
            Expr::Bin(op, Box::new(acc), Box::new(rhs))
        },
    )(input)
}

fn term_op(input: &str) -> IResult<&str, BinOp> {
    preceded(
        multispace0,
        alt((
            value(BinOp::FloorDiv, tag("//")),
            value(BinOp::Rem, tag("%")),
            // "*" only when not the first half of "**".
            value(BinOp::Mul, terminated(tag("*"), peek(not(char('*'))))),
            value(BinOp::Div, tag("/")),
        )),
    )(input)
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, init) = unary(input)?;
    fold_many0(
        pair(term_op, unary),
        move || init.clone(),
        |acc, (op, rhs)| Expr::Bin(op, Box::new(acc), Box::new(rhs)),
    )(input)
}

fn unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((
        map(preceded(char('-'), unary), |e| Expr::Neg(Box::new(e))),
        power,
    ))(input)
}

// Exponentiation is right-associative and binds tighter than unary minus on
// the base, matching the usual arithmetic reading of `-2**2 == -4`.
fn power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = atom(input)?;
    let (input, exponent) = opt(preceded(preceded(multispace0, tag("**")), unary))(input)?;
    Ok((
        input,
        match exponent {
            Some(e) => Expr::Bin(BinOp::Pow, Box::new(base), Box::new(e)),
            None => base,
        },
    ))
}

fn atom(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((
        delimited(char('('), expr, preceded(multispace0, char(')'))),
        map(double, Expr::Num),
    ))(input)
}

fn eval(node: &Expr) -> Option<f64> {
    Some(match node {
        Expr::Num(n) => *n,
        Expr::Neg(e) => -eval(e)?,
        Expr::Bin(op, lhs, rhs) => {
            let a = eval(lhs)?;
            let b = eval(rhs)?;
            match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => {
                    if b == 0.0 {
                        return None;
                    }
                    a / b
                }
                BinOp::FloorDiv => {
                    if b == 0.0 {
                        return None;
                    }
                    (a / b).floor()
                }
                // Floor semantics, so the sign follows the divisor.
                BinOp::Rem => {
                    if b == 0.0 {
                        return None;
                    }
                    a - b * (a / b).floor()
                }
                BinOp::Pow => a.powf(b),
            }
        }
    })
}

/// Evaluate one arithmetic expression to its rendered form. Integral
/// results print without a decimal point.
pub(crate) fn evaluate_math(expression: &str) -> Option<String> {
    let (_, ast) = all_consuming(terminated(expr, multispace0))(expression).ok()?;
    let result = eval(&ast)?;
    if !result.is_finite() {
        return None;
    }
    if result.fract() == 0.0 && result.abs() < 9.0e15 {
        Some(format!("{}", result as i64))
    } else {
        Some(format!("{}", result))
    }
}
