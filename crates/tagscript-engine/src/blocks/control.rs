//! Control-flow blocks.

use crate::block::{Block, Context};
use crate::blocks::split_branches;
use crate::expr::evaluate_comparison;
use rand::Rng;

/// `{if(<left><op><right>):then|else}`
pub struct IfBlock;

impl Block for IfBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "if"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let condition = evaluate_comparison(ctx.parameter()?)?;
        let (then, otherwise) = split_branches(ctx.payload().unwrap_or(""));
        Some(if condition { then } else { otherwise }.to_string())
    }
}

/// `{all(a==1,b==2):then|else}` — short-circuit AND over the sub-expressions.
pub struct AllBlock;

impl Block for AllBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "all" | "and")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let mut condition = true;
        for part in ctx.parameter()?.split(',') {
            match evaluate_comparison(part)? {
                true => continue,
                false => {
                    condition = false;
                    break;
                }
            }
        }
        let (then, otherwise) = split_branches(ctx.payload().unwrap_or(""));
        Some(if condition { then } else { otherwise }.to_string())
    }
}

/// `{any(a==1,b==2):then|else}` — short-circuit OR.
pub struct AnyBlock;

impl Block for AnyBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "any" | "or")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let mut condition = false;
        for part in ctx.parameter()?.split(',') {
            match evaluate_comparison(part)? {
                true => {
                    condition = true;
                    break;
                }
                false => continue,
            }
        }
        let (then, otherwise) = split_branches(ctx.payload().unwrap_or(""));
        Some(if condition { then } else { otherwise }.to_string())
    }
}

/// `{break(cond):payload}` — when the condition holds, the payload replaces
/// the entire output; processing continues so later action blocks still run.
pub struct BreakBlock;

impl Block for BreakBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "break" | "shortcircuit")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let condition = evaluate_comparison(ctx.parameter()?)?;
        if condition {
            let body = ctx.payload().unwrap_or("").to_string();
            ctx.response_mut().body_override = Some(body);
        }
        Some(String::new())
    }
}

/// `{stop(cond):payload}` — when the condition holds, aborts further
/// processing; the payload becomes the final body and every verb after this
/// one in lex order stays literal.
pub struct StopBlock;

impl Block for StopBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "stop" | "halt" | "error")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let condition = evaluate_comparison(ctx.parameter()?)?;
        if condition {
            let body = ctx.payload().unwrap_or("").to_string();
            let response = ctx.response_mut();
            response.body_override = Some(body);
            response.aborted = true;
        }
        Some(String::new())
    }
}

/// `{5050:payload}` — emits the payload with probability one half.
pub struct FiftyFiftyBlock;

impl Block for FiftyFiftyBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "5050" | "50" | "?")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let payload = ctx.payload()?.to_string();
        if ctx.rng_mut().gen_bool(0.5) {
            Some(payload)
        } else {
            Some(String::new())
        }
    }
}
