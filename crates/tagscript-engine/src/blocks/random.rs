//! Random choice block.

use crate::block::{Block, Context};
use rand::Rng;

/// `{random:a,b,c}` picks one comma-separated item; `{range:1~10}` picks
/// from an inclusive integer range. An optional parameter seeds the choice:
/// the same seed yields the same pick within one invocation.
pub struct RandomBlock;

impl Block for RandomBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "random" | "rand" | "#" | "range")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let payload = ctx.payload()?.trim().to_string();
        if payload.is_empty() {
            return None;
        }
        let seed = ctx
            .parameter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if let Some((low, high)) = parse_range(&payload) {
            let value = match seed {
                Some(s) => ctx.seeded_rng(&s).gen_range(low..=high),
                None => ctx.rng_mut().gen_range(low..=high),
            };
            return Some(value.to_string());
        }

        let items: Vec<&str> = payload.split(',').map(str::trim).collect();
        let index = match seed {
            Some(s) => ctx.seeded_rng(&s).gen_range(0..items.len()),
            None => ctx.rng_mut().gen_range(0..items.len()),
        };
        Some(items[index].to_string())
    }
}

fn parse_range(payload: &str) -> Option<(i64, i64)> {
    let (low, high) = payload.split_once('~')?;
    let low = low.trim().parse::<i64>().ok()?;
    let high = high.trim().parse::<i64>().ok()?;
    Some(if low <= high { (low, high) } else { (high, low) })
}
