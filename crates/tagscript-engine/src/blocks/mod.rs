//! Built-in block library.
//!
//! Grouped by role: variable access, control flow, text/math utilities, and
//! side-effect (action) blocks. [`default_blocks`] assembles the standard
//! library in probe order — specific declarations first, the loose variable
//! getter last so a variable can never shadow a claimed block name.

mod actions;
mod control;
mod math;
mod random;
mod strings;
mod time;
mod variables;

pub use actions::{
    BlacklistBlock, CommandBlock, CooldownBlock, DeleteBlock, EmbedBlock, OverrideBlock,
    ReactBlock, ReactUBlock, RedirectBlock, RequireBlock, SilentBlock,
};
pub use control::{AllBlock, AnyBlock, BreakBlock, FiftyFiftyBlock, IfBlock, StopBlock};
pub use math::MathBlock;
pub use random::RandomBlock;
pub use strings::{ReplaceBlock, SubstringBlock, UrlEncodeBlock};
pub use time::StrftimeBlock;
pub use variables::{AssignmentBlock, LooseVariableGetterBlock, ShortcutRedirectBlock};

use crate::block::Block;
use std::sync::Arc;

/// The standard block library, in `accepts` probe order.
pub fn default_blocks() -> Vec<Arc<dyn Block>> {
    vec![
        Arc::new(IfBlock),
        Arc::new(AllBlock),
        Arc::new(AnyBlock),
        Arc::new(BreakBlock),
        Arc::new(StopBlock),
        Arc::new(FiftyFiftyBlock),
        Arc::new(RandomBlock),
        Arc::new(MathBlock),
        Arc::new(ReplaceBlock),
        Arc::new(SubstringBlock),
        Arc::new(UrlEncodeBlock),
        Arc::new(StrftimeBlock),
        Arc::new(AssignmentBlock),
        Arc::new(CommandBlock),
        Arc::new(OverrideBlock),
        Arc::new(RequireBlock),
        Arc::new(BlacklistBlock),
        Arc::new(CooldownBlock),
        Arc::new(DeleteBlock),
        Arc::new(SilentBlock),
        Arc::new(ReactBlock),
        Arc::new(ReactUBlock),
        Arc::new(RedirectBlock),
        Arc::new(EmbedBlock),
        Arc::new(ShortcutRedirectBlock::new("args")),
        Arc::new(LooseVariableGetterBlock),
    ]
}

/// Split an if/any/all payload into its then/else branches at the first `|`.
pub(crate) fn split_branches(payload: &str) -> (&str, &str) {
    match payload.split_once('|') {
        Some((then, otherwise)) => (then, otherwise),
        None => (payload, ""),
    }
}

/// Truthiness of a delete/silent parameter: `true`/`yes`/`1`/empty ⇒ true.
pub(crate) fn parse_flag(parameter: Option<&str>) -> bool {
    match parameter.map(|p| p.trim().to_lowercase()) {
        None => true,
        Some(p) if p.is_empty() => true,
        Some(p) => matches!(p.as_str(), "true" | "yes" | "y" | "1"),
    }
}
