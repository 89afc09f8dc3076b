//! Variable access blocks.

use crate::adapter::StringAdapter;
use crate::block::{Block, Context};
use std::sync::Arc;

/// Renders any declaration bound in the variable map. Sits last in the probe
/// order, so a claimed block name always wins over a variable of the same
/// name; an unbound name leaves the verb literal so the author can see it.
pub struct LooseVariableGetterBlock;

impl Block for LooseVariableGetterBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.response()
            .variables
            .contains_key(ctx.verb().declaration.as_str())
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let adapter = ctx
            .response()
            .variables
            .get(ctx.verb().declaration.as_str())?
            .clone();
        adapter.get_value(ctx.parameter())
    }
}

/// `{=(name):value}` — stores the payload as a string variable.
pub struct AssignmentBlock;

impl Block for AssignmentBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "=" | "assign" | "let" | "var")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let name = ctx.parameter()?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        let value = ctx.payload().unwrap_or("").to_string();
        ctx.response_mut()
            .set_variable(name, Arc::new(StringAdapter::new(value)));
        Some(String::new())
    }
}

/// Rewrites bare positional declarations — `{1}`, `{2+}` — to a lookup on
/// the configured variable (`args` in the stock library), so tag authors get
/// positional argument access without spelling out `{args(1)}`.
pub struct ShortcutRedirectBlock {
    target: String,
}

impl ShortcutRedirectBlock {
    pub fn new(target: impl Into<String>) -> Self {
        ShortcutRedirectBlock {
            target: target.into(),
        }
    }
}

impl Block for ShortcutRedirectBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        let dec = ctx.declaration();
        let digits = dec.strip_suffix('+').unwrap_or(dec);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let adapter = ctx.response().variables.get(&self.target)?.clone();
        adapter.get_value(Some(&ctx.verb().declaration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::default_blocks;
    use crate::interpreter::Interpreter;
    use std::collections::HashMap;

    fn interp() -> Interpreter {
        Interpreter::new(default_blocks())
    }

    fn seed(args: &str) -> HashMap<String, Arc<dyn crate::adapter::Adapter>> {
        let mut vars: HashMap<String, Arc<dyn crate::adapter::Adapter>> = HashMap::new();
        vars.insert("args".into(), Arc::new(StringAdapter::new(args)));
        vars
    }

    #[test]
    fn getter_renders_bound_variable() {
        let response = interp().process("hi {args}", seed("there"));
        assert_eq!(response.body, "hi there");
    }

    #[test]
    fn unbound_variable_stays_literal() {
        let response = interp().process("{missing}", HashMap::new());
        assert_eq!(response.body, "{missing}");
    }

    #[test]
    fn assignment_then_get() {
        let response = interp().process("{=(x):hello}{x}", HashMap::new());
        assert_eq!(response.body, "hello");
        let stored = response.variable("x").unwrap().get_value(None);
        assert_eq!(stored.as_deref(), Some("hello"));
    }

    #[test]
    fn assignment_without_name_is_literal() {
        let response = interp().process("{=():oops}", HashMap::new());
        assert_eq!(response.body, "{=():oops}");
    }

    #[test]
    fn shortcut_redirect_indexes_args() {
        let response = interp().process("{1} and {2+}", seed("red green blue"));
        assert_eq!(response.body, "red and green blue");
    }

    #[test]
    fn shortcut_without_args_variable_is_literal() {
        let response = interp().process("{1}", HashMap::new());
        assert_eq!(response.body, "{1}");
    }
}
