//! Arithmetic block.

use crate::block::{Block, Context};
use crate::expr::evaluate_math;

/// `{math:1+2*3}` — evaluates the payload (or parameter) as an arithmetic
/// expression. Division by zero and malformed input leave the verb literal.
pub struct MathBlock;

impl Block for MathBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "math" | "m" | "+" | "calc")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let expression = ctx.payload().or_else(|| ctx.parameter())?;
        evaluate_math(expression)
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::default_blocks;
    use crate::interpreter::Interpreter;
    use std::collections::HashMap;

    fn render(source: &str) -> String {
        Interpreter::new(default_blocks())
            .process(source, HashMap::new())
            .body
    }

    #[test]
    fn evaluates_payload() {
        assert_eq!(render("{math:2+2}"), "4");
        assert_eq!(render("{m:10//3}"), "3");
        assert_eq!(render("{calc:2**8}"), "256");
    }

    #[test]
    fn parameter_form_works_too() {
        assert_eq!(render("{math(6*7)}"), "42");
    }

    #[test]
    fn division_by_zero_is_literal() {
        assert_eq!(render("{math:1/0}"), "{math:1/0}");
    }

    #[test]
    fn nested_variable_feeds_the_expression() {
        assert_eq!(render("{=(n):3}{math:{n}*4}"), "12");
    }
}
