//! Interpreter output.

use crate::action::Actions;
use crate::adapter::Adapter;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What one `process` call produced: the rendered body, the side-effect
/// record for the host executor, and the final variable map (exposed for
/// debugging; adapters live only for one invocation).
pub struct Response {
    pub body: String,
    pub actions: Actions,
    pub variables: HashMap<String, Arc<dyn Adapter>>,
    /// Set by the break and stop blocks; wins over the spliced body.
    pub body_override: Option<String>,
    /// Set by the stop block; the interpreter processes no further verbs.
    pub aborted: bool,
}

impl Response {
    pub fn new(variables: HashMap<String, Arc<dyn Adapter>>) -> Self {
        Response {
            body: String::new(),
            actions: Actions::default(),
            variables,
            body_override: None,
            aborted: false,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Arc<dyn Adapter>> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, adapter: Arc<dyn Adapter>) {
        self.variables.insert(name.into(), adapter);
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Response")
            .field("body", &self.body)
            .field("actions", &self.actions)
            .field("variables", &names)
            .field("aborted", &self.aborted)
            .finish()
    }
}
