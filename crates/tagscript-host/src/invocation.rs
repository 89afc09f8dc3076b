//! One incoming chat-command invocation, as seen by the host.

/// Everything the executor and runner need to know about the triggering
/// message. Role and channel identifiers are plain strings resolved by the
/// chat port; the engine itself never sees this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub guild_id: Option<u64>,
    pub guild_name: String,
    pub channel_id: u64,
    pub channel_name: String,
    pub message_id: u64,
    pub invoker_id: u64,
    pub invoker_name: String,
    pub invoker_roles: Vec<String>,
    /// Name of the command that triggered this invocation. A queued
    /// sub-command starting with it is rejected to prevent loops.
    pub command: String,
}

impl Default for Invocation {
    fn default() -> Self {
        Invocation {
            guild_id: None,
            guild_name: String::new(),
            channel_id: 0,
            channel_name: String::new(),
            message_id: 0,
            invoker_id: 0,
            invoker_name: String::new(),
            invoker_roles: Vec::new(),
            command: "tag".to_string(),
        }
    }
}
