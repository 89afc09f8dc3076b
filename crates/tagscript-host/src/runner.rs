//! End-to-end tag invocation: resolve, seed, render, execute.

use crate::executor::{ActionExecutor, ExecutionOutcome};
use crate::invocation::Invocation;
use crate::store::TagStore;
use std::collections::HashMap;
use std::sync::Arc;
use tagscript_engine::{
    Adapter, Channel, ChannelAdapter, Guild, GuildAdapter, IntAdapter, Interpreter, Member,
    MemberAdapter, Response, StringAdapter,
};
use tracing::debug;

/// What one invocation produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// No tag with that name in the server or global scope.
    NotFound,
    Rendered {
        response: Response,
        execution: ExecutionOutcome,
    },
}

pub struct TagRunner {
    store: Arc<TagStore>,
    interpreter: Arc<Interpreter>,
    executor: ActionExecutor,
}

impl TagRunner {
    pub fn new(store: Arc<TagStore>, interpreter: Arc<Interpreter>, executor: ActionExecutor) -> Self {
        TagRunner {
            store,
            interpreter,
            executor,
        }
    }

    /// Look the tag up (aliases allowed, server shadows global), bump its
    /// use counter, render, then apply the recorded actions.
    pub async fn run(&self, invocation: &Invocation, name: &str, args: &str) -> RunOutcome {
        let Some((scope, tag)) = self.store.resolve(invocation.guild_id, name) else {
            return RunOutcome::NotFound;
        };
        self.store.bump_uses(scope, &tag.name);
        debug!(tag = %tag.name, ?scope, "invoking tag");

        let seed = seed_variables(invocation, &tag.name, tag.uses + 1, args);
        let response = self.interpreter.process(&tag.tagscript, seed);
        let execution = self.executor.execute(invocation, &response).await;
        RunOutcome::Rendered {
            response,
            execution,
        }
    }
}

/// The standard seed map: `args`, `uses`, `author`, `channel`, `server`,
/// and the tag's own name under `tag_name`.
pub fn seed_variables(
    invocation: &Invocation,
    tag_name: &str,
    uses: u64,
    args: &str,
) -> HashMap<String, Arc<dyn Adapter>> {
    let author = Member {
        id: invocation.invoker_id,
        name: invocation.invoker_name.clone(),
        ..Default::default()
    };
    let channel = Channel {
        id: invocation.channel_id,
        name: invocation.channel_name.clone(),
        ..Default::default()
    };
    let server = Guild {
        id: invocation.guild_id.unwrap_or_default(),
        name: invocation.guild_name.clone(),
        ..Default::default()
    };

    let mut seed: HashMap<String, Arc<dyn Adapter>> = HashMap::new();
    seed.insert("args".into(), Arc::new(StringAdapter::new(args)));
    seed.insert("uses".into(), Arc::new(IntAdapter::new(uses as i64)));
    seed.insert("author".into(), Arc::new(MemberAdapter::new(&author)));
    seed.insert("channel".into(), Arc::new(ChannelAdapter::new(&channel)));
    seed.insert("server".into(), Arc::new(GuildAdapter::new(&server)));
    seed.insert("tag_name".into(), Arc::new(StringAdapter::new(tag_name)));
    seed
}
