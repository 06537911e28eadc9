use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::context::ModelPolicy;

/// One row per known agent file stem; `[high, medium, low]` model ids.
/// Unknown stems are left untouched by the rewriter.
static AGENT_MODEL_TABLE: Lazy<HashMap<&'static str, [&'static str; 3]>> = Lazy::new(|| {
    HashMap::from([
        ("planner", ["opus", "sonnet", "haiku"]),
        ("builder", ["sonnet", "sonnet", "haiku"]),
        ("reviewer", ["opus", "sonnet", "sonnet"]),
        ("tester", ["sonnet", "sonnet", "haiku"]),
        ("syncer", ["sonnet", "haiku", "haiku"]),
    ])
});

fn tier_index(policy: ModelPolicy) -> usize {
    match policy {
        ModelPolicy::High => 0,
        ModelPolicy::Medium => 1,
        ModelPolicy::Low => 2,
    }
}

/// Looks up the model id for `agent_stem` at the given policy tier. Returns
/// `None` for an agent stem not present in the table, leaving the caller's
/// frontmatter untouched.
pub fn model_for(agent_stem: &str, policy: ModelPolicy) -> Option<&'static str> {
    AGENT_MODEL_TABLE.get(agent_stem).map(|row| row[tier_index(policy)])
}
