use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Deadline in seconds for each upstream round-trip (UDP or TCP).
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,

    /// Bound on nested resolution steps (referrals, CNAME chases, glue
    /// lookups) for one client question.
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: u8,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            query_timeout: default_query_timeout(),
            max_recursion_depth: default_max_recursion_depth(),
        }
    }
}

fn default_query_timeout() -> u64 {
    10
}

fn default_max_recursion_depth() -> u8 {
    10
}
