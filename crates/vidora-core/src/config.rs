/// Behaviour switches for the engine. The server fills these from the
/// environment; tests use `Default`.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Whether a user may subscribe to their own channel.
    pub allow_self_subscription: bool,
    pub default_page_limit: u64,
    pub max_page_limit: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            allow_self_subscription: false,
            default_page_limit: 10,
            max_page_limit: 100,
        }
    }
}
