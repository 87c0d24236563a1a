/// Errors raised while building or validating a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("left recursion: `{rule}` can reach itself without consuming input")]
    LeftRecursion { rule: String },
}
