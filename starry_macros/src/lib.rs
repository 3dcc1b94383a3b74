mod serenity_err;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
    pub use serenity;
    pub use tracing;
}
