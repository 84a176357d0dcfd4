//! 会话传输层：trait 与各实现

pub mod gemini;
pub mod mock;
pub mod prompt;
pub mod traits;

pub use gemini::GeminiTransport;
pub use mock::MockTransport;
pub use traits::{ChatTransport, ModelResponse, ToolCallRequest};
