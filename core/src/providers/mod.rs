pub mod mock;
pub mod openai;

pub use mock::ScriptedProvider;
pub use openai::OpenAIProvider;
