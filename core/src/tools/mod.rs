pub mod calculator;
pub mod clock;
pub mod memory;
pub mod search;
pub mod weather;

pub use calculator::CalculatorTool;
pub use clock::ClockTool;
pub use memory::{ListMemoryTool, MEMORY_KEY, RetrieveMemoryTool, StoreMemoryTool};
pub use search::SearchTool;
pub use weather::WeatherTool;
