//! Tool-calling agent machinery: the [`Tool`] trait, a web search tool,
//! the agent executor, and the weather extraction strategies.

pub mod events;
pub mod executor;
pub mod tavily;
pub mod tool;
pub mod weather;

pub use events::{AgentEvent, EventStream};
pub use executor::AgentExecutor;
pub use tavily::TavilySearch;
pub use tool::Tool;
pub use weather::{run_weather, weather_schema, WeatherStrategy};
