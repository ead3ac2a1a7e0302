pub mod events;
pub mod session;
pub mod sink;
pub mod survey;
pub mod tracker;

pub use events::{Action, ActionEvent, ActionKind};
pub use session::Session;
pub use sink::{EventDispatcher, EventSink, JsonLinesSink, MemorySink};
pub use survey::SessionSummary;
pub use tracker::{AnalyticsTracker, PlayerAnalyticsState, SessionContext};
