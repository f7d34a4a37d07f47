pub mod driver;
pub mod random;

pub(crate) mod data;
pub(crate) mod queue;
pub(crate) mod simulation;

pub use data::{QueueReport, Report, Termination};
pub use driver::{run, Config, Error};
pub use queue::{ConfigError, QueueDesc, RouteDesc, TimeRange};
pub use random::UniformSequence;
