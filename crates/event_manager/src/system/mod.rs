/// Event manager facade - split into registration, emission and management
pub(crate) mod core;
mod emitters;
mod handlers;
mod management;
pub(crate) mod stats;

pub use self::core::EventManager;
pub use stats::EventManagerStats;
