pub mod dispatcher;
pub mod lifecycle;

pub use dispatcher::{AlertDispatcher, DispatcherStats, SubmitError};
pub use lifecycle::{AlertJob, AlertJobHandler, AlertLifecycleManager, AlertTransition};
