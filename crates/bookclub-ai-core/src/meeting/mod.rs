pub mod coordinator;

pub use coordinator::{MeetingLifecycleCoordinator, MeetingStatus};
