pub mod reminder;
pub mod scheduler;

pub use reminder::{AdHocMessage, DispatchReport, ReminderService};
pub use scheduler::ReminderScheduler;
