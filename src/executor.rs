pub mod dispatch;
pub mod job;
