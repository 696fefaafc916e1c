pub mod serve;
pub mod task;
