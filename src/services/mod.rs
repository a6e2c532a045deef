pub mod remote_store;
pub mod replace;
pub mod staging;
pub mod sync_job;
