pub mod job;

pub use job::{Job, JobFilter, JobStore, JobStoreError, JobUpdate, NewJob};
