pub mod cfs_submission;
pub mod event;
pub mod meeting;
