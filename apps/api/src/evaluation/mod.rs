// Resume evaluation: single upload and paced batch scoring.
// All scorer calls go through the ResumeScorer trait; nothing here spawns a process.

pub mod batch;
pub mod form;
pub mod handlers;
pub mod single;
