pub mod mail;
pub mod submission;
