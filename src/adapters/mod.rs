pub mod smtp;
pub mod storage;
