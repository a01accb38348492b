pub mod catalog;
pub mod init;
pub mod run;
