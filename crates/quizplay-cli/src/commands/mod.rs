pub mod init;
pub mod play;
pub mod result;
pub mod validate;
