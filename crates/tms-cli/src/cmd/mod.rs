pub mod archive;
pub mod init;
pub mod stale;
pub mod status;
pub mod tier;
pub mod validate;
