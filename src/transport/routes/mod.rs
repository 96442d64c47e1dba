pub mod files;
pub mod info;
pub mod sessions;
pub mod stream;
