pub mod base;
pub mod logging;
pub mod playback;
pub mod segmenter;
pub mod server;
pub mod storage;

pub use base::*;
pub use logging::*;
pub use playback::*;
pub use segmenter::*;
pub use server::*;
pub use storage::*;
