//! FileSystem abstraction for testable checkout inspection

mod confined;
mod mock;
mod real;
mod r#trait;

pub use confined::ConfinedFileSystem;
pub use mock::MockFileSystem;
pub use r#trait::{DirEntry, FileSystem, FileType};
pub use real::RealFileSystem;
