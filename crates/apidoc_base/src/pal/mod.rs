/* 📖 # What is the Platform Abstraction Layer?

The PAL provides a trait-based abstraction over the filesystem operations the publisher needs:
reading the previously published document and snapshot, and writing the new ones.
MockPal keeps them in memory so merge runs can be tested deterministically.
*/

mod file_path;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};
