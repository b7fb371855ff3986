/* 📖 # Why have apidoc_base as a separate library?
apidoc_base provides the error type, tracing setup and the platform abstraction layer
used by the engine and the binary. Keeping them here lets the engine be tested against
an in-memory filesystem without depending on the binary crate.
*/

pub mod error;
mod error_tests;
pub mod pal;
pub mod tracing;

pub use error::{ApidocError, ApidocResult, ErrorKind, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
