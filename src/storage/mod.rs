//!  Writings are organized through [writing_storage::WritingStorageImpl].
//!  The basic idea is:
//!   - There is a directory with all the writings.
//!   - Every writing is a plain UTF-8 file named after its number, `1.txt`, `2.txt`, ...
//!   - Numbers only grow. A new writing takes the highest number found in the directory plus
//!     one. Files are never changed or removed once written.

pub mod entities;
pub mod writing_storage;
