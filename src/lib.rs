// sptm: sentence topic transitions and intertopic distances
//
// This is the library root. Input tables are parsed in `table`, the
// analyses live in `topics`, and `pipeline` ties them to files on disk.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod table;
pub mod topics;

pub use error::{Result, SptmError};
