pub mod format;
pub mod router;

pub use router::{CommandRouter, Reply};
