mod error;
mod json_file;
mod memory;
mod state;
mod traits;

pub mod conformance;

pub use error::StorageError;
pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use state::Collection;
pub use traits::{HrStorage, TicketFilter};
