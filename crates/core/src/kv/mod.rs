mod error;
mod traits;

pub use error::{KvError, Result};
pub use traits::KeyValueStore;
