//! Record persistence. Only a simulated backend exists; the trait is the seam
//! the form session talks to.

mod simulated;
mod traits;

pub use simulated::{SimulatedStore, DEFAULT_DELAY_MS};
pub use traits::{PersistRequest, RecordStoreTrait};

#[cfg(test)]
pub use traits::MockRecordStoreTrait;
