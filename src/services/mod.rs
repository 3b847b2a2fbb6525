//! Service layer: document synchronization, raw-data retrieval and
//! inspection location extraction. The CLI is a thin shell over these.

pub mod location;
pub mod raw_data;
pub mod sync;

pub use location::{Gazetteer, LocationExtractor};
pub use raw_data::{fetch_raw_data, RAW_DATA_FILENAME};
pub use sync::{DocumentSynchronizer, SyncEvent, SyncMode, SyncPlan};
