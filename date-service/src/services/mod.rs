pub mod database;
pub mod memory;
pub mod metrics;
pub mod records;
pub mod store;

pub use database::{MongoDateStore, MongoDb};
pub use memory::InMemoryDateStore;
pub use metrics::{get_metrics, init_metrics};
pub use records::DateRecordStore;
pub use store::DateStore;
