pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoDb;
pub use memory::InMemoryProductStore;
pub use self::metrics::{get_metrics, init_metrics};
pub use store::{ProductStore, StoreError};
