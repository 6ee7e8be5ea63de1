pub mod ordering;
pub mod store;

pub use ordering::{check_newer, OutOfOrder};
pub use store::{StoreError, WeatherStore};
