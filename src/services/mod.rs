pub mod geocoding;
pub mod storage;

pub use geocoding::Geocoder;
pub use storage::PhotoStorage;
