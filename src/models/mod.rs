pub mod application;
pub mod lease;
pub mod location;
pub mod manager;
pub mod payment;
pub mod property;
pub mod tenant;

pub use application::{Application, ApplicationStatus};
pub use lease::Lease;
pub use location::{Coordinates, LocationSummary};
pub use manager::Manager;
pub use payment::{Payment, PaymentStatus};
pub use property::{Property, PropertyType, PropertyWithLocation};
pub use tenant::Tenant;
