pub mod builders;
pub mod error;
pub mod metrics;
pub mod reconcile;
pub mod roster;
pub mod schema;
pub mod session;
pub mod store;
