pub mod model;
pub mod weight;
pub mod store;
pub mod resolve;
