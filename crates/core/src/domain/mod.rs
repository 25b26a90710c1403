pub mod contract;
pub mod profile;
pub mod recommendation;
pub mod transaction;
