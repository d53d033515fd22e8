pub mod contract;
pub mod msg;
pub mod state;

mod error;

pub use crate::error::ContractError;
