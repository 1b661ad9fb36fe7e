//! Command Handlers module
//!
//! Handlers that orchestrate business operations over the stores.

mod commands;
mod transfer_handler;

#[cfg(test)]
mod tests;

pub use commands::*;
pub use transfer_handler::TransferHandler;
