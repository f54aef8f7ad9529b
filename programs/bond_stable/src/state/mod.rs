//! State structures for the stablecoin and its liquidation auctions

pub mod auction;
pub mod bidder;
pub mod board;
pub mod claim;
pub mod config;
pub mod lambda;
pub mod pool;

pub use auction::*;
pub use bidder::*;
pub use board::*;
pub use claim::*;
pub use config::*;
pub use lambda::*;
pub use pool::*;
