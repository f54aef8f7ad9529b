//! Instruction handlers for the stablecoin protocol
//!
//! Admin:
//! - `initialize` - Set up config, lambda ledger, stablecoin mint and vaults
//! - `update_config` - Change tunables or pause
//! - `register_claim` - Make a bond token lockable
//!
//! Minting:
//! - `lock` / `unlock` - Mint against or redeem collateral
//! - `return_locked_pool` - True up pools after a generation settles
//!
//! Auction:
//! - `start_auction` - Open a round (maturity, emergency or restart)
//! - `bid` / `reveal` - Sealed-bid commit and reveal
//! - `sort_price` / `compute_end_info` - Fix the clearing point
//! - `bill` - Per-bidder settlement
//! - `close_auction` - Restart or finalize
//! - `claim_unrevealed` - Refund a never-revealed bid

pub mod bid;
pub mod bill;
pub mod claim_unrevealed;
pub mod close_auction;
pub mod compute_end_info;
pub mod initialize;
pub mod lock;
pub mod register_claim;
pub mod return_locked_pool;
pub mod reveal;
pub mod sort_price;
pub mod start_auction;
pub mod unlock;
pub mod update_config;

pub use bid::*;
pub use bill::*;
pub use claim_unrevealed::*;
pub use close_auction::*;
pub use compute_end_info::*;
pub use initialize::*;
pub use lock::*;
pub use register_claim::*;
pub use return_locked_pool::*;
pub use reveal::*;
pub use sort_price::*;
pub use start_auction::*;
pub use unlock::*;
pub use update_config::*;
