pub mod amp;
pub mod engine;
pub mod error;
pub mod events;
pub mod fee;
pub mod governance;
pub mod ledger;
pub mod math;
pub mod state;

pub use engine::PoolEngine;
pub use error::PoolError;
pub use events::PoolEvent;
pub use ledger::AssetLedger;
pub use state::{PoolConfig, PoolState};
