//! Shared Balance Oracle (C2, §4.2): cached, rate-gated chain balance reads
//! shared by every tenant and by the scheduler's funding gate.

pub mod oracle;
pub mod reader;

pub use oracle::BalanceOracle;
pub use reader::{ChainBalanceReader, SolanaRpcBalanceReader};
