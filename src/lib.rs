#![allow(clippy::too_many_arguments)]

//! A multi-tenant, autonomous Solana trading agent core.
//!
//! Every tenant gets a custodial wallet (`wallet`), shared cached reads of
//! chain state (`balance`, `price`), a pluggable opportunity pipeline
//! (`strategy` → `ranker`), a single serialized execution path
//! (`trade`), durable trade history (`ledger`), and a scan/trade cycle
//! driven by the `scheduler`. `api` composes those into the surface a host
//! application calls; `main.rs` is the composition root that wires
//! concrete implementations together and runs the scheduler as a service.

pub mod api;
pub mod balance;
pub mod cache;
pub mod config;
pub mod constants;
pub mod core;
pub mod ledger;
pub mod logger;
pub mod notifier;
pub mod paths;
pub mod persistence;
pub mod price;
pub mod ranker;
pub mod rpc;
pub mod scheduler;
pub mod secure_storage;
pub mod strategy;
pub mod trade;
pub mod wallet;
