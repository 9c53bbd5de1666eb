//! Global constants used across the trading core.
//!
//! System-wide values that are not configurable and are used across
//! multiple modules.

// ============================================================================
// SOLANA BLOCKCHAIN CONSTANTS
// ============================================================================

/// SOL token mint address (wrapped SOL / WSOL).
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Base units per SOL (§ GLOSSARY: "lamports; 10^9 per SOL").
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// BIP39 word counts the Secure Wallet Store accepts (§4.1).
pub const VALID_MNEMONIC_WORD_COUNTS: &[usize] = &[12, 24];
