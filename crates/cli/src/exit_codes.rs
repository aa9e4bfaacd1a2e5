//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 1       | Universal  | General error (unspecified)              |
//! | 2       | Universal  | CLI usage error (bad args, missing file) |
//! | 4-9     | validate   | Dataset validation codes                 |
//! | 10-19   | ai         | AI provider/keychain/relay-shape codes   |
//! | 20-29   | relay      | Relay transport codes                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Validate (4-9)
// =============================================================================

/// Validation issues were found in the loaded dataset.
/// Like `diff(1)`, a non-zero code here means "the data has findings,"
/// not "the tool failed."
pub const EXIT_VALIDATION_ISSUES: u8 = 4;

// =============================================================================
// AI (10-19)
// =============================================================================

/// AI disabled (provider=none) — not an error, just informational.
pub const EXIT_AI_DISABLED: u8 = 10;

/// AI provider configured but API key missing.
pub const EXIT_AI_MISSING_KEY: u8 = 11;

/// Keychain error (cannot read/write credentials).
pub const EXIT_AI_KEYCHAIN_ERR: u8 = 12;

/// Relay replied, but the reply did not parse as the expected JSON
/// (rule conversion, recommendations, issue lists).
pub const EXIT_AI_BAD_REPLY: u8 = 13;

// =============================================================================
// Relay transport (20-29)
// =============================================================================

/// Network failure or HTTP error talking to the relay provider.
pub const EXIT_RELAY_NETWORK: u8 = 20;
