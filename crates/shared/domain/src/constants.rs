//! Domain-level constants.
//!
//! These constants define business rules and the messages surfaced when
//! they are violated.

// =============================================================================
// Credentials
// =============================================================================

/// Returned when a supplied password does not match the stored digest
pub const INCORRECT_PASSWORD: &str = "incorrect password";

/// Returned when a new password and its confirmation differ
pub const PASSWORDS_DO_NOT_MATCH: &str = "passwords do not match";

/// Returned when a new password is supplied without its confirmation
pub const NEW_PASSWORD_CONFIRMATION_REQUIRED: &str = "new password confirmation must be provided";

// =============================================================================
// Password hashing (Argon2id)
// =============================================================================

/// Default Argon2 memory cost in KiB
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19 * 1024;

/// Default Argon2 iteration count
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;

/// Default Argon2 degree of parallelism
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;
