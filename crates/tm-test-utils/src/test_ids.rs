//! Fixed test IDs for deterministic tests
//!
//! Public uids are v4-shaped so they pass the same parsing as real ones.

use uuid::Uuid;

// Users
pub const TEST_USER_ALICE: Uuid = Uuid::from_u128(0x3f2504e0_4f89_41d3_9a0c_0305e82c3301);
pub const TEST_USER_BOB: Uuid = Uuid::from_u128(0x6a2f41a3_c54c_4ce8_92d2_0324e1c32e22);

/// A uid that never exists in any table.
pub const TEST_UNKNOWN_UID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_0000000000ff);

/// Identity provider prefix used in token subjects.
pub const TEST_PROVIDER: &str = "auth0";

/// Audience the test server expects.
pub const TEST_AUDIENCE: &str = "http://trades-management.test";

/// A gateway method ARN for authorizer tests.
pub const TEST_METHOD_ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:abcdef1234/v1/GET/brokers";

/// Subject of a token issued for `user`.
pub fn subject_for(user: Uuid) -> String {
    format!("{TEST_PROVIDER}|{user}")
}
