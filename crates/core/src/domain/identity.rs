use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

/// Role granted to the authenticated user by the (out-of-scope) auth layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Farmer,
    Admin,
}

/// Identity of the caller as established upstream. The engine trusts the
/// role claim and only checks it against what each operation requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self { user_id: UserId(user_id.into()), role }
    }

    pub fn customer(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Customer)
    }

    pub fn farmer(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Farmer)
    }
}
