use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Decides which redemption actions an account may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Partner shop scanning beneficiary codes
    Shop,
    Staff,
    Admin,
}

impl Role {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            Shop => "shop",
            Staff => "staff",
            Admin => "admin",
        }
    }

    /// `None` for unknown codes; stored data is not trusted blindly.
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use Role::*;
        match code {
            "shop" => Some(Shop),
            "staff" => Some(Staff),
            "admin" => Some(Admin),
            _ => None,
        }
    }

    /// Shops and staff redeem codes.
    #[inline]
    pub const fn can_redeem(&self) -> bool {
        matches!(self, Role::Shop | Role::Staff)
    }

    /// Staff and admins issue codes.
    #[inline]
    pub const fn can_issue(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
