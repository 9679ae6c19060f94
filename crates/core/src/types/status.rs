//! Roles and server-defined status enums.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Account role as issued by the remote service at login.
///
/// The storefront only knows two roles; the branch a view renders is picked
/// from this value (see [`crate::Viewer`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses products, manages a cart, places orders.
    Customer,
    /// Lists, edits and deletes their own products.
    Seller,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Order status.
///
/// The set is owned by the remote service; values this client does not know
/// deserialize as `Unknown` instead of failing the whole order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Customer, Role::Seller] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert_eq!(" Seller ".parse::<Role>(), Ok(Role::Seller));
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Seller).expect("serialize"), "\"seller\"");
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn test_unknown_order_status_tolerated() {
        let status: OrderStatus = serde_json::from_str("\"refunded\"").expect("tolerated");
        assert_eq!(status, OrderStatus::Unknown);

        let status: OrderStatus = serde_json::from_str("\"completed\"").expect("known");
        assert_eq!(status, OrderStatus::Completed);
        assert_eq!(status.to_string(), "completed");
    }

    #[test]
    fn test_payment_status() {
        let status: PaymentStatus = serde_json::from_str("\"success\"").expect("known");
        assert_eq!(status, PaymentStatus::Success);
    }
}
