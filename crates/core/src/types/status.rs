//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Review status of a sell request.
///
/// ```text
/// submitted ──► reviewed ──► approved ──► completed
///     │             │
///     │             └──► rejected
///     ├──► approved
///     └──► rejected
/// ```
///
/// `rejected` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "sell_request_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SellRequestStatus {
    /// Freshly submitted by a seller, not yet looked at.
    #[default]
    Submitted,
    /// An admin has looked at it and is following up.
    Reviewed,
    /// The platform will buy the item.
    Approved,
    /// The platform declined.
    Rejected,
    /// Pickup and payout are done.
    Completed,
}

impl SellRequestStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Submitted,
        Self::Reviewed,
        Self::Approved,
        Self::Rejected,
        Self::Completed,
    ];

    /// Whether an admin may move a request from `self` to `next`.
    ///
    /// Re-applying the current status is always allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Submitted, Self::Submitted)
                | (Self::Reviewed, Self::Reviewed)
                | (Self::Approved, Self::Approved)
                | (Self::Rejected, Self::Rejected)
                | (Self::Completed, Self::Completed)
                | (
                    Self::Submitted,
                    Self::Reviewed | Self::Approved | Self::Rejected
                )
                | (Self::Reviewed, Self::Approved | Self::Rejected)
                | (Self::Approved, Self::Completed)
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Reviewed => "reviewed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SellRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SellRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid sell request status: {s}"))
    }
}

/// Role carried by an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    Customer,
    /// Staff with access to the sell-request back office.
    Admin,
}

impl UserRole {
    /// Whether this role may use administrator-only operations.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}
