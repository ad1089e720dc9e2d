//! Shared status and priority enums.
//!
//! Statuses persist as lowercase strings; the strum derives keep the wire,
//! database, and in-memory representations in lockstep.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::errors::ServiceError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Allowed forward transitions; completed and cancelled are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(next, Processing | Completed | Cancelled),
            Processing => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductionOrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ProductionOrderStatus {
    pub fn can_transition_to(self, next: ProductionOrderStatus) -> bool {
        use ProductionOrderStatus::*;
        match self {
            Pending => matches!(next, InProgress | Cancelled),
            InProgress => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductionPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkCenterStatus {
    Active,
    Inactive,
    Maintenance,
}

/// Why a product was flagged by the inventory sufficiency check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShortfallReason {
    /// The order alone exceeds the units on hand.
    InsufficientStock,
    /// The order can be filled but would leave stock under the minimum level.
    BelowMinimum,
}

/// Parses a stored status string, mapping failures to `InvalidStatus`.
pub fn parse_status<T>(raw: &str) -> Result<T, ServiceError>
where
    T: std::str::FromStr,
{
    raw.parse::<T>()
        .map_err(|_| ServiceError::InvalidStatus(format!("Unknown status: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_strings() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(
            "pending".parse::<OrderStatus>().unwrap(),
            OrderStatus::Pending
        );
        assert_eq!(ProductionOrderStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            "in_progress".parse::<ProductionOrderStatus>().unwrap(),
            ProductionOrderStatus::InProgress
        );
        assert_eq!(ShortfallReason::BelowMinimum.to_string(), "below_minimum");
        assert_eq!(WorkCenterStatus::Active.to_string(), "active");
    }

    #[test]
    fn parse_status_rejects_unknown_values() {
        let err = parse_status::<OrderStatus>("shipped-ish").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatus(_)));
    }

    #[test]
    fn order_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn production_order_status_transitions() {
        assert!(ProductionOrderStatus::Pending.can_transition_to(ProductionOrderStatus::InProgress));
        assert!(
            ProductionOrderStatus::InProgress.can_transition_to(ProductionOrderStatus::Completed)
        );
        assert!(!ProductionOrderStatus::Pending.can_transition_to(ProductionOrderStatus::Completed));
        assert!(
            !ProductionOrderStatus::Completed.can_transition_to(ProductionOrderStatus::InProgress)
        );
    }
}
