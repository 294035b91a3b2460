//! Pallet crowdsourcing models
//!
//! A wine ships only once enough bottles are pre-ordered to fill a pallet.
//! Each pallet tracks a cumulative bottle counter against its target; orders
//! add to the oldest filling pallet and spill over into new pallets.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A shipping pallet being filled by pre-orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Pallet {
    pub id: Uuid,
    pub wine_id: Uuid,
    pub target_bottles: i32,
    pub current_bottles: i32,
    pub status: PalletStatus,
    pub estimated_shipping_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a pallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(
    feature = "sqlx",
    derive(sqlx::Type),
    sqlx(type_name = "VARCHAR", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PalletStatus {
    #[default]
    Filling,
    Full,
    Shipping,
    Shipped,
    Cancelled,
}

impl PalletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PalletStatus::Filling => "filling",
            PalletStatus::Full => "full",
            PalletStatus::Shipping => "shipping",
            PalletStatus::Shipped => "shipped",
            PalletStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "filling" => Some(PalletStatus::Filling),
            "full" => Some(PalletStatus::Full),
            "shipping" => Some(PalletStatus::Shipping),
            "shipped" => Some(PalletStatus::Shipped),
            "cancelled" => Some(PalletStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether the pallet still counts against a wine's pallet limit
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            PalletStatus::Filling | PalletStatus::Full | PalletStatus::Shipping
        )
    }

    /// Check a status change. Filling pallets only become full once the
    /// counter reaches the target; shipment requires a full pallet.
    pub fn can_transition_to(&self, next: PalletStatus, current: i32, target: i32) -> bool {
        match (self, next) {
            (PalletStatus::Filling, PalletStatus::Full) => is_full(current, target),
            (PalletStatus::Filling, PalletStatus::Cancelled) => true,
            (PalletStatus::Full, PalletStatus::Shipping) => true,
            (PalletStatus::Full, PalletStatus::Cancelled) => true,
            (PalletStatus::Shipping, PalletStatus::Shipped) => true,
            _ => false,
        }
    }

    /// Badge text shown next to the progress bar
    pub fn label(&self) -> &'static str {
        match self {
            PalletStatus::Filling => "Filling Pallet",
            PalletStatus::Full => "Pallet Full",
            PalletStatus::Shipping => "Shipping",
            PalletStatus::Shipped => "Shipped",
            PalletStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for PalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from pallet bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PalletError {
    #[error("Quantity must be at least one bottle, got {0}")]
    InvalidQuantity(i32),

    #[error("Pallet target must be at least one bottle, got {0}")]
    InvalidTarget(i32),

    #[error("Wine allows at most {max_pallets} open pallets; {requested} bottles do not fit")]
    CapacityExceeded { max_pallets: i32, requested: i32 },

    #[error("Cannot change pallet status from {from} to {to}")]
    InvalidTransition {
        from: PalletStatus,
        to: PalletStatus,
    },
}

/// Fill percentage rounded to the nearest whole percent (halves round up).
/// A non-positive target reports 0.
pub fn fill_percentage(current: i32, target: i32) -> i32 {
    if target <= 0 || current <= 0 {
        return 0;
    }
    let current = current as i64;
    let target = target as i64;
    ((current * 200 + target) / (target * 2)) as i32
}

/// Bottles still needed before the pallet is full
pub fn remaining_bottles(current: i32, target: i32) -> i32 {
    (target - current).max(0)
}

/// Whether the counter has reached the target
pub fn is_full(current: i32, target: i32) -> bool {
    target > 0 && current >= target
}

/// Pallet progress as presented to the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletProgress {
    pub pallet_id: Uuid,
    pub wine_id: Uuid,
    pub current_bottles: i32,
    pub target_bottles: i32,
    pub fill_percentage: i32,
    pub remaining_bottles: i32,
    pub status: PalletStatus,
    pub estimated_shipping: Option<NaiveDate>,
}

impl Pallet {
    pub fn progress(&self) -> PalletProgress {
        PalletProgress {
            pallet_id: self.id,
            wine_id: self.wine_id,
            current_bottles: self.current_bottles,
            target_bottles: self.target_bottles,
            fill_percentage: fill_percentage(self.current_bottles, self.target_bottles),
            remaining_bottles: remaining_bottles(self.current_bottles, self.target_bottles),
            status: self.status,
            estimated_shipping: self.estimated_shipping_date,
        }
    }

    pub fn is_full(&self) -> bool {
        is_full(self.current_bottles, self.target_bottles)
    }
}

/// Snapshot of a filling pallet used to plan an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenPallet {
    pub id: Uuid,
    pub current_bottles: i32,
    pub target_bottles: i32,
}

/// Where a share of an order's bottles goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationSlot {
    Existing(Uuid),
    /// A pallet to open with the given target
    New { target_bottles: i32 },
}

/// One share of an order's bottles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub slot: AllocationSlot,
    pub bottles: i32,
    /// Counter value after the bottles are added
    pub resulting_bottles: i32,
    /// True when this share completes the pallet
    pub fills_pallet: bool,
}

/// Split `quantity` bottles over the open pallets (oldest first), opening new
/// pallets of `new_pallet_target` bottles for the remainder.
///
/// `live_pallets` is the number of pallets that already count against
/// `max_pallets`; opening a pallet beyond that limit fails the whole plan.
pub fn plan_allocation(
    open_pallets: &[OpenPallet],
    quantity: i32,
    new_pallet_target: i32,
    live_pallets: i32,
    max_pallets: i32,
) -> Result<Vec<Allocation>, PalletError> {
    if quantity <= 0 {
        return Err(PalletError::InvalidQuantity(quantity));
    }
    if new_pallet_target <= 0 {
        return Err(PalletError::InvalidTarget(new_pallet_target));
    }

    let mut remaining = quantity;
    let mut plan = Vec::new();

    for pallet in open_pallets {
        if remaining == 0 {
            break;
        }
        let room = remaining_bottles(pallet.current_bottles, pallet.target_bottles);
        if room == 0 {
            continue;
        }
        let bottles = room.min(remaining);
        let resulting = pallet.current_bottles + bottles;
        plan.push(Allocation {
            slot: AllocationSlot::Existing(pallet.id),
            bottles,
            resulting_bottles: resulting,
            fills_pallet: is_full(resulting, pallet.target_bottles),
        });
        remaining -= bottles;
    }

    let mut opened = 0;
    while remaining > 0 {
        if live_pallets + opened >= max_pallets {
            return Err(PalletError::CapacityExceeded {
                max_pallets,
                requested: quantity,
            });
        }
        let bottles = new_pallet_target.min(remaining);
        plan.push(Allocation {
            slot: AllocationSlot::New {
                target_bottles: new_pallet_target,
            },
            bottles,
            resulting_bottles: bottles,
            fills_pallet: is_full(bottles, new_pallet_target),
        });
        remaining -= bottles;
        opened += 1;
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_percentage_rounds_half_up() {
        assert_eq!(fill_percentage(12, 48), 25);
        assert_eq!(fill_percentage(8, 56), 14);
        assert_eq!(fill_percentage(1, 8), 13);
        assert_eq!(fill_percentage(56, 56), 100);
        assert_eq!(fill_percentage(0, 56), 0);
    }

    #[test]
    fn test_fill_percentage_zero_target() {
        assert_eq!(fill_percentage(10, 0), 0);
    }

    #[test]
    fn test_remaining_bottles_never_negative() {
        assert_eq!(remaining_bottles(12, 48), 36);
        assert_eq!(remaining_bottles(60, 56), 0);
    }

    #[test]
    fn test_transition_to_full_requires_full_counter() {
        assert!(!PalletStatus::Filling.can_transition_to(PalletStatus::Full, 55, 56));
        assert!(PalletStatus::Filling.can_transition_to(PalletStatus::Full, 56, 56));
    }

    #[test]
    fn test_shipping_requires_full_pallet() {
        assert!(!PalletStatus::Filling.can_transition_to(PalletStatus::Shipping, 56, 56));
        assert!(PalletStatus::Full.can_transition_to(PalletStatus::Shipping, 56, 56));
        assert!(PalletStatus::Shipping.can_transition_to(PalletStatus::Shipped, 56, 56));
        assert!(!PalletStatus::Shipped.can_transition_to(PalletStatus::Filling, 0, 56));
    }

    #[test]
    fn test_plan_fills_oldest_pallet_first() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let open = [
            OpenPallet { id: first, current_bottles: 50, target_bottles: 56 },
            OpenPallet { id: second, current_bottles: 0, target_bottles: 56 },
        ];

        let plan = plan_allocation(&open, 10, 56, 2, 10).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].slot, AllocationSlot::Existing(first));
        assert_eq!(plan[0].bottles, 6);
        assert!(plan[0].fills_pallet);
        assert_eq!(plan[1].slot, AllocationSlot::Existing(second));
        assert_eq!(plan[1].bottles, 4);
        assert_eq!(plan[1].resulting_bottles, 4);
    }

    #[test]
    fn test_plan_opens_new_pallets_for_overflow() {
        let plan = plan_allocation(&[], 120, 56, 0, 10).unwrap();
        let bottles: Vec<i32> = plan.iter().map(|a| a.bottles).collect();
        assert_eq!(bottles, vec![56, 56, 8]);
        assert!(plan[0].fills_pallet && plan[1].fills_pallet && !plan[2].fills_pallet);
    }

    #[test]
    fn test_plan_respects_pallet_limit() {
        let err = plan_allocation(&[], 60, 56, 0, 1).unwrap_err();
        assert_eq!(
            err,
            PalletError::CapacityExceeded { max_pallets: 1, requested: 60 }
        );
    }

    #[test]
    fn test_plan_rejects_non_positive_quantity() {
        assert_eq!(
            plan_allocation(&[], 0, 56, 0, 10).unwrap_err(),
            PalletError::InvalidQuantity(0)
        );
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            PalletStatus::Filling,
            PalletStatus::Full,
            PalletStatus::Shipping,
            PalletStatus::Shipped,
            PalletStatus::Cancelled,
        ] {
            assert_eq!(PalletStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PalletStatus::from_str("lost"), None);
    }
}
