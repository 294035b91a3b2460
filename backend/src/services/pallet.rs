//! Pallet service: fill tracking and bottle allocation
//!
//! Bottles are added under row locks: the wine row serialises allocations for
//! the same wine and the filling pallets are locked while their counters move.
//! A checkout spanning several wines locks all of them up front in id order.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{
    plan_allocation, validate_pallet_counter, AllocationSlot, OpenPallet, Pallet, PalletError,
    PalletProgress, PalletStatus,
};

/// Pallet service
#[derive(Clone)]
pub struct PalletService {
    db: PgPool,
}

/// Input for creating a pallet
#[derive(Debug, Default, Deserialize)]
pub struct CreatePalletInput {
    pub wine_id: Option<Uuid>,
    pub target_bottles: Option<i32>,
    pub current_bottles: Option<i32>,
    pub status: Option<String>,
    pub estimated_shipping_date: Option<NaiveDate>,
}

/// Values written for a new pallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPallet {
    pub wine_id: Uuid,
    pub target_bottles: i32,
    pub current_bottles: i32,
    pub status: PalletStatus,
    pub estimated_shipping_date: Option<NaiveDate>,
}

impl CreatePalletInput {
    pub fn into_new(self, default_target: i32) -> AppResult<NewPallet> {
        let wine_id = self
            .wine_id
            .ok_or_else(|| AppError::field("wine_id", "Wine ID is required"))?;

        let target_bottles = self.target_bottles.unwrap_or(default_target);
        let current_bottles = self.current_bottles.unwrap_or(0);
        validate_pallet_counter(current_bottles, target_bottles)
            .map_err(|m| AppError::field("current_bottles", m))?;

        let status = match self.status.as_deref() {
            None | Some("") => PalletStatus::Filling,
            Some(s) => PalletStatus::from_str(s)
                .ok_or_else(|| AppError::field("status", "Unknown pallet status"))?,
        };

        Ok(NewPallet {
            wine_id,
            target_bottles,
            current_bottles,
            status,
            estimated_shipping_date: self.estimated_shipping_date,
        })
    }
}

/// Input for changing a pallet's status
#[derive(Debug, Deserialize)]
pub struct UpdatePalletStatusInput {
    pub status: String,
    pub estimated_shipping_date: Option<NaiveDate>,
}

/// Distinct wine ids in the order their rows are locked
pub fn wine_lock_order(wine_ids: &[Uuid]) -> Vec<Uuid> {
    let mut ids = wine_ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

/// Pallet settings of a wine, read under lock during allocation
#[derive(Debug, sqlx::FromRow)]
struct WinePalletSettings {
    bottles_per_pallet: i32,
    max_pallet_orders: i32,
}

impl PalletService {
    /// Create a new PalletService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a pallet for a wine
    pub async fn create_pallet(
        &self,
        input: CreatePalletInput,
        default_target: i32,
    ) -> AppResult<Pallet> {
        let new = input.into_new(default_target)?;

        let wine_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM wines WHERE id = $1)")
                .bind(new.wine_id)
                .fetch_one(&self.db)
                .await?;
        if !wine_exists {
            return Err(AppError::NotFound("Wine".to_string()));
        }

        let pallet = sqlx::query_as::<_, Pallet>(
            r#"
            INSERT INTO pallets (wine_id, target_bottles, current_bottles, status, estimated_shipping_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.wine_id)
        .bind(new.target_bottles)
        .bind(new.current_bottles)
        .bind(new.status)
        .bind(new.estimated_shipping_date)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Pallet {} created for wine {} ({} bottles)",
            pallet.id,
            pallet.wine_id,
            pallet.target_bottles
        );
        Ok(pallet)
    }

    /// Pallets newest first, optionally for one wine
    pub async fn list_pallets(&self, wine_id: Option<Uuid>) -> AppResult<Vec<Pallet>> {
        let pallets = sqlx::query_as::<_, Pallet>(
            r#"
            SELECT * FROM pallets
            WHERE ($1::uuid IS NULL OR wine_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(wine_id)
        .fetch_all(&self.db)
        .await?;

        Ok(pallets)
    }

    /// Progress of the oldest filling pallet of a wine
    pub async fn get_wine_pallet_status(&self, wine_id: Uuid) -> AppResult<Option<PalletProgress>> {
        let pallet = sqlx::query_as::<_, Pallet>(
            r#"
            SELECT * FROM pallets
            WHERE wine_id = $1 AND status = 'filling'
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(wine_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(pallet.map(|p| p.progress()))
    }

    /// Move a pallet along its lifecycle
    #[instrument(skip(self, input), fields(status = %input.status))]
    pub async fn update_pallet_status(
        &self,
        pallet_id: Uuid,
        input: UpdatePalletStatusInput,
    ) -> AppResult<Pallet> {
        let next = PalletStatus::from_str(&input.status)
            .ok_or_else(|| AppError::field("status", "Unknown pallet status"))?;

        let mut tx = self.db.begin().await?;

        let pallet = sqlx::query_as::<_, Pallet>("SELECT * FROM pallets WHERE id = $1 FOR UPDATE")
            .bind(pallet_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Pallet".to_string()))?;

        if !pallet
            .status
            .can_transition_to(next, pallet.current_bottles, pallet.target_bottles)
        {
            return Err(PalletError::InvalidTransition {
                from: pallet.status,
                to: next,
            }
            .into());
        }

        let updated = sqlx::query_as::<_, Pallet>(
            r#"
            UPDATE pallets
            SET status = $2,
                estimated_shipping_date = COALESCE($3, estimated_shipping_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(pallet_id)
        .bind(next)
        .bind(input.estimated_shipping_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Pallet {} moved from {} to {}", pallet_id, pallet.status, next);
        Ok(updated)
    }

    /// Lock the rows of every wine a checkout touches, lowest id first.
    /// Must run before `add_bottles` for any of them.
    #[instrument(skip(conn))]
    pub async fn lock_wines(conn: &mut PgConnection, wine_ids: &[Uuid]) -> AppResult<()> {
        let ids = wine_lock_order(wine_ids);
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM wines WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        if locked.len() != ids.len() {
            return Err(AppError::NotFound("Wine".to_string()));
        }
        Ok(())
    }

    /// Add an order's bottles to a wine's pallets inside the caller's
    /// transaction. Returns the touched pallets in allocation order.
    #[instrument(skip(conn))]
    pub async fn add_bottles(
        conn: &mut PgConnection,
        wine_id: Uuid,
        quantity: i32,
    ) -> AppResult<Vec<Pallet>> {
        let settings = sqlx::query_as::<_, WinePalletSettings>(
            "SELECT bottles_per_pallet, max_pallet_orders FROM wines WHERE id = $1 FOR UPDATE",
        )
        .bind(wine_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Wine".to_string()))?;

        let filling = sqlx::query_as::<_, Pallet>(
            r#"
            SELECT * FROM pallets
            WHERE wine_id = $1 AND status = 'filling'
            ORDER BY created_at ASC, id ASC
            FOR UPDATE
            "#,
        )
        .bind(wine_id)
        .fetch_all(&mut *conn)
        .await?;

        let live_pallets = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM pallets
            WHERE wine_id = $1 AND status IN ('filling', 'full', 'shipping')
            "#,
        )
        .bind(wine_id)
        .fetch_one(&mut *conn)
        .await?;

        let open: Vec<OpenPallet> = filling
            .iter()
            .map(|p| OpenPallet {
                id: p.id,
                current_bottles: p.current_bottles,
                target_bottles: p.target_bottles,
            })
            .collect();

        let plan = plan_allocation(
            &open,
            quantity,
            settings.bottles_per_pallet,
            i32::try_from(live_pallets).unwrap_or(i32::MAX),
            settings.max_pallet_orders,
        )?;

        let mut touched = Vec::with_capacity(plan.len());
        for allocation in plan {
            let status = if allocation.fills_pallet {
                PalletStatus::Full
            } else {
                PalletStatus::Filling
            };

            let pallet = match allocation.slot {
                AllocationSlot::Existing(pallet_id) => {
                    sqlx::query_as::<_, Pallet>(
                        r#"
                        UPDATE pallets
                        SET current_bottles = $2, status = $3, updated_at = NOW()
                        WHERE id = $1
                        RETURNING *
                        "#,
                    )
                    .bind(pallet_id)
                    .bind(allocation.resulting_bottles)
                    .bind(status)
                    .fetch_one(&mut *conn)
                    .await?
                }
                AllocationSlot::New { target_bottles } => {
                    sqlx::query_as::<_, Pallet>(
                        r#"
                        INSERT INTO pallets (wine_id, target_bottles, current_bottles, status)
                        VALUES ($1, $2, $3, $4)
                        RETURNING *
                        "#,
                    )
                    .bind(wine_id)
                    .bind(target_bottles)
                    .bind(allocation.resulting_bottles)
                    .bind(status)
                    .fetch_one(&mut *conn)
                    .await?
                }
            };

            if pallet.is_full() {
                tracing::info!("Pallet {} for wine {} is full", pallet.id, wine_id);
            }
            touched.push(pallet);
        }

        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pallet_defaults() {
        let wine_id = Uuid::new_v4();
        let new = CreatePalletInput {
            wine_id: Some(wine_id),
            ..Default::default()
        }
        .into_new(56)
        .unwrap();

        assert_eq!(
            new,
            NewPallet {
                wine_id,
                target_bottles: 56,
                current_bottles: 0,
                status: PalletStatus::Filling,
                estimated_shipping_date: None,
            }
        );
    }

    #[test]
    fn test_pallet_requires_wine() {
        let err = CreatePalletInput::default().into_new(56).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { ref message, .. } if message == "Wine ID is required"
        ));
    }

    #[test]
    fn test_pallet_counter_cannot_exceed_target() {
        let err = CreatePalletInput {
            wine_id: Some(Uuid::new_v4()),
            target_bottles: Some(56),
            current_bottles: Some(60),
            ..Default::default()
        }
        .into_new(56)
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_pallet_rejects_unknown_status() {
        let err = CreatePalletInput {
            wine_id: Some(Uuid::new_v4()),
            status: Some("lost".to_string()),
            ..Default::default()
        }
        .into_new(56)
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "status"));
    }

    #[test]
    fn test_wine_lock_order_is_independent_of_cart_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let forward = wine_lock_order(&[a, b, a]);
        let backward = wine_lock_order(&[b, a]);

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
        assert!(forward[0] < forward[1]);
    }
}
