//! Aggregate reports over the equipment table and the movement ledger.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::api::types::{DailyMovementCount, EquipmentReport, MovementReport, StatusCount};
use crate::db::Store;
use crate::models::MovementType;

pub struct AnalyticsService {
    store: Store,
}

impl AnalyticsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn equipment_report(&self) -> Result<EquipmentReport> {
        let counts = self.store.count_equipment_by_status().await?;

        let total = counts.iter().map(|(_, count)| count).sum();
        let by_status = counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();

        Ok(EquipmentReport { total, by_status })
    }

    pub async fn movement_report(
        &self,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<MovementReport> {
        let (entradas, saidas) = self
            .store
            .count_movements_by_type(from.as_deref(), to.as_deref())
            .await?;

        let per_day_rows = self
            .store
            .count_movements_per_day(from.as_deref(), to.as_deref())
            .await?;

        // BTreeMap keeps the series in day order
        let mut days: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for (day, movement_type, count) in per_day_rows {
            let entry = days.entry(day).or_insert((0, 0));
            match MovementType::parse(&movement_type) {
                Some(MovementType::Entrada) => entry.0 = count,
                Some(MovementType::Saida) => entry.1 = count,
                None => {}
            }
        }

        let per_day = days
            .into_iter()
            .map(|(date, (entradas, saidas))| DailyMovementCount {
                date,
                entradas,
                saidas,
            })
            .collect();

        Ok(MovementReport {
            total: entradas + saidas,
            entradas,
            saidas,
            per_day,
        })
    }
}
