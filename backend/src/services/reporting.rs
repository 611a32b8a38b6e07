//! Profit reporting and analytics
//!
//! Aggregates completed sales into revenue/cost/profit figures. Per-line
//! cost is resolved inside the report query with the same precedence the
//! costing service uses (recorded price, then latest batch, then latest
//! breakdown, then zero), so a report always reflects current batch and
//! breakdown data. Voided sales are excluded from every figure.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    margin_of, summarize_days, DailyProfit, DaySummary, ProfitGroup, ProfitReport, ReportGrouping,
};
use shared::types::DateRange;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Daily profit series with its day-level summary
#[derive(Debug, Serialize)]
pub struct DailyProfitReport {
    pub days: Vec<DailyProfit>,
    pub summary: DaySummary,
}

#[derive(Debug, FromRow)]
struct GroupRow {
    item_id: Option<Uuid>,
    label: String,
    units_sold: Decimal,
    revenue: Decimal,
    cost: Decimal,
}

#[derive(Debug, FromRow)]
struct DailyRow {
    day: NaiveDate,
    revenue: Decimal,
    cost: Decimal,
    transactions: i64,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Profit report over a date range, grouped by item or category
    pub async fn profit_report(
        &self,
        business_id: Uuid,
        range: DateRange,
        grouping: ReportGrouping,
    ) -> AppResult<ProfitReport> {
        if range.start > range.end {
            return Err(AppError::Validation {
                field: "start".to_string(),
                message: "Start date must not be after end date".to_string(),
                message_th: "วันที่เริ่มต้นต้องไม่อยู่หลังวันที่สิ้นสุด".to_string(),
            });
        }

        let query = match grouping {
            ReportGrouping::Item => {
                r#"
                SELECT si.item_id AS item_id,
                       i.name AS label,
                       COALESCE(SUM(si.quantity), 0) AS units_sold,
                       COALESCE(SUM(si.quantity * si.sell_price_per_unit), 0) AS revenue,
                       COALESCE(SUM(si.quantity * COALESCE(
                           NULLIF(si.buy_price_per_unit, 0),
                           NULLIF((SELECT b.buy_price_per_unit FROM inventory_batches b
                                   WHERE b.item_id = si.item_id
                                   ORDER BY b.received_at DESC, b.id DESC LIMIT 1), 0),
                           NULLIF((SELECT pb.buy_price_per_unit FROM purchase_breakdowns pb
                                   WHERE pb.item_id = si.item_id
                                   ORDER BY pb.confirmed_at DESC, pb.id DESC LIMIT 1), 0),
                           0
                       )), 0) AS cost
                FROM sale_items si
                JOIN sales s ON s.id = si.sale_id
                JOIN items i ON i.id = si.item_id
                WHERE s.business_id = $1
                  AND s.status = 'completed'
                  AND s.sold_at::date BETWEEN $2 AND $3
                GROUP BY si.item_id, i.name
                ORDER BY revenue DESC
                "#
            }
            ReportGrouping::Category => {
                r#"
                SELECT NULL::uuid AS item_id,
                       COALESCE(i.category, 'uncategorized') AS label,
                       COALESCE(SUM(si.quantity), 0) AS units_sold,
                       COALESCE(SUM(si.quantity * si.sell_price_per_unit), 0) AS revenue,
                       COALESCE(SUM(si.quantity * COALESCE(
                           NULLIF(si.buy_price_per_unit, 0),
                           NULLIF((SELECT b.buy_price_per_unit FROM inventory_batches b
                                   WHERE b.item_id = si.item_id
                                   ORDER BY b.received_at DESC, b.id DESC LIMIT 1), 0),
                           NULLIF((SELECT pb.buy_price_per_unit FROM purchase_breakdowns pb
                                   WHERE pb.item_id = si.item_id
                                   ORDER BY pb.confirmed_at DESC, pb.id DESC LIMIT 1), 0),
                           0
                       )), 0) AS cost
                FROM sale_items si
                JOIN sales s ON s.id = si.sale_id
                JOIN items i ON i.id = si.item_id
                WHERE s.business_id = $1
                  AND s.status = 'completed'
                  AND s.sold_at::date BETWEEN $2 AND $3
                GROUP BY COALESCE(i.category, 'uncategorized')
                ORDER BY revenue DESC
                "#
            }
        };

        let rows = sqlx::query_as::<_, GroupRow>(query)
            .bind(business_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.db)
            .await?;

        let groups: Vec<ProfitGroup> = rows
            .into_iter()
            .map(|r| {
                let profit = r.revenue - r.cost;
                ProfitGroup {
                    item_id: r.item_id,
                    label: r.label,
                    units_sold: r.units_sold,
                    revenue: r.revenue,
                    cost: r.cost,
                    profit,
                    margin: margin_of(profit, r.revenue),
                }
            })
            .collect();

        let total_sales: Decimal = groups.iter().map(|g| g.revenue).sum();
        let total_cost: Decimal = groups.iter().map(|g| g.cost).sum();
        let total_profit = total_sales - total_cost;

        Ok(ProfitReport {
            total_sales,
            total_cost,
            total_profit,
            margin: margin_of(total_profit, total_sales),
            groups,
        })
    }

    /// Daily profit series over the last `months_back` months.
    ///
    /// `tz_offset_minutes` is the caller's offset from UTC, applied before
    /// the day truncation so buckets follow the caller's calendar.
    pub async fn daily_profit(
        &self,
        business_id: Uuid,
        months_back: i32,
        tz_offset_minutes: i32,
    ) -> AppResult<DailyProfitReport> {
        if !(1..=36).contains(&months_back) {
            return Err(AppError::Validation {
                field: "months_back".to_string(),
                message: "Months back must be between 1 and 36".to_string(),
                message_th: "จำนวนเดือนย้อนหลังต้องอยู่ระหว่าง 1 ถึง 36".to_string(),
            });
        }
        if !(-840..=840).contains(&tz_offset_minutes) {
            return Err(AppError::Validation {
                field: "tz_offset_minutes".to_string(),
                message: "Timezone offset must be between -840 and 840 minutes".to_string(),
                message_th: "ค่าชดเชยเขตเวลาต้องอยู่ระหว่าง -840 ถึง 840 นาที".to_string(),
            });
        }

        let rows = sqlx::query_as::<_, DailyRow>(
            r#"
            SELECT ((s.sold_at + make_interval(mins => $3)) AT TIME ZONE 'UTC')::date AS day,
                   COALESCE(SUM(si.quantity * si.sell_price_per_unit), 0) AS revenue,
                   COALESCE(SUM(si.quantity * COALESCE(
                       NULLIF(si.buy_price_per_unit, 0),
                       NULLIF((SELECT b.buy_price_per_unit FROM inventory_batches b
                               WHERE b.item_id = si.item_id
                               ORDER BY b.received_at DESC, b.id DESC LIMIT 1), 0),
                       NULLIF((SELECT pb.buy_price_per_unit FROM purchase_breakdowns pb
                               WHERE pb.item_id = si.item_id
                               ORDER BY pb.confirmed_at DESC, pb.id DESC LIMIT 1), 0),
                       0
                   )), 0) AS cost,
                   COUNT(DISTINCT s.id) AS transactions
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.business_id = $1
              AND s.status = 'completed'
              AND s.sold_at >= NOW() - make_interval(months => $2)
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(business_id)
        .bind(months_back)
        .bind(tz_offset_minutes)
        .fetch_all(&self.db)
        .await?;

        let days: Vec<DailyProfit> = rows
            .into_iter()
            .map(|r| DailyProfit {
                date: r.day,
                revenue: r.revenue,
                cost: r.cost,
                profit: r.revenue - r.cost,
                transactions: r.transactions,
            })
            .collect();

        let summary = summarize_days(&days);

        Ok(DailyProfitReport { days, summary })
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| crate::error::AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
