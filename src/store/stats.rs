//! Back-office dashboard counters

use super::{
    inquiries::{inquiry_from_row, Inquiry, INQUIRY_COLUMNS, INQUIRY_FROM},
    Database,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

const RECENT_INQUIRIES: i64 = 10;
const TOP_PRODUCTS: i64 = 5;

const CATEGORY_COUNTS_SQL: &str = "SELECT category, COUNT(*) FROM products WHERE status = 'active'
     GROUP BY category ORDER BY COUNT(*) DESC, category";

#[derive(Debug, Clone, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub enquiry_count: i64,
    pub views: i64,
}

/// Everything the dashboard shows on load
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_inquiries: i64,
    pub inquiries_last_7_days: i64,
    pub inquiries_today: i64,
    pub inquiries_this_month: i64,
    pub total_customers: i64,
    pub inquiries_by_status: Vec<LabelCount>,
    pub products_by_category: Vec<LabelCount>,
    pub recent_inquiries: Vec<Inquiry>,
    pub top_products: Vec<TopProduct>,
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    conn.query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("Stats query failed: {}", sql))
}

fn grouped(conn: &Connection, sql: &str) -> Result<Vec<LabelCount>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(LabelCount {
                label: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

impl Database {
    /// Active products per category, largest first
    pub fn category_counts(&self) -> Result<Vec<LabelCount>> {
        grouped(&self.conn(), CATEGORY_COUNTS_SQL)
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        let conn = self.conn();

        let total_products = count(&conn, "SELECT COUNT(*) FROM products WHERE status = 'active'")?;
        let total_inquiries = count(&conn, "SELECT COUNT(*) FROM inquiries")?;
        let inquiries_last_7_days = count(
            &conn,
            "SELECT COUNT(*) FROM inquiries WHERE created_at >= datetime('now', '-7 days')",
        )?;
        let inquiries_today = count(
            &conn,
            "SELECT COUNT(*) FROM inquiries WHERE date(created_at) = date('now')",
        )?;
        let inquiries_this_month = count(
            &conn,
            "SELECT COUNT(*) FROM inquiries
             WHERE strftime('%Y-%m', created_at) = strftime('%Y-%m', 'now')",
        )?;
        let total_customers = count(
            &conn,
            "SELECT COUNT(*) FROM users WHERE role = 'customer' AND is_active = 1",
        )?;

        let inquiries_by_status = grouped(
            &conn,
            "SELECT status, COUNT(*) FROM inquiries GROUP BY status ORDER BY COUNT(*) DESC, status",
        )?;
        let products_by_category = grouped(&conn, CATEGORY_COUNTS_SQL)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} {} ORDER BY i.created_at DESC, i.id DESC LIMIT ?1",
            INQUIRY_COLUMNS, INQUIRY_FROM
        ))?;
        let recent_inquiries = stmt
            .query_map([RECENT_INQUIRIES], inquiry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, category, enquiry_count, views FROM products
             WHERE status = 'active'
             ORDER BY enquiry_count DESC, views DESC, id
             LIMIT ?1",
        )?;
        let top_products = stmt
            .query_map([TOP_PRODUCTS], |row| {
                Ok(TopProduct {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                    enquiry_count: row.get(3)?,
                    views: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(DashboardStats {
            total_products,
            total_inquiries,
            inquiries_last_7_days,
            inquiries_today,
            inquiries_this_month,
            total_customers,
            inquiries_by_status,
            products_by_category,
            recent_inquiries,
            top_products,
        })
    }
}
