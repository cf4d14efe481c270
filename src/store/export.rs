//! CSV export of inquiries for spreadsheets

use super::{
    inquiries::{inquiry_from_row, Inquiry, INQUIRY_COLUMNS, INQUIRY_FROM},
    Database,
};
use anyhow::{Context, Result};
use rusqlite::{params_from_iter, types::Value as SqlValue};
use serde::Deserialize;

const HEADER: [&str; 16] = [
    "Reference",
    "Date",
    "Name",
    "Email",
    "Phone",
    "Company",
    "Country",
    "Product",
    "Quantity",
    "Delivery Port",
    "Target Price",
    "Certifications",
    "Type",
    "Status",
    "Priority",
    "Message",
];

/// Export filters; dates are `YYYY-MM-DD`, both ends inclusive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportFilter {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Quote a field when it contains a delimiter, quote or line break
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = fields.into_iter().map(csv_field).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

fn inquiry_line(inquiry: &Inquiry) -> String {
    let product = inquiry
        .product_name
        .as_deref()
        .or(inquiry.product_interest.as_deref())
        .or(inquiry.custom_product.as_deref());

    csv_line([
        inquiry.reference_number.as_str(),
        inquiry.created_at.as_str(),
        inquiry.name.as_str(),
        inquiry.email.as_str(),
        inquiry.phone.as_deref().unwrap_or(""),
        inquiry.company.as_deref().unwrap_or(""),
        inquiry.country.as_deref().unwrap_or(""),
        product.unwrap_or(""),
        inquiry.quantity.as_deref().unwrap_or(""),
        inquiry.delivery_port.as_deref().unwrap_or(""),
        inquiry.target_price.as_deref().unwrap_or(""),
        inquiry.certifications.as_deref().unwrap_or(""),
        inquiry.inquiry_type.as_str(),
        inquiry.status.as_str(),
        inquiry.priority.as_str(),
        inquiry.message.as_deref().unwrap_or(""),
    ])
}

impl Database {
    /// Render matching inquiries (oldest first) as a CSV document
    pub fn export_inquiries_csv(&self, filter: &ExportFilter) -> Result<String> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
            where_sql.push_str(" AND i.status = ?");
            args.push(SqlValue::Text(status.to_string()));
        }
        if let Some(start) = filter.start_date.as_deref().filter(|s| !s.is_empty()) {
            where_sql.push_str(" AND date(i.created_at) >= date(?)");
            args.push(SqlValue::Text(start.to_string()));
        }
        if let Some(end) = filter.end_date.as_deref().filter(|s| !s.is_empty()) {
            where_sql.push_str(" AND date(i.created_at) <= date(?)");
            args.push(SqlValue::Text(end.to_string()));
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} {}{} ORDER BY i.created_at, i.id",
            INQUIRY_COLUMNS, INQUIRY_FROM, where_sql
        ))?;
        let inquiries = stmt
            .query_map(params_from_iter(args.iter()), inquiry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load inquiries for export")?;

        let mut csv = csv_line(HEADER);
        for inquiry in &inquiries {
            csv.push_str(&inquiry_line(inquiry));
        }
        Ok(csv)
    }
}
