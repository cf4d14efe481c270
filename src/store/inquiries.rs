//! Customer inquiries and the staff notes attached to them.

use super::{page_bounds, Database, Page};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use rand::Rng;
use rusqlite::{params, params_from_iter, types::Value as SqlValue, ErrorCode, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub(super) const INQUIRY_COLUMNS: &str = "i.id, i.reference_number, i.product_id, p.name, \
     i.name, i.email, i.phone, i.company, i.country, i.product_interest, i.custom_product, \
     i.quantity, i.delivery_port, i.target_price, i.certifications, i.message, i.inquiry_type, \
     i.status, i.priority, i.source, i.created_at, i.updated_at";

pub(super) const INQUIRY_FROM: &str =
    "FROM inquiries i LEFT JOIN products p ON p.id = i.product_id";

const REFERENCE_ATTEMPTS: usize = 5;

/// Pipeline stage of an inquiry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InquiryStatus {
    New,
    InProgress,
    Responded,
    Quoted,
    Negotiating,
    Closed,
    Cancelled,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::InProgress => "in-progress",
            InquiryStatus::Responded => "responded",
            InquiryStatus::Quoted => "quoted",
            InquiryStatus::Negotiating => "negotiating",
            InquiryStatus::Closed => "closed",
            InquiryStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(InquiryStatus::New),
            "in-progress" => Some(InquiryStatus::InProgress),
            "responded" => Some(InquiryStatus::Responded),
            "quoted" => Some(InquiryStatus::Quoted),
            "negotiating" => Some(InquiryStatus::Negotiating),
            "closed" => Some(InquiryStatus::Closed),
            "cancelled" => Some(InquiryStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

/// Stored inquiry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: i64,
    pub reference_number: String,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub product_interest: Option<String>,
    pub custom_product: Option<String>,
    pub quantity: Option<String>,
    pub delivery_port: Option<String>,
    pub target_price: Option<String>,
    pub certifications: Option<String>,
    pub message: Option<String>,
    pub inquiry_type: String,
    pub status: InquiryStatus,
    pub priority: Priority,
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Staff note on an inquiry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryNote {
    pub id: i64,
    pub inquiry_id: i64,
    pub note: String,
    pub created_by: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_at: String,
}

/// Inquiry with its notes, newest note first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDetail {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub notes: Vec<InquiryNote>,
}

/// Certifications arrive either as a list or as free text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Certifications {
    List(Vec<String>),
    Text(String),
}

impl Certifications {
    fn joined(&self) -> Option<String> {
        let joined = match self {
            Certifications::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            Certifications::Text(text) => text.trim().to_string(),
        };
        (!joined.is_empty()).then_some(joined)
    }
}

/// Public inquiry form submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInquiry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub product_id: Option<i64>,
    pub product_interest: Option<String>,
    pub custom_product: Option<String>,
    pub quantity: Option<String>,
    pub delivery_port: Option<String>,
    pub target_price: Option<String>,
    pub certifications: Option<Certifications>,
    pub message: Option<String>,
    pub inquiry_type: Option<String>,
}

impl NewInquiry {
    /// Returns a client-facing message when required fields are missing
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err("Name and email are required".to_string());
        }
        if !self.email.contains('@') {
            return Err("Invalid email address".to_string());
        }
        Ok(())
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedInquiry {
    pub id: i64,
    pub reference_number: String,
}

/// Back-office list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InquiryFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Staff update: any of status, priority, and a note to append
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InquiryUpdate {
    pub status: Option<InquiryStatus>,
    pub priority: Option<Priority>,
    pub note: Option<String>,
}

impl InquiryUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.note.as_deref().map_or(true, |n| n.trim().is_empty())
    }
}

/// `ENQ` + two-digit year + two-digit month + four random digits
pub fn generate_reference_number() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("ENQ{}{:04}", Utc::now().format("%y%m"), suffix)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub(super) fn inquiry_from_row(row: &Row<'_>) -> rusqlite::Result<Inquiry> {
    let status: String = row.get(17)?;
    let priority: String = row.get(18)?;

    Ok(Inquiry {
        id: row.get(0)?,
        reference_number: row.get(1)?,
        product_id: row.get(2)?,
        product_name: row.get(3)?,
        name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        company: row.get(7)?,
        country: row.get(8)?,
        product_interest: row.get(9)?,
        custom_product: row.get(10)?,
        quantity: row.get(11)?,
        delivery_port: row.get(12)?,
        target_price: row.get(13)?,
        certifications: row.get(14)?,
        message: row.get(15)?,
        inquiry_type: row.get(16)?,
        status: InquiryStatus::from_str(&status).unwrap_or(InquiryStatus::New),
        priority: Priority::from_str(&priority).unwrap_or(Priority::Medium),
        source: row.get(19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<InquiryNote> {
    Ok(InquiryNote {
        id: row.get(0)?,
        inquiry_id: row.get(1)?,
        note: row.get(2)?,
        created_by: row.get(3)?,
        created_by_name: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

impl Database {
    /// Store a validated submission and bump the linked product's counter
    pub fn submit_inquiry(&self, new: &NewInquiry) -> Result<SubmittedInquiry> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // Unknown product ids are dropped rather than failing the submission
        let product_id = match new.product_id {
            Some(id) => tx
                .query_row(
                    "SELECT id FROM products WHERE id = ?1 AND status = 'active'",
                    params![id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?,
            None => None,
        };

        let certifications = new.certifications.as_ref().and_then(Certifications::joined);
        let inquiry_type = non_empty(&new.inquiry_type).unwrap_or("general");

        let mut inserted = None;
        for attempt in 1..=REFERENCE_ATTEMPTS {
            let reference_number = generate_reference_number();
            let result = tx.execute(
                "INSERT INTO inquiries (
                    reference_number, product_id, name, email, phone, company, country,
                    product_interest, custom_product, quantity, delivery_port, target_price,
                    certifications, message, inquiry_type
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    reference_number,
                    product_id,
                    new.name.trim(),
                    new.email.trim(),
                    non_empty(&new.phone),
                    non_empty(&new.company),
                    non_empty(&new.country),
                    non_empty(&new.product_interest),
                    non_empty(&new.custom_product),
                    non_empty(&new.quantity),
                    non_empty(&new.delivery_port),
                    non_empty(&new.target_price),
                    certifications,
                    non_empty(&new.message),
                    inquiry_type,
                ],
            );

            match result {
                Ok(_) => {
                    inserted = Some((tx.last_insert_rowid(), reference_number));
                    break;
                }
                Err(e) if is_unique_violation(&e) => {
                    debug!("Reference number collision (attempt {})", attempt);
                }
                Err(e) => return Err(e).context("Failed to insert inquiry"),
            }
        }

        let Some((id, reference_number)) = inserted else {
            warn!("Could not allocate a unique inquiry reference number");
            bail!("reference number space exhausted");
        };

        if let Some(product_id) = product_id {
            tx.execute(
                "UPDATE products SET enquiry_count = enquiry_count + 1 WHERE id = ?1",
                params![product_id],
            )?;
        }

        tx.commit().context("Failed to commit inquiry")?;

        info!(
            "📨 New inquiry {} from {} ({})",
            reference_number,
            new.name.trim(),
            inquiry_type
        );

        Ok(SubmittedInquiry {
            id,
            reference_number,
        })
    }

    /// Newest inquiries first, with optional status / priority / text filters
    pub fn list_inquiries(&self, filter: &InquiryFilter) -> Result<Page<Inquiry>> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
            where_sql.push_str(" AND i.status = ?");
            args.push(SqlValue::Text(status.to_string()));
        }
        if let Some(priority) = filter.priority.as_deref().filter(|s| !s.is_empty() && *s != "all") {
            where_sql.push_str(" AND i.priority = ?");
            args.push(SqlValue::Text(priority.to_string()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            where_sql.push_str(
                " AND (i.name LIKE ? OR i.email LIKE ? OR i.company LIKE ? OR i.reference_number LIKE ?)",
            );
            let pattern = format!("%{}%", search);
            for _ in 0..4 {
                args.push(SqlValue::Text(pattern.clone()));
            }
        }

        let (limit, offset) = page_bounds(filter.limit, filter.offset);
        let conn = self.conn();

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM inquiries i{}", where_sql),
                params_from_iter(args.iter()),
                |row| row.get(0),
            )
            .context("Failed to count inquiries")?;

        let sql = format!(
            "SELECT {} {}{} ORDER BY i.created_at DESC, i.id DESC LIMIT ? OFFSET ?",
            INQUIRY_COLUMNS, INQUIRY_FROM, where_sql
        );
        args.push(SqlValue::Integer(limit));
        args.push(SqlValue::Integer(offset));

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(args.iter()), inquiry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list inquiries")?;

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Every inquiry submitted under `email`, newest first
    pub fn list_inquiries_for_email(&self, email: &str) -> Result<Vec<Inquiry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} {} WHERE lower(i.email) = lower(?1)
             ORDER BY i.created_at DESC, i.id DESC",
            INQUIRY_COLUMNS, INQUIRY_FROM
        ))?;
        let items = stmt
            .query_map(params![email.trim()], inquiry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list inquiries for email")?;
        Ok(items)
    }

    pub fn get_inquiry(&self, id: i64) -> Result<Option<InquiryDetail>> {
        let conn = self.conn();

        let inquiry = conn
            .query_row(
                &format!("SELECT {} {} WHERE i.id = ?1", INQUIRY_COLUMNS, INQUIRY_FROM),
                params![id],
                inquiry_from_row,
            )
            .optional()
            .context("Failed to load inquiry")?;

        let Some(inquiry) = inquiry else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT n.id, n.inquiry_id, n.note, n.created_by, u.username, n.created_at
             FROM inquiry_notes n LEFT JOIN users u ON u.id = n.created_by
             WHERE n.inquiry_id = ?1
             ORDER BY n.created_at DESC, n.id DESC",
        )?;
        let notes = stmt
            .query_map(params![id], note_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load inquiry notes")?;

        Ok(Some(InquiryDetail { inquiry, notes }))
    }

    /// Apply status / priority and append a note atomically.
    /// Returns false when the inquiry does not exist.
    pub fn update_inquiry(&self, id: i64, update: &InquiryUpdate, author: i64) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM inquiries WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Ok(false);
        }

        if let Some(status) = update.status {
            tx.execute(
                "UPDATE inquiries SET status = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                params![status.as_str(), id],
            )?;
        }
        if let Some(priority) = update.priority {
            tx.execute(
                "UPDATE inquiries SET priority = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                params![priority.as_str(), id],
            )?;
        }
        if let Some(note) = non_empty(&update.note) {
            tx.execute(
                "INSERT INTO inquiry_notes (inquiry_id, note, created_by) VALUES (?1, ?2, ?3)",
                params![id, note, author],
            )?;
        }

        tx.commit().context("Failed to commit inquiry update")?;
        info!("📝 Inquiry {} updated by user {}", id, author);
        Ok(true)
    }

    /// Append a note. Returns `None` when the inquiry does not exist.
    pub fn add_inquiry_note(&self, id: i64, note: &str, author: i64) -> Result<Option<InquiryNote>> {
        let conn = self.conn();

        let exists = conn
            .query_row("SELECT 1 FROM inquiries WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO inquiry_notes (inquiry_id, note, created_by) VALUES (?1, ?2, ?3)",
            params![id, note.trim(), author],
        )
        .context("Failed to insert inquiry note")?;
        let note_id = conn.last_insert_rowid();

        let note = conn.query_row(
            "SELECT n.id, n.inquiry_id, n.note, n.created_by, u.username, n.created_at
             FROM inquiry_notes n LEFT JOIN users u ON u.id = n.created_by
             WHERE n.id = ?1",
            params![note_id],
            note_from_row,
        )?;

        Ok(Some(note))
    }

    /// Hard delete; notes go with it
    pub fn delete_inquiry(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn()
            .execute("DELETE FROM inquiries WHERE id = ?1", params![id])
            .context("Failed to delete inquiry")?;

        if changed > 0 {
            info!("🗑️  Deleted inquiry {}", id);
        }
        Ok(changed > 0)
    }
}
