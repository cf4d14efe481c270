//! Catalog products: filtered listing, detail with related items, admin CRUD.
//! Deletes are soft (status -> inactive); public reads only see active rows.

use super::{page_bounds, Database, Page};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, types::Value as SqlValue, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

const PRODUCT_COLUMNS: &str = "id, name, description, category, subcategory, price, \
     min_order_quantity, origin_country, origin_region, images, specifications, availability, \
     lead_time, featured, tags, status, views, enquiry_count, created_at, updated_at";

const RELATED_LIMIT: i64 = 4;
const FEATURED_LIMIT: i64 = 8;

/// Catalog sections
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Import,
    Export,
    Services,
    Logistics,
    Documentation,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Import => "import",
            ProductCategory::Export => "export",
            ProductCategory::Services => "services",
            ProductCategory::Logistics => "logistics",
            ProductCategory::Documentation => "documentation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "import" => Some(ProductCategory::Import),
            "export" => Some(ProductCategory::Export),
            "services" => Some(ProductCategory::Services),
            "logistics" => Some(ProductCategory::Logistics),
            "documentation" => Some(ProductCategory::Documentation),
            _ => None,
        }
    }
}

/// Stock situation shown on the product page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
    MadeToOrder,
    Seasonal,
    OutOfStock,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in-stock",
            Availability::MadeToOrder => "made-to-order",
            Availability::Seasonal => "seasonal",
            Availability::OutOfStock => "out-of-stock",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "in-stock" => Some(Availability::InStock),
            "made-to-order" => Some(Availability::MadeToOrder),
            "seasonal" => Some(Availability::Seasonal),
            "out-of-stock" => Some(Availability::OutOfStock),
            _ => None,
        }
    }
}

/// Publication state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
    Draft,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Draft => "draft",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "draft" => Some(ProductStatus::Draft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Catalog product
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub subcategory: String,
    pub price: String,
    pub min_order_quantity: String,
    pub origin_country: String,
    pub origin_region: String,
    pub images: Vec<ProductImage>,
    pub specifications: Value,
    pub availability: Availability,
    pub lead_time: String,
    pub featured: bool,
    pub tags: Vec<String>,
    pub status: ProductStatus,
    pub views: i64,
    pub enquiry_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Product page: the product plus a few from the same category
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub related_products: Vec<Product>,
}

/// Create request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Option<String>,
    pub min_order_quantity: Option<String>,
    #[serde(default)]
    pub origin_country: String,
    pub origin_region: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub specifications: Option<Value>,
    pub availability: Option<String>,
    pub lead_time: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub subcategory: Option<String>,
    pub price: Option<String>,
    pub min_order_quantity: Option<String>,
    pub origin_country: Option<String>,
    pub origin_region: Option<String>,
    pub images: Option<Vec<ProductImage>>,
    pub specifications: Option<Value>,
    pub availability: Option<Availability>,
    pub lead_time: Option<String>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
}

/// Listing sort keys (whitelisted, they end up in SQL text)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    CreatedAt,
    Name,
    Views,
    EnquiryCount,
}

impl ProductSort {
    fn column(&self) -> &'static str {
        match self {
            ProductSort::CreatedAt => "created_at",
            ProductSort::Name => "name",
            ProductSort::Views => "views",
            ProductSort::EnquiryCount => "enquiry_count",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "name" => ProductSort::Name,
            "views" => ProductSort::Views,
            "enquiry_count" | "enquiryCount" => ProductSort::EnquiryCount,
            _ => ProductSort::CreatedAt,
        }
    }
}

/// Public listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub country: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl NewProduct {
    /// Field-level validation; returns a client-facing message on failure
    pub fn validate(&self) -> std::result::Result<ProductCategory, String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Product description is required".to_string());
        }
        if self.origin_country.trim().is_empty() {
            return Err("Origin country is required".to_string());
        }
        if let Some(availability) = &self.availability {
            if Availability::from_str(availability).is_none() {
                return Err(format!("Invalid availability: {}", availability));
            }
        }
        ProductCategory::from_str(&self.category)
            .ok_or_else(|| format!("Invalid category: {}", self.category))
    }
}

impl ProductUpdate {
    /// Required fields may be changed but not blanked
    pub fn validate(&self) -> std::result::Result<(), String> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&self.name) {
            return Err("Product name is required".to_string());
        }
        if blank(&self.description) {
            return Err("Product description is required".to_string());
        }
        if blank(&self.origin_country) {
            return Err("Origin country is required".to_string());
        }
        Ok(())
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let category: String = row.get(3)?;
    let images: String = row.get(9)?;
    let specifications: String = row.get(10)?;
    let availability: String = row.get(11)?;
    let tags: String = row.get(14)?;
    let status: String = row.get(15)?;

    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: ProductCategory::from_str(&category).unwrap_or(ProductCategory::Export),
        subcategory: row.get(4)?,
        price: row.get(5)?,
        min_order_quantity: row.get(6)?,
        origin_country: row.get(7)?,
        origin_region: row.get(8)?,
        images: serde_json::from_str(&images).unwrap_or_default(),
        specifications: serde_json::from_str(&specifications)
            .unwrap_or_else(|_| Value::Object(Default::default())),
        availability: Availability::from_str(&availability).unwrap_or(Availability::InStock),
        lead_time: row.get(12)?,
        featured: row.get::<_, i64>(13)? != 0,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        status: ProductStatus::from_str(&status).unwrap_or(ProductStatus::Inactive),
        views: row.get(16)?,
        enquiry_count: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}

impl Database {
    /// Active products matching the filters, plus the unpaginated total
    pub fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let mut where_sql = String::from(" WHERE status = 'active'");
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
            where_sql.push_str(" AND category = ?");
            args.push(SqlValue::Text(category.to_lowercase()));
        }
        if let Some(country) = query.country.as_deref().filter(|s| !s.is_empty()) {
            where_sql.push_str(" AND origin_country = ?");
            args.push(SqlValue::Text(country.to_string()));
        }
        if query.featured == Some(true) {
            where_sql.push_str(" AND featured = 1");
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            where_sql.push_str(" AND (name LIKE ? OR description LIKE ? OR tags LIKE ?)");
            let pattern = format!("%{}%", search);
            for _ in 0..3 {
                args.push(SqlValue::Text(pattern.clone()));
            }
        }

        let sort = ProductSort::from_str(query.sort.as_deref().unwrap_or("created_at"));
        let order = match query.order.as_deref() {
            Some(o) if o.eq_ignore_ascii_case("asc") => "ASC",
            _ => "DESC",
        };
        let (limit, offset) = page_bounds(query.limit, query.offset);

        let conn = self.conn();

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM products{}", where_sql),
                params_from_iter(args.iter()),
                |row| row.get(0),
            )
            .context("Failed to count products")?;

        let sql = format!(
            "SELECT {} FROM products{} ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
            PRODUCT_COLUMNS,
            where_sql,
            sort.column(),
            order,
            order
        );
        args.push(SqlValue::Integer(limit));
        args.push(SqlValue::Integer(offset));

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(args.iter()), product_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list products")?;

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Featured active products for the storefront, newest first
    pub fn featured_products(&self) -> Result<Vec<Product>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM products WHERE featured = 1 AND status = 'active'
             ORDER BY created_at DESC, id DESC LIMIT ?1",
            PRODUCT_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![FEATURED_LIMIT], product_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list featured products")?;
        Ok(items)
    }

    /// Any product by id, regardless of status (admin views)
    pub fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
            params![id],
            product_from_row,
        )
        .optional()
        .context("Failed to load product")
    }

    /// Public product page: counts a view and attaches related products
    pub fn view_product(&self, id: i64) -> Result<Option<ProductDetail>> {
        let conn = self.conn();

        let changed = conn.execute(
            "UPDATE products SET views = views + 1 WHERE id = ?1 AND status = 'active'",
            params![id],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        let product = conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                params![id],
                product_from_row,
            )
            .context("Failed to load product")?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM products
             WHERE category = ?1 AND id != ?2 AND status = 'active'
             ORDER BY featured DESC, enquiry_count DESC, id DESC
             LIMIT ?3",
            PRODUCT_COLUMNS
        ))?;
        let related_products = stmt
            .query_map(
                params![product.category.as_str(), id, RELATED_LIMIT],
                product_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load related products")?;

        Ok(Some(ProductDetail {
            product,
            related_products,
        }))
    }

    /// Insert a product; caller has validated it
    pub fn create_product(&self, new: &NewProduct, category: ProductCategory) -> Result<i64> {
        let images = serde_json::to_string(&new.images)?;
        let specifications = serde_json::to_string(
            new.specifications
                .as_ref()
                .unwrap_or(&Value::Object(Default::default())),
        )?;
        let tags = serde_json::to_string(&new.tags)?;
        let availability = new
            .availability
            .as_deref()
            .and_then(Availability::from_str)
            .unwrap_or(Availability::InStock);

        let conn = self.conn();
        conn.execute(
            "INSERT INTO products (
                name, description, category, subcategory, price, min_order_quantity,
                origin_country, origin_region, images, specifications, availability,
                lead_time, featured, tags
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                new.name.trim(),
                new.description.trim(),
                category.as_str(),
                new.subcategory.as_deref().unwrap_or(""),
                new.price.as_deref().unwrap_or("Contact for Quotation"),
                new.min_order_quantity.as_deref().unwrap_or(""),
                new.origin_country.trim(),
                new.origin_region.as_deref().unwrap_or(""),
                images,
                specifications,
                availability.as_str(),
                new.lead_time.as_deref().unwrap_or(""),
                new.featured as i64,
                tags,
            ],
        )
        .context("Failed to insert product")?;

        let id = conn.last_insert_rowid();
        info!("✅ Created product {} ({})", id, new.name.trim());
        Ok(id)
    }

    /// Apply a partial update validated by [`ProductUpdate::validate`].
    /// Returns `Ok(None)` when nothing was supplied, otherwise whether the
    /// product existed.
    pub fn update_product(&self, id: i64, update: &ProductUpdate) -> Result<Option<bool>> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        fn text(sets: &mut Vec<&'static str>, args: &mut Vec<SqlValue>, col: &'static str, v: &Option<String>) {
            if let Some(v) = v {
                sets.push(col);
                args.push(SqlValue::Text(v.clone()));
            }
        }

        fn required(sets: &mut Vec<&'static str>, args: &mut Vec<SqlValue>, col: &'static str, v: &Option<String>) {
            if let Some(v) = v {
                sets.push(col);
                args.push(SqlValue::Text(v.trim().to_string()));
            }
        }

        required(&mut sets, &mut args, "name = ?", &update.name);
        required(&mut sets, &mut args, "description = ?", &update.description);
        required(&mut sets, &mut args, "origin_country = ?", &update.origin_country);
        text(&mut sets, &mut args, "subcategory = ?", &update.subcategory);
        text(&mut sets, &mut args, "price = ?", &update.price);
        text(&mut sets, &mut args, "min_order_quantity = ?", &update.min_order_quantity);
        text(&mut sets, &mut args, "origin_region = ?", &update.origin_region);
        text(&mut sets, &mut args, "lead_time = ?", &update.lead_time);

        if let Some(category) = update.category {
            sets.push("category = ?");
            args.push(SqlValue::Text(category.as_str().to_string()));
        }
        if let Some(availability) = update.availability {
            sets.push("availability = ?");
            args.push(SqlValue::Text(availability.as_str().to_string()));
        }
        if let Some(status) = update.status {
            sets.push("status = ?");
            args.push(SqlValue::Text(status.as_str().to_string()));
        }
        if let Some(featured) = update.featured {
            sets.push("featured = ?");
            args.push(SqlValue::Integer(featured as i64));
        }
        if let Some(images) = &update.images {
            sets.push("images = ?");
            args.push(SqlValue::Text(serde_json::to_string(images)?));
        }
        if let Some(specifications) = &update.specifications {
            sets.push("specifications = ?");
            args.push(SqlValue::Text(serde_json::to_string(specifications)?));
        }
        if let Some(tags) = &update.tags {
            sets.push("tags = ?");
            args.push(SqlValue::Text(serde_json::to_string(tags)?));
        }

        if sets.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "UPDATE products SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            sets.join(", ")
        );
        args.push(SqlValue::Integer(id));

        let changed = self
            .conn()
            .execute(&sql, params_from_iter(args.iter()))
            .context("Failed to update product")?;

        Ok(Some(changed > 0))
    }

    /// Soft delete. Returns false when the product does not exist.
    pub fn deactivate_product(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn()
            .execute(
                "UPDATE products SET status = 'inactive', updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![id],
            )
            .context("Failed to deactivate product")?;

        if changed > 0 {
            info!("🗑️  Deactivated product {}", id);
        }
        Ok(changed > 0)
    }

    pub fn count_products(&self) -> Result<i64> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample(name: &str, category: &str, country: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: format!("{} description", name),
            category: category.to_string(),
            origin_country: country.to_string(),
            tags: vec!["bulk".to_string()],
            ..Default::default()
        }
    }

    pub(crate) fn insert(db: &Database, new: &NewProduct) -> i64 {
        let category = new.validate().unwrap();
        db.create_product(new, category).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(sample("Rice", "export", "India").validate().is_ok());
        assert!(sample("", "export", "India").validate().is_err());
        assert!(sample("Rice", "spices", "India").validate().is_err());
        assert!(sample("Rice", "export", " ").validate().is_err());

        let mut bad_availability = sample("Rice", "export", "India");
        bad_availability.availability = Some("sometimes".to_string());
        assert!(bad_availability.validate().is_err());
    }

    #[test]
    fn test_create_applies_defaults() {
        let db = Database::open_in_memory().unwrap();
        let id = insert(&db, &sample("Basmati Rice", "export", "India"));

        let product = db.get_product(id).unwrap().unwrap();
        assert_eq!(product.name, "Basmati Rice");
        assert_eq!(product.category, ProductCategory::Export);
        assert_eq!(product.price, "Contact for Quotation");
        assert_eq!(product.availability, Availability::InStock);
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.tags, vec!["bulk".to_string()]);
        assert!(product.specifications.is_object());
    }

    #[test]
    fn test_list_filters_and_pagination() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample("Basmati Rice", "export", "India"));
        insert(&db, &sample("Cotton Fabric", "export", "India"));
        insert(&db, &sample("Machinery Parts", "import", "Germany"));
        let mut featured = sample("Spice Mix", "export", "India");
        featured.featured = true;
        insert(&db, &featured);

        let all = db.list_products(&ProductQuery::default()).unwrap();
        assert_eq!(all.total, 4);

        let exports = db
            .list_products(&ProductQuery {
                category: Some("export".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(exports.total, 3);

        let german = db
            .list_products(&ProductQuery {
                country: Some("Germany".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(german.items.len(), 1);
        assert_eq!(german.items[0].name, "Machinery Parts");

        let only_featured = db
            .list_products(&ProductQuery {
                featured: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(only_featured.total, 1);

        let search = db
            .list_products(&ProductQuery {
                search: Some("cotton".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(search.total, 1);

        let page = db
            .list_products(&ProductQuery {
                sort: Some("name".to_string()),
                order: Some("asc".to_string()),
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.limit, 2);
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cotton Fabric", "Machinery Parts"]);
    }

    #[test]
    fn test_view_counts_and_related() {
        let db = Database::open_in_memory().unwrap();
        let rice = insert(&db, &sample("Basmati Rice", "export", "India"));
        insert(&db, &sample("Cotton Fabric", "export", "India"));
        insert(&db, &sample("Machinery Parts", "import", "Germany"));

        let detail = db.view_product(rice).unwrap().unwrap();
        assert_eq!(detail.product.views, 1);
        assert_eq!(detail.related_products.len(), 1);
        assert_eq!(detail.related_products[0].name, "Cotton Fabric");

        let again = db.view_product(rice).unwrap().unwrap();
        assert_eq!(again.product.views, 2);

        assert!(db.view_product(9999).unwrap().is_none());
    }

    #[test]
    fn test_partial_update() {
        let db = Database::open_in_memory().unwrap();
        let id = insert(&db, &sample("Basmati Rice", "export", "India"));

        assert_eq!(db.update_product(id, &ProductUpdate::default()).unwrap(), None);

        let update = ProductUpdate {
            price: Some("$450 per MT".to_string()),
            featured: Some(true),
            tags: Some(vec!["rice".to_string(), "grain".to_string()]),
            ..Default::default()
        };
        assert_eq!(db.update_product(id, &update).unwrap(), Some(true));
        assert_eq!(db.update_product(9999, &update).unwrap(), Some(false));

        let product = db.get_product(id).unwrap().unwrap();
        assert_eq!(product.price, "$450 per MT");
        assert!(product.featured);
        assert_eq!(product.tags.len(), 2);
        assert_eq!(product.name, "Basmati Rice");
    }

    #[test]
    fn test_update_keeps_required_fields() {
        let db = Database::open_in_memory().unwrap();
        let id = insert(&db, &sample("Basmati Rice", "export", "India"));

        for update in [
            ProductUpdate { name: Some("  ".to_string()), ..Default::default() },
            ProductUpdate { description: Some(String::new()), ..Default::default() },
            ProductUpdate { origin_country: Some(" ".to_string()), ..Default::default() },
        ] {
            assert!(update.validate().is_err());
        }

        let rename = ProductUpdate {
            name: Some("  Sella Basmati ".to_string()),
            ..Default::default()
        };
        assert!(rename.validate().is_ok());
        assert_eq!(db.update_product(id, &rename).unwrap(), Some(true));
        assert_eq!(db.get_product(id).unwrap().unwrap().name, "Sella Basmati");
    }

    #[test]
    fn test_featured_products() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample("Basmati Rice", "export", "India"));
        for i in 0..10 {
            let mut featured = sample(&format!("Spice {}", i), "export", "India");
            featured.featured = true;
            insert(&db, &featured);
        }
        let mut hidden = sample("Old Stock", "export", "India");
        hidden.featured = true;
        let hidden = insert(&db, &hidden);
        db.deactivate_product(hidden).unwrap();

        let featured = db.featured_products().unwrap();
        assert_eq!(featured.len(), 8);
        assert!(featured.iter().all(|p| p.featured));
        assert_eq!(featured[0].name, "Spice 9");
    }

    #[test]
    fn test_soft_delete_hides_from_public_reads() {
        let db = Database::open_in_memory().unwrap();
        let id = insert(&db, &sample("Basmati Rice", "export", "India"));

        assert!(db.deactivate_product(id).unwrap());
        assert!(!db.deactivate_product(9999).unwrap());

        assert_eq!(db.list_products(&ProductQuery::default()).unwrap().total, 0);
        assert!(db.view_product(id).unwrap().is_none());

        let stored = db.get_product(id).unwrap().unwrap();
        assert_eq!(stored.status, ProductStatus::Inactive);
    }
}
