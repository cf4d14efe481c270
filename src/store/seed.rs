//! Starter catalog for fresh installs

use super::{products::NewProduct, Database};
use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    subcategory: &'static str,
    price: &'static str,
    min_order_quantity: &'static str,
    origin_country: &'static str,
    origin_region: &'static str,
    availability: &'static str,
    lead_time: &'static str,
    featured: bool,
    hs_code: &'static str,
    packaging: &'static str,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Premium Basmati Rice",
        description: "Long-grain basmati rice from the Himalayan foothills, export grade.",
        category: "export",
        subcategory: "Agricultural Products",
        price: "$450 per MT",
        min_order_quantity: "25 MT",
        origin_country: "India",
        origin_region: "Punjab",
        availability: "in-stock",
        lead_time: "15-20 days",
        featured: true,
        hs_code: "1006.30",
        packaging: "PP/Jute bags",
    },
    SeedProduct {
        name: "Industrial Machinery Parts",
        description: "Precision machinery parts and components, ISO certified manufacturing.",
        category: "import",
        subcategory: "Machinery",
        price: "Contact for Quotation",
        min_order_quantity: "100 units",
        origin_country: "Germany",
        origin_region: "Bavaria",
        availability: "made-to-order",
        lead_time: "30-45 days",
        featured: true,
        hs_code: "8479.90",
        packaging: "Wooden crates",
    },
    SeedProduct {
        name: "Organic Cotton Textiles",
        description: "GOTS certified organic cotton fabrics for fashion and home furnishing.",
        category: "export",
        subcategory: "Textiles",
        price: "$12 per meter",
        min_order_quantity: "5000 meters",
        origin_country: "India",
        origin_region: "Gujarat",
        availability: "in-stock",
        lead_time: "20-25 days",
        featured: true,
        hs_code: "5209.11",
        packaging: "Rolls/Bales",
    },
    SeedProduct {
        name: "Electronic Components",
        description: "Semiconductors, capacitors and circuit boards for electronics manufacturing.",
        category: "import",
        subcategory: "Electronics",
        price: "Varies by component",
        min_order_quantity: "1000 pieces",
        origin_country: "China",
        origin_region: "Shenzhen",
        availability: "in-stock",
        lead_time: "10-15 days",
        featured: false,
        hs_code: "8542.31",
        packaging: "Anti-static packaging",
    },
    SeedProduct {
        name: "Fresh Mangoes",
        description: "Alphonso and Kesar mangoes, export quality with phytosanitary certification.",
        category: "export",
        subcategory: "Fresh Fruits",
        price: "$800 per MT",
        min_order_quantity: "5 MT",
        origin_country: "India",
        origin_region: "Maharashtra",
        availability: "seasonal",
        lead_time: "5-7 days",
        featured: true,
        hs_code: "0804.50",
        packaging: "Corrugated boxes",
    },
    SeedProduct {
        name: "Customs Clearance Assistance",
        description: "Documentation and customs brokerage for inbound and outbound shipments.",
        category: "services",
        subcategory: "Customs",
        price: "Contact for Quotation",
        min_order_quantity: "1 shipment",
        origin_country: "India",
        origin_region: "Mumbai",
        availability: "in-stock",
        lead_time: "2-3 days",
        featured: false,
        hs_code: "",
        packaging: "",
    },
];

impl Database {
    /// Insert the starter catalog when no products exist yet.
    /// Returns the number of products inserted.
    pub fn seed_catalog(&self) -> Result<usize> {
        if self.count_products()? > 0 {
            info!("Catalog already populated, skipping seed");
            return Ok(0);
        }

        for item in CATALOG {
            let new = NewProduct {
                name: item.name.to_string(),
                description: item.description.to_string(),
                category: item.category.to_string(),
                subcategory: Some(item.subcategory.to_string()),
                price: Some(item.price.to_string()),
                min_order_quantity: Some(item.min_order_quantity.to_string()),
                origin_country: item.origin_country.to_string(),
                origin_region: Some(item.origin_region.to_string()),
                specifications: Some(json!({
                    "hsCode": item.hs_code,
                    "packaging": item.packaging,
                })),
                availability: Some(item.availability.to_string()),
                lead_time: Some(item.lead_time.to_string()),
                featured: item.featured,
                tags: vec![item.subcategory.to_lowercase()],
                ..Default::default()
            };
            let category = new
                .validate()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid seed product {}", item.name))?;
            self.create_product(&new, category)?;
        }

        info!("🌱 Seeded {} catalog products", CATALOG.len());
        Ok(CATALOG.len())
    }
}
