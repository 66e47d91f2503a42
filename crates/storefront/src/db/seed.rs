//! Seed data for the mock catalog.
//!
//! The built-in catalog covers both departments so every filter and sort
//! has something to work on. A JSON file in the same shape (see
//! `afv-cli catalog export`) can replace it.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use afrovibz_core::{Category, ProductId, ProductStatus};

use super::RepositoryError;
use crate::models::Product;
use crate::models::product::{MAX_RATING, slugify};

struct SeedProduct {
    name: &'static str,
    category: Category,
    subcategory: &'static str,
    brand: &'static str,
    description: &'static str,
    price_cents: i64,
    compare_at_cents: Option<i64>,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    stock: u32,
    rating: f32,
    review_count: u32,
    tags: &'static [&'static str],
    featured: bool,
    status: ProductStatus,
    age_days: i64,
}

const APPAREL_SIZES: &[&str] = &["XS", "S", "M", "L", "XL"];
const SHOE_SIZES: &[&str] = &["39", "40", "41", "42", "43", "44"];

const SEED: &[SeedProduct] = &[
    SeedProduct {
        name: "Ankara Wrap Midi Dress",
        category: Category::Fashion,
        subcategory: "women",
        brand: "Lagos Loom",
        description: "Flowing wax-print midi with a tie waist and flutter sleeves.",
        price_cents: 6_500,
        compare_at_cents: Some(8_500),
        sizes: APPAREL_SIZES,
        colors: &["Indigo", "Sunset"],
        stock: 18,
        rating: 4.8,
        review_count: 126,
        tags: &["ankara", "dress", "wax print"],
        featured: true,
        status: ProductStatus::Active,
        age_days: 12,
    },
    SeedProduct {
        name: "Kente Bomber Jacket",
        category: Category::Fashion,
        subcategory: "men",
        brand: "Accra Threads",
        description: "Hand-woven kente panels on a lightweight satin bomber.",
        price_cents: 12_000,
        compare_at_cents: None,
        sizes: &["S", "M", "L", "XL"],
        colors: &["Gold", "Black"],
        stock: 7,
        rating: 4.6,
        review_count: 58,
        tags: &["kente", "jacket", "outerwear"],
        featured: true,
        status: ProductStatus::Active,
        age_days: 30,
    },
    SeedProduct {
        name: "Dashiki Linen Shirt",
        category: Category::Fashion,
        subcategory: "men",
        brand: "Lagos Loom",
        description: "Breathable linen shirt with an embroidered dashiki yoke.",
        price_cents: 4_500,
        compare_at_cents: None,
        sizes: &["S", "M", "L", "XL", "XXL"],
        colors: &["White", "Olive"],
        stock: 40,
        rating: 4.3,
        review_count: 41,
        tags: &["dashiki", "shirt", "linen"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 45,
    },
    SeedProduct {
        name: "Adire Indigo Kimono",
        category: Category::Fashion,
        subcategory: "women",
        brand: "Abeokuta Dye Works",
        description: "Hand-dyed adire cotton kimono, one size relaxed fit.",
        price_cents: 5_800,
        compare_at_cents: Some(7_200),
        sizes: &["One Size"],
        colors: &["Indigo"],
        stock: 3,
        rating: 4.9,
        review_count: 77,
        tags: &["adire", "kimono", "hand-dyed"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 8,
    },
    SeedProduct {
        name: "Maasai Beaded Sandals",
        category: Category::Fashion,
        subcategory: "shoes",
        brand: "Rift Valley Crafts",
        description: "Leather sandals finished with hand-strung Maasai beadwork.",
        price_cents: 3_900,
        compare_at_cents: None,
        sizes: SHOE_SIZES,
        colors: &["Red", "Blue"],
        stock: 25,
        rating: 4.4,
        review_count: 92,
        tags: &["beaded", "sandals", "leather"],
        featured: true,
        status: ProductStatus::Active,
        age_days: 60,
    },
    SeedProduct {
        name: "Afro Print High-Top Sneakers",
        category: Category::Fashion,
        subcategory: "shoes",
        brand: "Soweto Step",
        description: "Canvas high-tops with bold geometric print and gum sole.",
        price_cents: 8_900,
        compare_at_cents: Some(9_900),
        sizes: SHOE_SIZES,
        colors: &["Multi"],
        stock: 0,
        rating: 4.1,
        review_count: 33,
        tags: &["sneakers", "print"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 20,
    },
    SeedProduct {
        name: "Cowrie Shell Statement Necklace",
        category: Category::Fashion,
        subcategory: "accessories",
        brand: "Zanzibar Finds",
        description: "Layered cowrie shells on waxed cotton cord.",
        price_cents: 2_400,
        compare_at_cents: None,
        sizes: &[],
        colors: &["Natural"],
        stock: 55,
        rating: 4.7,
        review_count: 210,
        tags: &["jewelry", "cowrie"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 90,
    },
    SeedProduct {
        name: "Bogolan Mudcloth Tote",
        category: Category::Fashion,
        subcategory: "accessories",
        brand: "Bamako Makers",
        description: "Sturdy tote cut from authentic Malian mudcloth.",
        price_cents: 3_200,
        compare_at_cents: None,
        sizes: &[],
        colors: &["Black", "Cream"],
        stock: 12,
        rating: 4.5,
        review_count: 48,
        tags: &["bag", "mudcloth"],
        featured: false,
        status: ProductStatus::Draft,
        age_days: 2,
    },
    SeedProduct {
        name: "Talking Drum Wireless Earbuds",
        category: Category::Tech,
        subcategory: "audio",
        brand: "Sankofa Sound",
        description: "True wireless earbuds with active noise cancelling and 30h case.",
        price_cents: 7_999,
        compare_at_cents: Some(9_999),
        sizes: &[],
        colors: &["Black", "Ivory"],
        stock: 35,
        rating: 4.5,
        review_count: 311,
        tags: &["earbuds", "wireless", "anc"],
        featured: true,
        status: ProductStatus::Active,
        age_days: 15,
    },
    SeedProduct {
        name: "Savanna Bluetooth Speaker",
        category: Category::Tech,
        subcategory: "audio",
        brand: "Sankofa Sound",
        description: "Rugged waterproof speaker with 20 hours of playback.",
        price_cents: 5_499,
        compare_at_cents: None,
        sizes: &[],
        colors: &["Ochre", "Black"],
        stock: 4,
        rating: 4.2,
        review_count: 87,
        tags: &["speaker", "bluetooth", "outdoor"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 40,
    },
    SeedProduct {
        name: "Kilimanjaro 5G Smartphone",
        category: Category::Tech,
        subcategory: "phones",
        brand: "Tecno Nova",
        description: "6.7-inch AMOLED, 256GB storage, dual SIM with 5000mAh battery.",
        price_cents: 42_900,
        compare_at_cents: Some(47_900),
        sizes: &[],
        colors: &["Midnight", "Sahara Gold"],
        stock: 9,
        rating: 4.4,
        review_count: 152,
        tags: &["smartphone", "5g", "dual sim"],
        featured: true,
        status: ProductStatus::Active,
        age_days: 5,
    },
    SeedProduct {
        name: "Solar Power Bank 20000mAh",
        category: Category::Tech,
        subcategory: "accessories",
        brand: "SunCharge",
        description: "Solar-assisted power bank with USB-C PD and built-in torch.",
        price_cents: 3_499,
        compare_at_cents: None,
        sizes: &[],
        colors: &["Green", "Black"],
        stock: 60,
        rating: 4.0,
        review_count: 264,
        tags: &["power bank", "solar", "usb-c"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 75,
    },
    SeedProduct {
        name: "Nairobi Pro 14 Laptop",
        category: Category::Tech,
        subcategory: "laptops",
        brand: "Silicon Savannah",
        description: "14-inch ultrabook, 16GB RAM, 512GB SSD, all-day battery.",
        price_cents: 89_900,
        compare_at_cents: None,
        sizes: &[],
        colors: &["Space Grey"],
        stock: 5,
        rating: 4.6,
        review_count: 64,
        tags: &["laptop", "ultrabook"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 25,
    },
    SeedProduct {
        name: "Kente Weave Phone Case",
        category: Category::Tech,
        subcategory: "accessories",
        brand: "Accra Threads",
        description: "Shock-absorbing case wrapped in kente-pattern fabric.",
        price_cents: 1_999,
        compare_at_cents: Some(2_499),
        sizes: &[],
        colors: &["Gold", "Green"],
        stock: 80,
        rating: 4.3,
        review_count: 119,
        tags: &["case", "kente"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 35,
    },
    SeedProduct {
        name: "Serengeti Smartwatch",
        category: Category::Tech,
        subcategory: "wearables",
        brand: "Tecno Nova",
        description: "AMOLED smartwatch with heart-rate, SpO2 and GPS.",
        price_cents: 14_900,
        compare_at_cents: None,
        sizes: &["40mm", "44mm"],
        colors: &["Black", "Rose Gold"],
        stock: 14,
        rating: 3.9,
        review_count: 45,
        tags: &["watch", "fitness", "gps"],
        featured: false,
        status: ProductStatus::Active,
        age_days: 18,
    },
    SeedProduct {
        name: "Retro Boombox Radio",
        category: Category::Tech,
        subcategory: "audio",
        brand: "Highlife Audio",
        description: "Cassette-style FM/Bluetooth boombox. Discontinued.",
        price_cents: 6_900,
        compare_at_cents: None,
        sizes: &[],
        colors: &["Silver"],
        stock: 2,
        rating: 4.0,
        review_count: 12,
        tags: &["radio", "retro"],
        featured: false,
        status: ProductStatus::Archived,
        age_days: 200,
    },
];

/// The built-in demo catalog, with IDs starting at 1.
#[must_use]
pub fn demo_products() -> Vec<Product> {
    let now = Utc::now();
    SEED.iter()
        .zip(1u32..)
        .map(|(seed, id)| Product {
            id: ProductId::new(id),
            name: seed.name.to_string(),
            slug: slugify(seed.name),
            description: seed.description.to_string(),
            category: seed.category,
            subcategory: seed.subcategory.to_string(),
            brand: seed.brand.to_string(),
            price: Decimal::new(seed.price_cents, 2),
            compare_at_price: seed.compare_at_cents.map(|cents| Decimal::new(cents, 2)),
            images: vec![format!("/images/products/{}.jpg", slugify(seed.name))],
            sizes: to_strings(seed.sizes),
            colors: to_strings(seed.colors),
            stock: seed.stock,
            rating: seed.rating,
            review_count: seed.review_count,
            tags: to_strings(seed.tags),
            featured: seed.featured,
            status: seed.status,
            created_at: now - Duration::days(seed.age_days),
        })
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Load a catalog from a JSON array of products.
///
/// # Errors
///
/// Returns `RepositoryError::Seed` if the file cannot be read or parsed, or
/// if any product is invalid.
pub fn from_json_file(path: &Path) -> Result<Vec<Product>, RepositoryError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| RepositoryError::Seed(format!("{}: {e}", path.display())))?;
    let products = parse_catalog(&raw)?;
    tracing::info!(path = %path.display(), count = products.len(), "Loaded catalog file");
    Ok(products)
}

/// Parse and validate a JSON catalog.
///
/// # Errors
///
/// Returns `RepositoryError::Seed` on malformed JSON, duplicate IDs, or
/// invalid product fields.
pub fn parse_catalog(raw: &str) -> Result<Vec<Product>, RepositoryError> {
    let products: Vec<Product> =
        serde_json::from_str(raw).map_err(|e| RepositoryError::Seed(e.to_string()))?;

    let mut seen = HashSet::new();
    for product in &products {
        if !seen.insert(product.id) {
            return Err(RepositoryError::Seed(format!(
                "duplicate product id {}",
                product.id
            )));
        }
        validate_seeded(product)
            .map_err(|msg| RepositoryError::Seed(format!("product {}: {msg}", product.id)))?;
    }
    Ok(products)
}

fn validate_seeded(product: &Product) -> Result<(), String> {
    if product.name.trim().is_empty() {
        return Err("name is required".to_string());
    }
    if product.price <= Decimal::ZERO {
        return Err("price must be greater than zero".to_string());
    }
    if product
        .compare_at_price
        .is_some_and(|original| original <= product.price)
    {
        return Err("compare_at_price must be greater than price".to_string());
    }
    if !(0.0..=MAX_RATING).contains(&product.rating) {
        return Err(format!("rating must be between 0 and {MAX_RATING}"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_is_valid() {
        let products = demo_products();
        assert!(products.len() >= 12);
        for product in &products {
            validate_seeded(product).unwrap();
        }
        assert!(products.iter().any(|p| p.category == Category::Fashion));
        assert!(products.iter().any(|p| p.category == Category::Tech));
        assert!(products.iter().any(|p| !p.is_visible()));
    }

    #[test]
    fn test_demo_ids_are_sequential() {
        let products = demo_products();
        for (product, expected) in products.iter().zip(1u32..) {
            assert_eq!(product.id.as_u32(), expected);
        }
    }

    #[test]
    fn test_parse_roundtrips_demo_catalog() {
        let json = serde_json::to_string(&demo_products()).unwrap();
        let parsed = parse_catalog(&json).unwrap();
        assert_eq!(parsed.len(), demo_products().len());
    }

    #[test]
    fn test_parse_rejects_duplicate_ids() {
        let mut products = demo_products();
        let first = products.first().cloned().unwrap();
        products.push(first);
        let json = serde_json::to_string(&products).unwrap();
        let err = parse_catalog(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate product id 1"));
    }

    #[test]
    fn test_parse_rejects_bad_rating() {
        let mut products = demo_products();
        products.truncate(1);
        if let Some(p) = products.first_mut() {
            p.rating = 7.5;
        }
        let json = serde_json::to_string(&products).unwrap();
        assert!(parse_catalog(&json).is_err());
    }
}
