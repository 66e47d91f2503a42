//! Catalog product types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use afrovibz_core::{Category, ProductId, ProductStatus};

/// Highest rating a product can carry.
pub const MAX_RATING: f32 = 5.0;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub subcategory: String,
    pub brand: String,
    pub price: Decimal,
    /// Original price when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub stock: u32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is shown on the public storefront.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Whether any units are available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the product is discounted against its compare-at price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price.is_some_and(|original| original > self.price)
    }

    /// Discount against the compare-at price, in whole percent.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.compare_at_price.filter(|_| self.is_on_sale())?;
        let percent = (original - self.price) * Decimal::ONE_HUNDRED / original;
        percent.round().to_u32()
    }

    /// First image, used for cart lines and listings.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether `value` is one of the offered sizes (case-insensitive).
    #[must_use]
    pub fn offers_size(&self, value: &str) -> bool {
        self.sizes.iter().any(|s| s.eq_ignore_ascii_case(value))
    }

    /// Whether `value` is one of the offered colors (case-insensitive).
    #[must_use]
    pub fn offers_color(&self, value: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(value))
    }

    /// Whether a cart line's size and color are still valid choices.
    ///
    /// An absent size or color is valid only when the product offers none.
    #[must_use]
    pub fn offers_variant(&self, size: Option<&str>, color: Option<&str>) -> bool {
        let size_ok = match size {
            Some(size) => self.offers_size(size),
            None => self.sizes.is_empty(),
        };
        let color_ok = match color {
            Some(color) => self.offers_color(color),
            None => self.colors.is_empty(),
        };
        size_ok && color_ok
    }
}

/// Admin input for creating a product.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub subcategory: String,
    pub brand: String,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    /// New products are drafts unless stated otherwise.
    #[serde(default = "default_new_status")]
    pub status: ProductStatus,
}

const fn default_new_status() -> ProductStatus {
    ProductStatus::Draft
}

impl NewProduct {
    /// Check field-level constraints.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(
            &self.name,
            &self.subcategory,
            &self.brand,
            self.price,
            self.compare_at_price,
        )
    }
}

/// Admin input for a partial product update. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    /// `Some(None)` clears the compare-at price.
    #[serde(default, with = "double_option")]
    pub compare_at_price: Option<Option<Decimal>>,
    pub images: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub stock: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
}

impl ProductUpdate {
    /// Apply the update to a product and validate the result.
    ///
    /// The product is left untouched when validation fails.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn apply(self, product: &Product) -> Result<Product, String> {
        let mut updated = product.clone();
        if let Some(name) = self.name {
            updated.name = name.trim().to_string();
            updated.slug = slugify(&updated.name);
        }
        if let Some(description) = self.description {
            updated.description = description;
        }
        if let Some(category) = self.category {
            updated.category = category;
        }
        if let Some(subcategory) = self.subcategory {
            updated.subcategory = subcategory.trim().to_lowercase();
        }
        if let Some(brand) = self.brand {
            updated.brand = brand.trim().to_string();
        }
        if let Some(price) = self.price {
            updated.price = price;
        }
        if let Some(compare_at_price) = self.compare_at_price {
            updated.compare_at_price = compare_at_price;
        }
        if let Some(images) = self.images {
            updated.images = images;
        }
        if let Some(sizes) = self.sizes {
            updated.sizes = sizes;
        }
        if let Some(colors) = self.colors {
            updated.colors = colors;
        }
        if let Some(stock) = self.stock {
            updated.stock = stock;
        }
        if let Some(tags) = self.tags {
            updated.tags = tags;
        }
        if let Some(featured) = self.featured {
            updated.featured = featured;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }

        validate_fields(
            &updated.name,
            &updated.subcategory,
            &updated.brand,
            updated.price,
            updated.compare_at_price,
        )?;
        Ok(updated)
    }
}

fn validate_fields(
    name: &str,
    subcategory: &str,
    brand: &str,
    price: Decimal,
    compare_at_price: Option<Decimal>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name is required".to_string());
    }
    if subcategory.trim().is_empty() {
        return Err("subcategory is required".to_string());
    }
    if brand.trim().is_empty() {
        return Err("brand is required".to_string());
    }
    if price <= Decimal::ZERO {
        return Err("price must be greater than zero".to_string());
    }
    if compare_at_price.is_some_and(|original| original <= price) {
        return Err("compare_at_price must be greater than price".to_string());
    }
    Ok(())
}

/// Build a URL slug from a product name.
///
/// Runs of non-alphanumeric characters collapse to a single dash.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Distinguishes a missing field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Kente Bomber Jacket".to_string(),
            slug: "kente-bomber-jacket".to_string(),
            description: String::new(),
            category: Category::Fashion,
            subcategory: "men".to_string(),
            brand: "Accra Threads".to_string(),
            price: Decimal::new(8000, 2),
            compare_at_price: Some(Decimal::new(10000, 2)),
            images: vec!["/img/kente-bomber.jpg".to_string()],
            sizes: vec!["M".to_string(), "L".to_string()],
            colors: vec!["Gold".to_string()],
            stock: 3,
            rating: 4.5,
            review_count: 10,
            tags: Vec::new(),
            featured: false,
            status: ProductStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sale_and_discount() {
        let product = sample();
        assert!(product.is_on_sale());
        assert_eq!(product.discount_percent(), Some(20));
    }

    #[test]
    fn test_compare_at_below_price_is_not_a_sale() {
        let mut product = sample();
        product.compare_at_price = Some(Decimal::new(5000, 2));
        assert!(!product.is_on_sale());
        assert_eq!(product.discount_percent(), None);
    }

    #[test]
    fn test_offers_variant_case_insensitive() {
        let product = sample();
        assert!(product.offers_size("m"));
        assert!(product.offers_color("GOLD"));
        assert!(!product.offers_size("XS"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Kente Bomber -- Jacket!"), "kente-bomber-jacket");
        assert_eq!(slugify("  AirPods Pro (2nd Gen) "), "airpods-pro-2nd-gen");
    }

    #[test]
    fn test_update_apply_changes_slug_and_keeps_rest() {
        let product = sample();
        let update = ProductUpdate {
            name: Some("Kente Varsity Jacket".to_string()),
            stock: Some(9),
            ..ProductUpdate::default()
        };
        let updated = update.apply(&product).unwrap();
        assert_eq!(updated.slug, "kente-varsity-jacket");
        assert_eq!(updated.stock, 9);
        assert_eq!(updated.price, product.price);
    }

    #[test]
    fn test_update_apply_trims_like_create() {
        let update = ProductUpdate {
            name: Some("  Kente Varsity Jacket ".to_string()),
            subcategory: Some(" Outerwear ".to_string()),
            brand: Some(" Accra Threads  ".to_string()),
            ..ProductUpdate::default()
        };
        let updated = update.apply(&sample()).unwrap();
        assert_eq!(updated.name, "Kente Varsity Jacket");
        assert_eq!(updated.slug, "kente-varsity-jacket");
        assert_eq!(updated.subcategory, "outerwear");
        assert_eq!(updated.brand, "Accra Threads");
    }

    #[test]
    fn test_offers_variant_requires_current_options() {
        let mut product = sample();
        assert!(product.offers_variant(Some("M"), Some("Gold")));
        assert!(!product.offers_variant(None, Some("Gold")));
        assert!(!product.offers_variant(Some("M"), None));

        product.sizes = vec!["L".to_string()];
        assert!(!product.offers_variant(Some("M"), Some("Gold")));

        product.sizes.clear();
        product.colors.clear();
        assert!(product.offers_variant(None, None));
        assert!(!product.offers_variant(Some("L"), None));
    }

    #[test]
    fn test_update_rejects_invalid_price() {
        let update = ProductUpdate {
            price: Some(Decimal::new(20000, 2)),
            ..ProductUpdate::default()
        };
        let err = update.apply(&sample()).unwrap_err();
        assert!(err.contains("compare_at_price"));
    }

    #[test]
    fn test_update_null_clears_compare_at() {
        let update: ProductUpdate =
            serde_json::from_str(r#"{"compare_at_price": null}"#).unwrap();
        let updated = update.apply(&sample()).unwrap();
        assert_eq!(updated.compare_at_price, None);

        let untouched: ProductUpdate = serde_json::from_str("{}").unwrap();
        assert!(untouched.compare_at_price.is_none());
    }

    #[test]
    fn test_new_product_defaults_to_draft() {
        let input: NewProduct = serde_json::from_value(serde_json::json!({
            "name": "Dashiki Shirt",
            "category": "fashion",
            "subcategory": "men",
            "brand": "Lagos Loom",
            "price": "35.00"
        }))
        .unwrap();
        assert_eq!(input.status, ProductStatus::Draft);
        assert!(input.validate().is_ok());
    }
}
