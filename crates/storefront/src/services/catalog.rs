//! Catalog queries: filtering, sorting, pagination, facets and related
//! products.
//!
//! These functions work on a product slice so they can run under the
//! repository's read lock (see `ProductRepository::with_products`).

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use afrovibz_core::{Category, ProductId, ProductStatus};

use crate::models::Product;

/// Default page size for listings.
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 48;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Featured products first, then newest.
    #[default]
    Featured,
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
    Name,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "rating" => Ok(Self::Rating),
            "name" => Ok(Self::Name),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Which products a listing may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Active products only; the `status` filter is ignored.
    Public,
    /// Every status, optionally narrowed by the `status` filter.
    All,
}

/// Listing filters, sort and page. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    /// Free-text search over name, brand, description and tags.
    pub q: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub on_sale: Option<bool>,
    pub status: Option<ProductStatus>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductQuery {
    /// Requested page, at least 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    fn matches(&self, product: &Product, visibility: Visibility) -> bool {
        let status_ok = match visibility {
            Visibility::Public => product.is_visible(),
            Visibility::All => self.status.is_none_or(|s| product.status == s),
        };

        status_ok
            && self.category.is_none_or(|c| product.category == c)
            && self
                .subcategory
                .as_deref()
                .is_none_or(|s| product.subcategory.eq_ignore_ascii_case(s.trim()))
            && self
                .brand
                .as_deref()
                .is_none_or(|b| product.brand.eq_ignore_ascii_case(b.trim()))
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
            && self.size.as_deref().is_none_or(|s| product.offers_size(s.trim()))
            && self
                .color
                .as_deref()
                .is_none_or(|c| product.offers_color(c.trim()))
            && self.in_stock.is_none_or(|want| product.in_stock() == want)
            && self.featured.is_none_or(|want| product.featured == want)
            && self.on_sale.is_none_or(|want| product.is_on_sale() == want)
            && self.q.as_deref().is_none_or(|q| matches_text(product, q))
    }
}

/// Every whitespace-separated term must appear somewhere in the product's
/// searchable text.
fn matches_text(product: &Product, q: &str) -> bool {
    let haystack = format!(
        "{} {} {} {} {}",
        product.name,
        product.brand,
        product.subcategory,
        product.description,
        product.tags.join(" ")
    )
    .to_lowercase();

    q.split_whitespace()
        .all(|term| haystack.contains(&term.to_lowercase()))
}

fn compare(sort: SortOrder, a: &Product, b: &Product) -> Ordering {
    let primary = match sort {
        SortOrder::Featured => b
            .featured
            .cmp(&a.featured)
            .then_with(|| b.created_at.cmp(&a.created_at)),
        SortOrder::Newest => b.created_at.cmp(&a.created_at),
        SortOrder::PriceAsc => a.price.cmp(&b.price),
        SortOrder::PriceDesc => b.price.cmp(&a.price),
        SortOrder::Rating => b
            .rating
            .total_cmp(&a.rating)
            .then_with(|| b.review_count.cmp(&a.review_count)),
        SortOrder::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches across all pages.
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Slice one page out of the full, already-sorted result set.
    ///
    /// Pages past the end are empty but keep the totals.
    #[must_use]
    pub fn paginate(all: Vec<T>, page: u32, per_page: u32) -> Self {
        let total = all.len();
        let per_page_len = per_page as usize;
        let total_pages = u32::try_from(total.div_ceil(per_page_len)).unwrap_or(u32::MAX);
        let skip = (page.saturating_sub(1) as usize).saturating_mul(per_page_len);

        Self {
            items: all.into_iter().skip(skip).take(per_page_len).collect(),
            total,
            page,
            per_page,
            total_pages,
        }
    }

    /// Convert the items, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Filter, sort and paginate the catalog.
#[must_use]
pub fn search(products: &[Product], query: &ProductQuery, visibility: Visibility) -> Page<Product> {
    let sort = query.sort.unwrap_or_default();
    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|p| query.matches(p, visibility))
        .collect();
    matched.sort_by(|a, b| compare(sort, a, b));

    Page::paginate(
        matched.into_iter().cloned().collect(),
        query.page(),
        query.per_page(),
    )
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Values available for narrowing a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Facets {
    pub categories: Vec<CategoryFacet>,
    pub brands: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    /// `None` when no product matches.
    pub price: Option<PriceRange>,
}

/// Product count and subcategories for one department.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryFacet {
    pub category: Category,
    pub count: usize,
    pub subcategories: Vec<String>,
}

/// Facets over active products, optionally within one category.
#[must_use]
pub fn facets(products: &[Product], category: Option<Category>) -> Facets {
    let active: Vec<&Product> = products.iter().filter(|p| p.is_visible()).collect();

    let categories = [Category::Fashion, Category::Tech]
        .into_iter()
        .map(|c| {
            let in_category = active.iter().filter(|p| p.category == c);
            let subcategories: BTreeSet<String> =
                in_category.clone().map(|p| p.subcategory.clone()).collect();
            CategoryFacet {
                category: c,
                count: in_category.count(),
                subcategories: subcategories.into_iter().collect(),
            }
        })
        .collect();

    let scoped: Vec<&Product> = active
        .into_iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .collect();

    let brands: BTreeSet<String> = scoped.iter().map(|p| p.brand.clone()).collect();
    let sizes: BTreeSet<String> = scoped.iter().flat_map(|p| p.sizes.clone()).collect();
    let colors: BTreeSet<String> = scoped.iter().flat_map(|p| p.colors.clone()).collect();

    let price = scoped
        .iter()
        .map(|p| p.price)
        .min()
        .zip(scoped.iter().map(|p| p.price).max())
        .map(|(min, max)| PriceRange { min, max });

    Facets {
        categories,
        brands: brands.into_iter().collect(),
        sizes: sizes.into_iter().collect(),
        colors: colors.into_iter().collect(),
        price,
    }
}

/// Up to `limit` active products related to `id`.
///
/// Products in the same subcategory come first, then the rest of the
/// category; each group is ordered by rating.
#[must_use]
pub fn related(products: &[Product], id: ProductId, limit: usize) -> Vec<Product> {
    let Some(source) = products.iter().find(|p| p.id == id) else {
        return Vec::new();
    };

    let mut candidates: Vec<&Product> = products
        .iter()
        .filter(|p| p.id != id && p.is_visible() && p.category == source.category)
        .collect();

    candidates.sort_by(|a, b| {
        let a_same = a.subcategory == source.subcategory;
        let b_same = b.subcategory == source.subcategory;
        b_same
            .cmp(&a_same)
            .then_with(|| compare(SortOrder::Rating, a, b))
    });

    candidates.into_iter().take(limit).cloned().collect()
}
