//! Catalog inspection and export.
//!
//! # Environment Variables
//!
//! - `AFROVIBZ_CATALOG_PATH` - Catalog file used when `--catalog` is not given

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use afrovibz_core::{Category, CurrencyCode, Price};
use afrovibz_storefront::db::{RepositoryError, seed};
use afrovibz_storefront::models::Product;
use afrovibz_storefront::services::catalog::{self, MAX_PER_PAGE, ProductQuery, SortOrder, Visibility};

/// Longest product name printed before truncation.
const NAME_WIDTH: usize = 34;

/// Errors from catalog commands.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be loaded.
    #[error(transparent)]
    Load(#[from] RepositoryError),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Catalog export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// JSON array, loadable via `AFROVIBZ_CATALOG_PATH`
    Json,
    /// YAML list, for reading
    Yaml,
}

/// Load the catalog from `path`, `AFROVIBZ_CATALOG_PATH`, or the demo seed.
///
/// # Errors
///
/// Returns an error if a catalog file is given but cannot be loaded.
pub fn load(path: Option<PathBuf>) -> Result<Vec<Product>, CatalogError> {
    dotenvy::dotenv().ok();

    let path = path.or_else(|| {
        std::env::var("AFROVIBZ_CATALOG_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });

    match path {
        Some(path) => Ok(seed::from_json_file(&path)?),
        None => Ok(seed::demo_products()),
    }
}

/// Print matching products as a table on stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn list(
    products: &[Product],
    category: Option<Category>,
    q: Option<String>,
    sort: SortOrder,
    include_all: bool,
) -> Result<(), CatalogError> {
    let visibility = if include_all {
        Visibility::All
    } else {
        Visibility::Public
    };
    let mut query = ProductQuery {
        category,
        q,
        sort: Some(sort),
        per_page: Some(MAX_PER_PAGE),
        ..ProductQuery::default()
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "{:>4}  {:<NAME_WIDTH$}  {:<8}  {:>10}  {:>5}  {:<8}",
        "ID", "NAME", "CATEGORY", "PRICE", "STOCK", "STATUS"
    )?;

    let mut page = 1;
    let total = loop {
        query.page = Some(page);
        let result = catalog::search(products, &query, visibility);
        for product in &result.items {
            writeln!(stdout, "{}", row(product))?;
        }
        if page >= result.total_pages {
            break result.total;
        }
        page += 1;
    };

    writeln!(stdout, "\n{total} product(s)")?;
    Ok(())
}

fn row(product: &Product) -> String {
    let name = if product.name.chars().count() > NAME_WIDTH {
        let cut: String = product.name.chars().take(NAME_WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        product.name.clone()
    };
    let sale = if product.is_on_sale() { "*" } else { " " };

    format!(
        "{:>4}  {:<NAME_WIDTH$}  {:<8}  {:>10}{sale} {:>5}  {:<8}",
        product.id.to_string(),
        name,
        product.category.as_str(),
        Price::new(product.price, CurrencyCode::default()).display(),
        product.stock,
        product.status.as_str(),
    )
}

/// Write the catalog to `output`, or stdout when `None`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub async fn export(
    products: &[Product],
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<(), CatalogError> {
    let mut body = match format {
        ExportFormat::Json => serde_json::to_string_pretty(products)?,
        ExportFormat::Yaml => serde_yaml::to_string(products)?,
    };
    if !body.ends_with('\n') {
        body.push('\n');
    }

    match output {
        Some(path) => {
            tokio::fs::write(path, body).await?;
            tracing::info!(path = %path.display(), count = products.len(), ?format, "Catalog exported");
        }
        None => std::io::stdout().lock().write_all(body.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_export_reloads() {
        let products = seed::demo_products();
        let json = serde_json::to_string_pretty(&products).unwrap();
        let reloaded = seed::parse_catalog(&json).unwrap();
        assert_eq!(reloaded.len(), products.len());
    }

    #[test]
    fn test_row_marks_sale_and_truncates() {
        let mut product = seed::demo_products().into_iter().next().unwrap();
        assert!(row(&product).contains("$65.00*"));

        product.name = "An Extraordinarily Long Product Name For Testing".to_string();
        assert!(row(&product).contains("An Extraordinarily Long Product..."));
    }
}
