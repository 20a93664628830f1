//! Seed the catalog with the sample textbooks.
//!
//! By default seeding is idempotent: products no order refers to are
//! removed, then every sample book that is not already present (same title
//! and grade) is inserted. `--replace` empties the catalog first.

use libra_storefront::db::{self, ProductRepository, products::NewProduct};
use rust_decimal::Decimal;
use tracing::info;

use super::{CommandError, database_url};

/// Cover image shared by every sample book.
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x400?text=Liber";

/// Initial stock for seeded books.
const DEFAULT_STOCK: i32 = 100;

/// `(grade, title, author, price in cents)`.
const SAMPLE_BOOKS: [(i16, &str, &str, i64); 18] = [
    (1, "Abetare", "Grupi Autorëve", 450),
    (1, "Matematikë 1", "A. Hoxha", 590),
    (2, "Gjuha Shqipe 2", "M. Krasniqi", 620),
    (2, "Matematikë 2", "R. Berisha", 650),
    (3, "Dituri Natyre 3", "E. Dervishi", 700),
    (3, "Leximi 3", "N. Gashi", 680),
    (4, "Gjuha Shqipe 4", "A. Islami", 720),
    (4, "Matematikë 4", "L. Shala", 740),
    (5, "Histori 5", "K. Rexhepi", 830),
    (5, "Gjeografi 5", "B. Peci", 810),
    (6, "Biologji 6", "D. Sahiti", 920),
    (6, "Fizikë 6", "A. Aliu", 950),
    (7, "Kimi 7", "E. Mustafa", 1020),
    (7, "Letërsi 7", "R. Krasniqi", 1000),
    (8, "Matematikë 8", "S. Hoxha", 1150),
    (8, "Gjeometri 8", "M. Mehmeti", 1100),
    (9, "Fizikë 9", "L. Berisha", 1240),
    (9, "Gjuha Shqipe 9", "V. Hoti", 1200),
];

/// Seed the catalog.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a write fails.
pub async fn catalog(replace: bool) -> Result<(), CommandError> {
    let database_url = database_url()?;

    info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;
    let products = ProductRepository::new(pool);

    let removed = if replace {
        products.clear().await?
    } else {
        products.clear_unreferenced().await?
    };
    info!(removed, replace, "Cleared existing products");

    let mut inserted = 0_usize;
    for (grade, title, author, cents) in SAMPLE_BOOKS {
        if products.find_id(title, grade).await?.is_some() {
            continue;
        }

        let description = description(grade);
        products
            .insert(&NewProduct {
                title,
                author: Some(author),
                grade,
                price: Decimal::new(cents, 2),
                image_url: Some(PLACEHOLDER_IMAGE),
                description: Some(&description),
                stock: DEFAULT_STOCK,
            })
            .await?;
        inserted += 1;
    }

    let total = products.count().await?;
    info!(inserted, total, "Catalog seeded");
    Ok(())
}

fn description(grade: i16) -> String {
    format!("Liber mësimor për klasën {grade}.")
}
