//! Seed the database with demo data for local development.
//!
//! Creates a vendor account, a few categories and products, and a demo
//! coupon. Safe to run only against an empty development database; reruns
//! fail on unique constraints.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

use farmlink_core::{CouponCode, Email, UserRole};

use farmlink_api::db::{CategoryRepository, CouponRepository, ProductRepository, UserRepository};
use farmlink_api::services::auth::hash_password;

/// Demo products: (name, description, category, price in cents, quantity).
const DEMO_PRODUCTS: &[(&str, &str, &str, i64, i32)] = &[
    (
        "Honeycrisp Apples",
        "Crisp, sweet apples picked this week. 5lb box.",
        "fruit",
        1250,
        40,
    ),
    (
        "Free-Range Eggs",
        "One dozen eggs from pasture-raised hens.",
        "dairy",
        450,
        120,
    ),
    (
        "Heirloom Tomatoes",
        "Mixed heirloom varieties, 2lb.",
        "vegetables",
        600,
        75,
    ),
];

/// Seed demo data.
///
/// # Errors
///
/// Returns an error if any insert fails (including unique-constraint
/// violations on rerun).
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let users = UserRepository::new(&pool);
    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let coupons = CouponRepository::new(&pool);

    info!("Seeding demo vendor...");
    let vendor_email = Email::parse("vendor@farmlink.dev")?;
    let password_hash = hash_password("demo-vendor-password")?;
    let vendor = users
        .create(
            "Green Acres Farm",
            &vendor_email,
            None,
            &password_hash,
            UserRole::Vendor,
        )
        .await?;

    info!("Seeding categories and products...");
    for (name, description, category_name, price_cents, qty) in DEMO_PRODUCTS {
        let category = match categories.get_by_name(category_name).await? {
            Some(existing) => existing,
            None => categories.create(category_name, None, vendor.id).await?,
        };

        products
            .create(
                name,
                description,
                category.id,
                &[],
                &[],
                &[format!(
                    "https://images.farmlink.dev/demo/{}.jpg",
                    name.to_lowercase().replace(' ', "-")
                )],
                Decimal::new(*price_cents, 2),
                *qty,
                vendor.id,
            )
            .await?;
    }

    info!("Seeding demo coupon...");
    let now = Utc::now();
    coupons
        .create(
            &CouponCode::parse("SAVE10")?,
            Decimal::new(10, 0),
            now,
            now + Duration::days(30),
            vendor.id,
        )
        .await?;

    info!("Seed complete");
    Ok(())
}
