//! Admin user management commands.

use rand::Rng as _;
use rand::distr::Alphanumeric;
use tracing::info;

use farmlink_core::{Email, UserRole};

use farmlink_api::db::UserRepository;
use farmlink_api::services::auth::hash_password;

/// Length of generated admin passwords.
const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Create an admin user with a generated password.
///
/// The password is printed once; it should be changed after first login.
///
/// # Errors
///
/// Returns an error if the email is invalid, the account already exists,
/// or the database is unreachable.
pub async fn create_user(email: &str, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let pool = super::connect().await?;

    let password: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect();
    let password_hash = hash_password(&password)?;

    let users = UserRepository::new(&pool);
    let user = users
        .create(name, &email, None, &password_hash, UserRole::Admin)
        .await?;

    info!(user_id = %user.id, email = %user.email, "Admin user created");

    #[allow(clippy::print_stdout)]
    {
        println!("Admin user created: {}", user.email);
        println!("Generated password: {password}");
        println!("Change it after first login.");
    }

    Ok(())
}
