//! Interactive provisioning of admin accounts.
//!
//! Usage:
//!   cargo run -p linkroom-api --bin register-admin
//!   cargo run -p linkroom-api --bin register-admin -- --super-admin

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use linkroom_api::auth::password::hash_password;
use linkroom_api::store::{self, StoreError};

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// The in-memory store only lives as long as this process.
fn is_persistent(database_url: &str) -> bool {
    !database_url.starts_with("memory:")
}

#[tokio::main]
async fn main() -> ExitCode {
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    let is_super_admin = std::env::args().any(|arg| arg == "--super-admin");
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL env var is required");
        return ExitCode::FAILURE;
    };
    if !is_persistent(&database_url) {
        eprintln!("DATABASE_URL points at the in-memory store; accounts created there are lost on exit.");
        return ExitCode::FAILURE;
    }

    let username = match prompt("Enter admin username") {
        Ok(name) if !name.is_empty() => name,
        Ok(_) => {
            eprintln!("Username must not be empty.");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("Failed to read username: {err}");
            return ExitCode::FAILURE;
        }
    };

    print!("Enter admin password: ");
    if let Err(err) = io::stdout().flush() {
        eprintln!("Failed to write prompt: {err}");
        return ExitCode::FAILURE;
    }
    let password = match rpassword::read_password() {
        Ok(password) if !password.is_empty() => password,
        Ok(_) => {
            eprintln!("Password must not be empty.");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("Failed to read password: {err}");
            return ExitCode::FAILURE;
        }
    };

    let hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(err) => {
            eprintln!("Error hashing password: {}", err.message);
            return ExitCode::FAILURE;
        }
    };

    let store = match store::open(&database_url, 1) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Error opening store: {err}");
            return ExitCode::FAILURE;
        }
    };

    match store.create_user(&username, &hash, is_super_admin).await {
        Ok(user) => {
            let role = if user.is_super_admin { "Super-admin" } else { "Admin" };
            println!("{role} user '{}' created with id {}.", user.username, user.id);
            ExitCode::SUCCESS
        }
        Err(StoreError::Conflict { .. }) => {
            eprintln!("Error: Username '{username}' already exists.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error creating admin user: {err}");
            ExitCode::FAILURE
        }
    }
}
