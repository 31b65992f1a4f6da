use bcrypt::{DEFAULT_COST, hash};
use std::env;

fn main() {
    let mut args = env::args().skip(1);
    let (email, password) = match (args.next(), args.next()) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            eprintln!("Usage: cargo run --bin hash-password <EMAIL> <PASSWORD>");
            std::process::exit(1);
        }
    };

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => {
            println!("\nEmail : {}", email);
            println!("Cost  : {}", DEFAULT_COST);
            println!("Hash  : {}\n", hashed);
            println!("-- Run this against the database to provision the admin:");
            println!(
                "INSERT INTO users (name, email, password_hash, role)\n\
                 VALUES ('Admin', '{}', '{}', 'admin')\n\
                 ON CONFLICT (email)\n\
                 DO UPDATE SET password_hash = EXCLUDED.password_hash, role = 'admin';",
                email, hashed
            );
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
