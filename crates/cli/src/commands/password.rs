//! Admin password hashing.
//!
//! The password is read from stdin so it never lands in shell history:
//!
//! ```bash
//! libra-cli hash-password
//! ```

use std::io::{BufRead, Write};

use libra_storefront::services::auth::hash_password;

/// Read one line from stdin and print its Argon2id PHC hash to stdout.
///
/// # Errors
///
/// Returns an error if stdin cannot be read, the password is too short or
/// hashing fails.
pub fn hash_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let mut stderr = std::io::stderr();
    write!(stderr, "Admin password: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);

    let hash = hash_password(password)?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "ADMIN_PASSWORD_HASH='{hash}'")?;
    Ok(())
}
