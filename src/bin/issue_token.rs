// Prints a signed access token for a user id.
//
// Usage: issue-token <user_id> [app_id] [email]
//
// Uses APP_SECRET and TOKEN_TTL_HOURS from the same configuration as the server.

use anyhow::{Context, Result};
use msgstore_server::auth::TokenIssuer;
use msgstore_server::Config;

fn main() -> Result<()> {
    let config = Config::from_env()?;

    let mut args = std::env::args().skip(1);
    let user_id: i64 = args
        .next()
        .context("usage: issue-token <user_id> [app_id] [email]")?
        .parse()
        .context("user_id must be an integer")?;
    let app_id: i32 = match args.next() {
        Some(raw) => raw.parse().context("app_id must be an integer")?,
        None => config.app_id.unwrap_or(1),
    };
    let email = args.next();

    let token = TokenIssuer::new(config.app_secret.as_bytes(), config.token_ttl_hours)
        .issue(user_id, app_id, email.as_deref())
        .context("Failed to sign token")?;

    println!("{}", token);
    Ok(())
}
