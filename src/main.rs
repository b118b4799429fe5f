use std::io::BufRead;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credential_vault::{
    hash_password,
    services::vault,
    Config, Tier, TokenAuthority, TokenClaims,
};

const USAGE: &str = "usage: credential-vault <command>

commands:
  generate-key                          print a random 32-byte key as hex
  derive-key <passphrase> [salt-hex]    derive a key with PBKDF2 and print key and salt
  hash-password                         read a password from stdin and print its record
  issue-token <subject> <email> <tier>  issue a session token
  verify-token <token>                  print the principal carried by a token";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["generate-key"] => {
            let key = vault::generate_key();
            println!("{}", hex::encode(key.as_bytes()));
        }
        ["derive-key", passphrase, rest @ ..] if rest.len() <= 1 => {
            let salt = rest
                .first()
                .map(|s| hex::decode(s).context("salt must be hex"))
                .transpose()?;
            let (key, salt) = vault::derive_key(passphrase, salt.as_deref())?;
            println!("key:  {}", hex::encode(key.as_bytes()));
            println!("salt: {}", hex::encode(salt));
        }
        ["hash-password"] => {
            let mut line = zeroize::Zeroizing::new(String::new());
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read password from stdin")?;
            let password = line.trim_end_matches(['\r', '\n']);
            if password.is_empty() {
                bail!("password cannot be empty");
            }
            println!("{}", hash_password(password)?);
        }
        ["issue-token", subject, email, tier] => {
            let authority = TokenAuthority::new(&load_config()?);
            let tier: Tier = tier.parse()?;
            let token = authority.issue_token(&TokenClaims::new(*subject, *email, tier))?;
            println!("{}", token);
        }
        ["verify-token", token] => {
            let authority = TokenAuthority::new(&load_config()?);
            match authority.verify_token(token) {
                Some(principal) => println!("{}", sonic_rs::to_string_pretty(&principal)?),
                None => bail!("token rejected"),
            }
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");
    Ok(config)
}
