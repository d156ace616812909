use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

use crate::{
    api::{self, AppState, HttpConfig},
    clock::{Clock, SystemClock},
    credentials::{CredentialStore, FileCredentialStore, PgCredentialStore},
    db,
    gate::{AuthenticationGate, Realm},
    session::MemorySessionStore,
    throttle::{AttemptTracker, LockoutPolicy, MemoryAttemptTracker, PgAttemptTracker},
};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub realm: String,
    pub max_attempts: u32,
    pub decay_seconds: u64,
    pub session_ttl_seconds: u64,
    pub prune_interval_seconds: u64,
    pub credentials_file: Option<String>,
    pub dsn: Option<String>,
    pub trust_proxy_headers: bool,
    pub secure_cookie: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid, storage cannot be opened,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let realm = Realm::new(&args.realm).context("Invalid --realm")?;
    let policy = LockoutPolicy::new(args.max_attempts, args.decay_seconds)
        .context("Invalid lockout policy")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (tracker, credentials, pool): (Arc<dyn AttemptTracker>, Arc<dyn CredentialStore>, _) =
        if let Some(dsn) = &args.dsn {
            let pool = db::connect(dsn).await?;
            db::apply_schema(&pool).await?;
            (
                Arc::new(PgAttemptTracker::new(pool.clone(), policy, clock.clone())),
                Arc::new(PgCredentialStore::new(pool.clone())),
                Some(pool),
            )
        } else {
            let path = args
                .credentials_file
                .as_deref()
                .context("--credentials-file is required without --dsn")?;
            (
                Arc::new(MemoryAttemptTracker::new(policy, clock.clone())),
                Arc::new(FileCredentialStore::open(path).await?),
                None,
            )
        };

    let sessions = Arc::new(MemorySessionStore::new(
        Duration::from_secs(args.session_ttl_seconds),
        clock,
    ));
    let gate = AuthenticationGate::new(realm, policy, tracker, credentials);
    let config = HttpConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_secure_cookie(args.secure_cookie)
        .with_trust_proxy_headers(args.trust_proxy_headers);

    let mut state = AppState::new(gate, sessions, config);
    if let Some(pool) = pool {
        state = state.with_pool(pool);
    }

    info!(
        "Serving realm {} at {}/login",
        state.realm(),
        state.realm().prefix()
    );

    api::serve(
        args.port,
        Arc::new(state),
        Duration::from_secs(args.prune_interval_seconds),
    )
    .await
}

fn log_startup_args(args: &Args) {
    let storage = if args.dsn.is_some() {
        "postgres"
    } else {
        "memory + credentials file"
    };
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("realm", args.realm.clone()),
        ("storage", storage.to_string()),
        (
            "dsn",
            args.dsn
                .as_deref()
                .map_or_else(|| "none".to_string(), redact_dsn),
        ),
        (
            "credentials_file",
            args.credentials_file
                .clone()
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        ("max_attempts", args.max_attempts.to_string()),
        ("decay_seconds", args.decay_seconds.to_string()),
        ("session_ttl_seconds", args.session_ttl_seconds.to_string()),
        (
            "prune_interval_seconds",
            args.prune_interval_seconds.to_string(),
        ),
        ("trust_proxy_headers", args.trust_proxy_headers.to_string()),
        ("secure_cookie", args.secure_cookie.to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", bastion_banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn bastion_banner() -> String {
    BASTION_BANNER.replace(
        "{VERSION}",
        &format!(
            " - {} - {}",
            env!("CARGO_PKG_VERSION"),
            short_commit(crate::GIT_COMMIT_HASH)
        ),
    )
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

const BASTION_BANNER: &str = r"
  |-|-|   |-|-|
  |   |___|   |
  |  _     _  |   B A S T I O N {VERSION}
  | | |   | | |
  |___________|";
