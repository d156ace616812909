use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let dsn = matches.get_one::<String>("dsn").cloned();
    let credentials_file = matches.get_one::<String>("credentials-file").cloned();
    if dsn.is_none() && credentials_file.is_none() {
        anyhow::bail!("missing required argument: --credentials-file or --dsn");
    }

    Ok(Action::Server(Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        realm: matches
            .get_one::<String>("realm")
            .cloned()
            .context("missing required argument: --realm")?,
        max_attempts: matches.get_one::<u32>("max-attempts").copied().unwrap_or(3),
        decay_seconds: matches
            .get_one::<u64>("decay-seconds")
            .copied()
            .unwrap_or(300),
        session_ttl_seconds: matches
            .get_one::<u64>("session-ttl-seconds")
            .copied()
            .unwrap_or(7200),
        prune_interval_seconds: matches
            .get_one::<u64>("prune-interval-seconds")
            .copied()
            .unwrap_or(60),
        credentials_file,
        dsn,
        trust_proxy_headers: matches.get_flag("trust-proxy-headers"),
        secure_cookie: matches.get_flag("secure-cookie"),
    }))
}
