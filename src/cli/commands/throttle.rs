use clap::{Arg, Command};

use crate::gate::DEFAULT_REALM;

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("realm")
                .long("realm")
                .help("Authentication realm, also the URL prefix")
                .long_help(
                    "Authentication realm. Routes are served under /<realm> and the session \
                     identity is stored per realm. Must match [a-z0-9][a-z0-9_-]*.",
                )
                .default_value(DEFAULT_REALM)
                .env("BASTION_REALM"),
        )
        .arg(
            Arg::new("max-attempts")
                .long("max-attempts")
                .help("Failed logins that lock a throttle key")
                .default_value("3")
                .env("BASTION_MAX_ATTEMPTS")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("decay-seconds")
                .long("decay-seconds")
                .help("Lockout length and failure counting window, in seconds")
                .default_value("300")
                .env("BASTION_DECAY_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("prune-interval-seconds")
                .long("prune-interval-seconds")
                .help("How often expired attempt records and sessions are deleted")
                .default_value("60")
                .env("BASTION_PRUNE_INTERVAL_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
