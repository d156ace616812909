use clap::{builder::BoolishValueParser, Arg, ArgAction, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session lifetime and cookie Max-Age, in seconds")
                .default_value("7200")
                .env("BASTION_SESSION_TTL_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("trust-proxy-headers")
                .long("trust-proxy-headers")
                .help("Take the client address from X-Forwarded-For / X-Real-IP")
                .env("BASTION_TRUST_PROXY_HEADERS")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new("secure-cookie")
                .long("secure-cookie")
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("BASTION_SECURE_COOKIE")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
}
