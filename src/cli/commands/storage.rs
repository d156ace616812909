use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Postgres connection string")
                .long_help(
                    "Postgres connection string. When set, login attempts and admin accounts \
                     are stored in the database and --credentials-file is not used.",
                )
                .env("BASTION_DSN"),
        )
        .arg(
            Arg::new("credentials-file")
                .long("credentials-file")
                .help("JSON file with admin accounts (Argon2 PHC hashes)")
                .env("BASTION_CREDENTIALS_FILE")
                .required_unless_present("dsn"),
        )
}
