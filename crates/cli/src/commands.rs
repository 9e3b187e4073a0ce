//! Clap command tree definition.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("wikivault")
        .about("Archive a DokuWiki tree into a redacted .tar.zst backup")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("root")
                .value_name("WIKI_ROOT")
                .help("Root directory of the wiki installation")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("print-config"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Read settings from a TOML file (flags override it)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("TEMPLATE")
                .help("Output directory; strftime codes are expanded in UTC"),
        )
        .arg(
            Arg::new("name-prefix")
                .short('p')
                .long("name-prefix")
                .value_name("PREFIX")
                .help("Prefix for the archive file name"),
        )
        .arg(
            Arg::new("keep-users")
                .long("keep-users")
                .help("Archive conf/users.auth.php as-is")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-ips")
                .long("keep-ips")
                .help("Do not redact IP addresses in change logs and metadata")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compression-level")
                .long("compression-level")
                .value_name("N")
                .help("zstd level, 1-22 (default: 19)")
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log progress to stderr (-vv for per-file detail)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .help("Print the default configuration file and exit")
                .action(ArgAction::SetTrue)
                .conflicts_with("root"),
        )
}
