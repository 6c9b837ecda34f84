use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod fetch;

use config::CliConfig;

fn cli() -> Command {
    Command::new("docload")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Load document resources and report when all of them have finished")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(
            Command::new("fetch")
                .about("Fetch locators relative to a base url and wait for all of them")
                .arg(
                    Arg::new("base")
                        .long("base")
                        .help("Base url relative locators resolve against"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("method")
                        .long("method")
                        .default_value("GET")
                        .help("HTTP method"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("locators")
                        .required(true)
                        .num_args(1..)
                        .help("Locators to fetch"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Print locators resolved against a base url")
                .arg(
                    Arg::new("base")
                        .long("base")
                        .required(true)
                        .help("Base url"),
                )
                .arg(
                    Arg::new("locators")
                        .required(true)
                        .num_args(1..)
                        .help("Locators to resolve"),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn locators(args: &clap::ArgMatches) -> Vec<String> {
    args.get_many::<String>("locators")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("fetch", args)) => {
            let config = match args.get_one::<PathBuf>("config") {
                Some(path) => CliConfig::load(path)?,
                None => CliConfig::default(),
            }
            .with_base_url(args.get_one::<String>("base"));
            let method = args
                .get_one::<String>("method")
                .map_or("GET", String::as_str);

            let report = fetch::fetch(&config, method, &locators(args)).await?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }

            std::process::exit(if report.succeeded() { 0 } else { 1 });
        }
        Some(("resolve", args)) => {
            let base = args
                .get_one::<String>("base")
                .map_or("", String::as_str);
            for resolved in fetch::resolve(base, &locators(args))? {
                println!("{resolved}");
            }
        }
        _ => {}
    }
    Ok(())
}
