use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use koo_client::{ClientConfig, DirectoryClient};
use koo_core::filter::search_records;
use koo_core::{
    Directory, JsonFileStore, KeyValueStore, MemoryStore, RecommendationPicker, SiteConfig,
    SystemClock,
};
use koo_server::{check_site, AppState, ServerConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("koopages")
        .version(koo_server::VERSION)
        .about("KOOPAGES sponsored business directory")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve the site and the directory API")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Server config file (TOML)"),
                )
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_parser(value_parser!(u16))
                        .help("Listen port, overrides config and PORT"),
                )
                .arg(
                    Arg::new("public")
                        .long("public")
                        .value_parser(value_parser!(PathBuf))
                        .help("Static site directory"),
                )
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check the static site assets and directory records")
                .arg(
                    Arg::new("root")
                        .long("root")
                        .default_value("public")
                        .value_parser(value_parser!(PathBuf))
                        .help("Static site directory"),
                )
                .arg(data_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("pick")
                .about("Print today's recommended business")
                .arg(
                    Arg::new("state")
                        .long("state")
                        .value_parser(value_parser!(PathBuf))
                        .help("Recommendation state file (JSON)"),
                )
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("search")
                .about("Print businesses matching a term")
                .arg(Arg::new("term").required(true).help("Search term"))
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("fetch")
                .about("Print the listing of a remote server, or the bundled list")
                .arg(
                    Arg::new("url")
                        .long("url")
                        .required(true)
                        .help("Server root, e.g. http://localhost:3000"),
                ),
        )
}

fn data_arg() -> Arg {
    Arg::new("data")
        .long("data")
        .value_parser(value_parser!(PathBuf))
        .help("Directory data file (JSON); bundled list when omitted")
}

fn load_directory(data: Option<&PathBuf>) -> Result<Directory> {
    match data {
        Some(path) => Directory::load(path)
            .with_context(|| format!("loading directory data from {}", path.display())),
        None => Ok(Directory::bundled()),
    }
}

fn print_records(records: &[koo_core::BusinessRecord]) {
    for record in records {
        println!("{} [{}]", record.title, record.category);
        println!("  {}", record.url);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", args)) => {
            let mut config = ServerConfig::load(args.get_one::<PathBuf>("config").map(PathBuf::as_path))
                .context("loading server config")?;
            if let Some(port) = args.get_one::<u16>("port") {
                config.port = *port;
            }
            if let Some(public) = args.get_one::<PathBuf>("public") {
                config.public_dir = public.clone();
            }
            if let Some(data) = args.get_one::<PathBuf>("data") {
                config.data_file = Some(data.clone());
            }

            let state = AppState::from_config(config).context("preparing server state")?;
            koo_server::run(state, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for ctrl-c: {}", e);
                }
            })
            .await?;
        }
        Some(("validate", args)) => {
            let root = args.get_one::<PathBuf>("root").map_or(Path::new("public"), PathBuf::as_path);
            let directory = load_directory(args.get_one::<PathBuf>("data"))?;
            let report = check_site(root, &directory, &SiteConfig::default().validation);

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("KOOPAGES site check: {}\n", root.display());
                print!("{}", report.to_text());
            }
            std::process::exit(if report.is_ok() { 0 } else { 1 });
        }
        Some(("pick", args)) => {
            let directory = load_directory(args.get_one::<PathBuf>("data"))?;
            let mut store: Box<dyn KeyValueStore> = match args.get_one::<PathBuf>("state") {
                Some(path) => Box::new(JsonFileStore::open(path.clone())?),
                None => Box::new(MemoryStore::new()),
            };
            let picker = RecommendationPicker::new(SystemClock);
            match picker.get_daily(directory.records(), &mut store, &mut rand::rng())? {
                Some(record) => {
                    println!("Recommendation for {}:", picker.today());
                    print_records(std::slice::from_ref(&record));
                }
                None => println!("{}", SiteConfig::default().messages.no_recommendation),
            }
        }
        Some(("search", args)) => {
            let term = args.get_one::<String>("term").map_or("", String::as_str);
            let directory = load_directory(args.get_one::<PathBuf>("data"))?;
            let records = search_records(directory.records(), term, &SiteConfig::default());
            if records.is_empty() {
                println!("No businesses match {term:?}");
            } else {
                print_records(&records);
            }
        }
        Some(("fetch", args)) => {
            let url = args.get_one::<String>("url").map_or("", String::as_str);
            let base = url.parse().with_context(|| format!("invalid server url {url:?}"))?;
            let client = DirectoryClient::new(ClientConfig::new(base))?;
            print_records(&client.fetch_websites().await);
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}
