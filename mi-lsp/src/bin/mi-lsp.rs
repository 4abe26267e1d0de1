use clap::{Arg, Command};
use mi_lsp::logging::init_tracing;
use mi_lsp::{load_config, serve};

#[tokio::main]
async fn main() {
    let matches = Command::new("mi-lsp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Semantic highlighting language server for mi scripts")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to a TOML configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter directive (e.g. 'debug', 'mi_lsp=trace'); logs go to stderr"),
        )
        .arg(
            Arg::new("stdio")
                .long("stdio")
                .help("Accepted for client compatibility and ignored: stdin/stdout is the only transport")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let log_level = matches.get_one::<String>("log-level").map(String::as_str);
    let config = load_config(config_path, log_level).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    init_tracing(&config.logging);
    tracing::info!(
        language_id = %config.server.language_id,
        stdio_flag = matches.get_flag("stdio"),
        "starting mi-lsp on stdin/stdout"
    );
    serve(&config).await;
}
