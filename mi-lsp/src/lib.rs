//! Language Server Protocol (LSP) implementation for mi scripts
//!
//!     mi is the scripting language of a visual-novel engine. Editors get semantic highlighting
//!     for its bracket tokens (`[showBg:forest]`) and variable tokens (`${hero}`) through this
//!     server; the scanning and classification live in mi-analysis.
//!
//! Architecture
//!
//!     LSP Layer (tower-lsp):
//!         - JSON-RPC over stdin/stdout
//!         - Capability negotiation, including the semantic tokens legend and the document
//!           selector for the configured language identifier
//!
//!     Server Layer (server.rs):
//!         - Implements the LanguageServer trait
//!         - Keeps the text of open documents in memory (full sync only)
//!         - Thin: forwards requests to the feature layer, tests only assert the wiring
//!
//!     Feature Layer (features/):
//!         - Adapts mi-analysis output to the LSP relative token encoding
//!         - All logic and dense unit tests
//!
//! Usage
//!
//!     $ mi-lsp [--config <file>] [--log-level <filter>]
//!     Starts the language server on stdin/stdout for editor integration.

pub mod features;
pub mod logging;
pub mod server;

use mi_config::{ConfigError, Loader, MiConfig};
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

pub use server::{MiLanguageServer, ServerSettings};

/// Optional per-project configuration picked up from the working directory.
pub const PROJECT_CONFIG_FILE: &str = "mi-lsp.toml";

/// Resolve configuration: defaults, then the project file, then an explicit file, then flags.
pub fn load_config(
    config_path: Option<&str>,
    log_level: Option<&str>,
) -> Result<MiConfig, ConfigError> {
    let mut loader = Loader::new().with_optional_file(PROJECT_CONFIG_FILE);
    if let Some(path) = config_path {
        loader = loader.with_file(path);
    }
    if let Some(level) = log_level {
        loader = loader.set_override("logging.level", level)?;
    }
    loader.build()
}

/// Serve the protocol on stdin/stdout until the client exits.
pub async fn serve(config: &MiConfig) {
    let settings = ServerSettings::from(config);
    let (service, socket) = LspService::new(move |client| MiLanguageServer::new(client, settings));
    Server::new(stdin(), stdout(), socket).serve(service).await;
}
