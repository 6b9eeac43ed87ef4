use super::prompts;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use listport_config::{Config, CredentialStore, PathManager, StoreBackend};
use owo_colors::OwoColorize;
use serde_json::json;

/// Load config and credentials the way every data command needs them.
pub fn load_settings() -> Result<(Config, CredentialStore, PathManager)> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = Config::load_or_default(&config_file).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e)
    })?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load credentials from {}: {}",
            credentials_file.display(),
            e
        )
    })?;

    Ok((config, cred_store, path_manager))
}

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::Init => init_config(output).await,
        crate::ConfigCommands::SetCatalogKey => set_catalog_key(output).await,
        crate::ConfigCommands::SetStoreToken => set_store_token(output).await,
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(&format!(
            "Configuration file not found at: {}",
            config_file.display()
        ));
        output.info("Run 'listporter config init' to create one with defaults.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e)
    })?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load credentials from {}: {}",
            path_manager.credentials_file().display(),
            e
        )
    })?;

    let catalog_key_display = match cred_store.get_catalog_api_key() {
        Some(key) if full => key.clone(),
        Some(key) => mask_string(key),
        None => "<not set>".to_string(),
    };
    let store_token_display = match cred_store.get_store_token() {
        Some(token) if full => token.clone(),
        Some(token) => mask_string(token),
        None => "<not set>".to_string(),
    };

    match output.format() {
        crate::output::OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            // Header
            println!(
                "\n{}",
                "╔════════════════════════════════════════════════════════════╗".bright_white()
            );
            println!("{} {}", "║".bright_white(), "Configuration".bright_cyan().bold());
            println!(
                "{}",
                "╚════════════════════════════════════════════════════════════╝".bright_white()
            );
            println!();

            // Config file location
            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.load_preset(comfy_table::presets::UTF8_FULL);
            info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", info_table);
            println!();

            // Catalog configuration
            let mut catalog_table = Table::new();
            catalog_table.set_header(vec![Cell::new("Catalog")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            catalog_table.add_row(vec![
                Cell::new("Base URL"),
                Cell::new(&config.catalog.base_url),
            ]);
            catalog_table.add_row(vec![Cell::new("API Key"), Cell::new(&catalog_key_display)]);
            catalog_table.load_preset(comfy_table::presets::UTF8_FULL);
            catalog_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", catalog_table);
            println!();

            // Store configuration
            let mut store_table = Table::new();
            store_table.set_header(vec![Cell::new("Watchlist Store")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            store_table.add_row(vec![
                Cell::new("Backend"),
                Cell::new(config.store.backend.to_string()),
            ]);
            match config.store.backend {
                StoreBackend::File => {
                    store_table.add_row(vec![
                        Cell::new("Watchlist File"),
                        Cell::new(path_manager.watchlist_file().display().to_string()),
                    ]);
                }
                StoreBackend::Http => {
                    store_table.add_row(vec![
                        Cell::new("Base URL"),
                        Cell::new(&config.store.base_url),
                    ]);
                    store_table.add_row(vec![Cell::new("Token"), Cell::new(&store_token_display)]);
                }
            }
            store_table.load_preset(comfy_table::presets::UTF8_FULL);
            store_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", store_table);
            println!();

            // Import limits
            let mut import_table = Table::new();
            import_table.set_header(vec![Cell::new("Import")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            import_table.add_row(vec![
                Cell::new("Max Upload Size"),
                Cell::new(format!("{} bytes", config.import.max_upload_bytes)),
            ]);
            import_table.add_row(vec![
                Cell::new("Lookup Concurrency"),
                Cell::new(config.import.lookup_concurrency.to_string()),
            ]);
            import_table.add_row(vec![
                Cell::new("Lookup Timeout"),
                Cell::new(format!("{} seconds", config.import.lookup_timeout_secs)),
            ]);
            import_table.load_preset(comfy_table::presets::UTF8_FULL);
            import_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", import_table);
            println!();
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            let json_config = json!({
                "config_file": config_file.display().to_string(),
                "catalog": {
                    "base_url": config.catalog.base_url,
                    "api_key": catalog_key_display,
                },
                "store": {
                    "backend": config.store.backend.to_string(),
                    "base_url": config.store.base_url,
                    "token": store_token_display,
                    "watchlist_file": path_manager.watchlist_file().display().to_string(),
                },
                "import": {
                    "max_upload_bytes": config.import.max_upload_bytes,
                    "lookup_concurrency": config.import.lookup_concurrency,
                    "lookup_timeout_secs": config.import.lookup_timeout_secs,
                },
            });
            output.json(&json_config);
        }
    }

    Ok(())
}

async fn init_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create config directories: {}", e))?;

    let config_file = path_manager.config_file();
    if config_file.exists() {
        output.info(&format!(
            "Configuration already exists at {}",
            config_file.display()
        ));
        return Ok(());
    }

    let config = Config::default();
    config.save_to_file(&config_file).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to write config to {}: {}", config_file.display(), e)
    })?;

    output.success(&format!(
        "Wrote default configuration to {}",
        config_file.display()
    ));
    Ok(())
}

async fn set_catalog_key(output: &Output) -> Result<()> {
    let key = prompts::prompt_secret("Catalog API key")?;
    if key.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Catalog API key cannot be empty"));
    }

    let path_manager = PathManager::default();
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load credentials from {}: {}",
            credentials_file.display(),
            e
        )
    })?;

    cred_store.set_catalog_api_key(key.trim().to_string());
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success(&format!(
        "Catalog API key saved to {}",
        credentials_file.display()
    ));
    Ok(())
}

async fn set_store_token(output: &Output) -> Result<()> {
    let token = prompts::prompt_secret("Watchlist service token")?;
    if token.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Store token cannot be empty"));
    }

    let path_manager = PathManager::default();
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load credentials from {}: {}",
            credentials_file.display(),
            e
        )
    })?;

    cred_store.set_store_token(token.trim().to_string());
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success(&format!(
        "Store token saved to {}",
        credentials_file.display()
    ));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    format!("{}***{}", &s[..2], &s[s.len() - 2..])
}
