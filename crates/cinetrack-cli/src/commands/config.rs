use super::prompts;
use crate::commands::ui::{header, mask_string, new_table};
use crate::context::AppContext;
use crate::output::Output;
use crate::ConfigCommands;
use cinetrack_config::{Config, FirebaseConfig};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, ctx, output),
        ConfigCommands::Init {
            tmdb_token,
            firebase_api_key,
            firebase_project_id,
            force,
        } => init_config(tmdb_token, firebase_api_key, firebase_project_id, force, ctx, output),
    }
}

fn secret(value: &str, full: bool) -> String {
    if full {
        mask_string(value)
    } else if value.is_empty() || value.starts_with("YOUR_") {
        "<not set>".to_string()
    } else {
        "<set>".to_string()
    }
}

fn section(title: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec![Cell::new(title).fg(Color::Cyan), Cell::new("")]);
    table
}

fn show_config(full: bool, ctx: &AppContext, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let config_file = ctx.paths.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Showing defaults. Run 'cinetrack config init' to create one.");
    }

    if !output.is_human() {
        let firebase = config.firebase.as_ref().map(|f| {
            json!({
                "apiKey": secret(&f.api_key, full),
                "projectId": f.project_id,
                "identityUrl": f.identity_url,
                "firestoreUrl": f.firestore_url,
                "tokenUrl": f.token_url,
            })
        });
        output.data(&json!({
            "configFile": config_file.display().to_string(),
            "tmdb": {
                "apiToken": secret(&config.tmdb.api_token, full),
                "configured": config.is_tmdb_configured(),
                "baseUrl": config.tmdb.base_url,
                "language": config.tmdb.language,
                "cacheTtlSecs": config.tmdb.cache_ttl_secs,
            },
            "firebase": firebase,
            "search": { "debounceMs": config.search.debounce_ms },
            "cinemas": { "overpassUrl": config.cinemas.overpass_url, "radiusM": config.cinemas.radius_m },
            "local": { "uid": config.local.uid, "email": config.local.email },
            "http": { "timeoutSecs": config.http.timeout_secs },
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!("{}\n", config_file.display().bright_black());

    let mut tmdb = section("TMDB");
    let configured = if config.is_tmdb_configured() { "✓".green().to_string() } else { "✗".red().to_string() };
    tmdb.add_row(vec![Cell::new("Configured"), Cell::new(configured)]);
    tmdb.add_row(vec![Cell::new("API token"), Cell::new(secret(&config.tmdb.api_token, full))]);
    tmdb.add_row(vec![Cell::new("Base URL"), Cell::new(&config.tmdb.base_url)]);
    tmdb.add_row(vec![Cell::new("Language"), Cell::new(&config.tmdb.language)]);
    tmdb.add_row(vec![Cell::new("Cache TTL"), Cell::new(format!("{} s", config.tmdb.cache_ttl_secs))]);
    println!("{}\n", tmdb);

    match &config.firebase {
        Some(firebase) => {
            let mut table = section("Firebase");
            table.add_row(vec![Cell::new("API key"), Cell::new(secret(&firebase.api_key, full))]);
            table.add_row(vec![Cell::new("Project"), Cell::new(&firebase.project_id)]);
            table.add_row(vec![Cell::new("Identity URL"), Cell::new(&firebase.identity_url)]);
            table.add_row(vec![Cell::new("Firestore URL"), Cell::new(&firebase.firestore_url)]);
            println!("{}\n", table);
        }
        None => {
            println!(
                "{}\n",
                format!(
                    "Firebase: Not configured (offline as '{}', store at {})",
                    config.local.uid,
                    ctx.paths.store_file().display()
                )
                .bright_black()
            );
        }
    }

    let mut other = new_table();
    other.set_header(header(&["Setting", "Value"]));
    other.add_row(vec![Cell::new("Search debounce"), Cell::new(format!("{} ms", config.search.debounce_ms))]);
    other.add_row(vec![Cell::new("Cinema radius"), Cell::new(format!("{} m", config.cinemas.radius_m))]);
    other.add_row(vec![Cell::new("Overpass URL"), Cell::new(&config.cinemas.overpass_url)]);
    other.add_row(vec![Cell::new("HTTP timeout"), Cell::new(format!("{} s", config.http.timeout_secs))]);
    println!("{}", other);

    Ok(())
}

/// Build a config from defaults plus the given (or prompted) values
fn build_config(tmdb_token: String, firebase_api_key: String, firebase_project_id: String) -> Result<Config> {
    let mut config = Config::default();
    if !tmdb_token.trim().is_empty() {
        config.tmdb.api_token = tmdb_token.trim().to_string();
    }

    match (firebase_api_key.trim(), firebase_project_id.trim()) {
        ("", "") => {}
        (key, project) if !key.is_empty() && !project.is_empty() => {
            config.firebase = Some(FirebaseConfig::new(key, project));
        }
        _ => return Err(eyre!("Firebase needs both an API key and a project id")),
    }

    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn init_config(
    tmdb_token: Option<String>,
    firebase_api_key: Option<String>,
    firebase_project_id: Option<String>,
    force: bool,
    ctx: &AppContext,
    output: &Output,
) -> Result<()> {
    let config_file = ctx.paths.config_file();
    if config_file.exists()
        && !force
        && !prompts::prompt_yes_no(&format!("{} exists. Overwrite?", config_file.display()), Some(false))?
    {
        output.info("Keeping the existing configuration");
        return Ok(());
    }

    let tmdb_token = prompts::value_or_prompt(tmdb_token, "TMDB API read access token (empty to skip)")?;
    let firebase_api_key = prompts::value_or_prompt(firebase_api_key, "Firebase API key (empty to stay offline)")?;
    let firebase_project_id = if firebase_api_key.trim().is_empty() {
        firebase_project_id.unwrap_or_default()
    } else {
        prompts::value_or_prompt(firebase_project_id, "Firebase project id")?
    };

    let config = build_config(tmdb_token, firebase_api_key, firebase_project_id)?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration saved to {}", config_file.display()));
    if config.is_firebase_configured() {
        output.info("Next: run 'cinetrack auth signup' or 'cinetrack auth login'");
    }
    Ok(())
}
