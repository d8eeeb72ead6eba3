use crate::commands::prompts::confirm_destructive;
use crate::context::AppContext;
use crate::output::Output;
use cinetrack_config::PathManager;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;

pub fn run_clear(all: bool, credentials: bool, store: bool, yes: bool, ctx: &AppContext, output: &Output) -> Result<()> {
    let clear_credentials_too = all || credentials;
    let clear_store_too = all || store;

    if !clear_credentials_too && !clear_store_too {
        output.warn("No clear option specified. Use --credentials, --store, or --all");
        output.info("\nExample: cinetrack clear --credentials");
        return Ok(());
    }

    if clear_store_too
        && !confirm_destructive("Delete the local store with all offline movies, reviews, tags and playlists?", yes)?
    {
        output.info("Cancelled");
        return Ok(());
    }

    if clear_credentials_too {
        clear_session(ctx, output)?;
    }
    if clear_store_too {
        clear_store(&ctx.paths, output)?;
    }

    Ok(())
}

/// Drops the stored session but keeps any other keys in the credentials file
fn clear_session(ctx: &AppContext, output: &Output) -> Result<()> {
    if !ctx.paths.credentials_file().exists() {
        output.info("No credentials file found to clear");
        return Ok(());
    }

    let mut creds = ctx.credentials()?;
    if creds.get_session().is_none() {
        output.info("No stored session to clear");
        return Ok(());
    }
    creds.clear_session();
    creds
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
    output.success(format!("Cleared stored session: {}", ctx.paths.credentials_file().display()));
    Ok(())
}

fn clear_store(paths: &PathManager, output: &Output) -> Result<()> {
    let store_file = paths.store_file();

    if store_file.exists() {
        fs::remove_file(&store_file)
            .map_err(|e| eyre!("Failed to remove local store at {}: {}", store_file.display(), e))?;
        output.success(format!("Cleared local store: {}", store_file.display()));
    } else {
        output.info("No local store found to clear");
    }

    Ok(())
}
