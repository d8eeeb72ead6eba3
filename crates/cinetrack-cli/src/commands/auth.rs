use crate::commands::prompts::{confirm_destructive, prompt_new_password, prompt_password, value_or_prompt};
use crate::commands::ui::{header, new_table, with_spinner};
use crate::context::AppContext;
use crate::output::Output;
use crate::AuthCommands;
use cinetrack_core::{validate_password, AuthGateway};
use cinetrack_models::UserProfile;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use serde_json::json;

pub async fn run_auth(cmd: AuthCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    match cmd {
        AuthCommands::Whoami => whoami(ctx, output).await?,
        AuthCommands::Signup { email, name } => {
            let mut gateway = ctx.auth_gateway()?;
            let email = value_or_prompt(email, "Email")?;
            let password = prompt_new_password("Password")?;
            let check = validate_password(&password);
            if !check.is_acceptable() {
                return Err(eyre!("Password is too weak, it needs {}", check.missing().join(", ")));
            }
            let session = with_spinner(output, "Creating account...", gateway.sign_up(&email, &password, name.as_deref())).await?;
            output.success(format!("Signed up as {}", session.email()));
            output.data(&session.profile);
        }
        AuthCommands::Login { email } => {
            let mut gateway = ctx.auth_gateway()?;
            let email = value_or_prompt(email, "Email")?;
            let password = prompt_password("Password")?;
            let session = with_spinner(output, "Signing in...", gateway.sign_in(&email, &password)).await?;
            output.success(format!("Signed in as {}", session.email()));
            output.data(&session.profile);
        }
        AuthCommands::Logout => {
            let mut gateway = ctx.auth_gateway()?;
            if !gateway.is_signed_in() {
                output.info("Not signed in");
                return Ok(());
            }
            gateway.sign_out().await?;
            output.success("Signed out");
        }
        AuthCommands::Profile { name, photo_url } => {
            let mut gateway = ctx.auth_gateway()?;
            if name.is_none() && photo_url.is_none() {
                return Err(eyre!("Nothing to update. Pass --name and/or --photo-url"));
            }
            require_session(&mut gateway).await?;
            let session = gateway.update_profile(name.as_deref(), photo_url.as_deref()).await?;
            output.success("Profile updated");
            output.data(&session.profile);
        }
        AuthCommands::Password => {
            let mut gateway = ctx.auth_gateway()?;
            require_session(&mut gateway).await?;
            let password = prompt_new_password("New password")?;
            gateway.update_password(&password).await?;
            output.success("Password changed");
        }
        AuthCommands::DeleteAccount { yes } => {
            let mut gateway = ctx.auth_gateway()?;
            require_session(&mut gateway).await?;
            let email = gateway
                .current_user()
                .map(|u| u.email.clone())
                .unwrap_or_default();
            if !confirm_destructive(&format!("Permanently delete the account {}?", email), yes)? {
                output.info("Cancelled");
                return Ok(());
            }
            gateway.delete_account().await?;
            output.success(format!("Deleted account {}", email));
        }
    }

    Ok(())
}

/// Make sure a usable session exists before an account operation
async fn require_session(gateway: &mut AuthGateway) -> Result<()> {
    match gateway.ensure_fresh().await? {
        Some(_) => Ok(()),
        None => Err(eyre!("Not signed in. Run 'cinetrack auth login' first")),
    }
}

async fn whoami(ctx: &AppContext, output: &Output) -> Result<()> {
    if ctx.firebase().is_none() {
        let profile = UserProfile {
            uid: ctx.config.local.uid.clone(),
            email: ctx.config.local.email.clone(),
            display_name: None,
            photo_url: None,
        };
        output.info(format!("Offline mode, using the local profile '{}'", profile.uid));
        print_profile(&profile, "local", output);
        return Ok(());
    }

    let mut gateway = ctx.auth_gateway()?;
    let provider = gateway.provider_name().to_string();
    match gateway.ensure_fresh().await? {
        Some(session) => print_profile(&session.profile, &provider, output),
        None => {
            output.info("Not signed in");
            output.data(&json!({ "signedIn": false }));
        }
    }
    Ok(())
}

fn print_profile(profile: &UserProfile, provider: &str, output: &Output) {
    let mut table = new_table();
    table.set_header(header(&["Field", "Value"]));
    table.add_row(vec![Cell::new("UID"), Cell::new(&profile.uid)]);
    table.add_row(vec![Cell::new("Email"), Cell::new(&profile.email)]);
    if let Some(name) = &profile.display_name {
        table.add_row(vec![Cell::new("Name"), Cell::new(name)]);
    }
    if let Some(photo) = &profile.photo_url {
        table.add_row(vec![Cell::new("Photo"), Cell::new(photo)]);
    }
    table.add_row(vec![Cell::new("Provider"), Cell::new(provider)]);
    output.block(table);
    output.data(&json!({ "signedIn": true, "provider": provider, "profile": profile }));
}
