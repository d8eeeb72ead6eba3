use crate::commands::prompts::confirm_destructive;
use crate::commands::ui::{header, movie_table, new_table, with_spinner};
use crate::context::AppContext;
use crate::output::Output;
use crate::PlaylistCommands;
use cinetrack_models::{Playlist, PlaylistPatch};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Table};
use serde_json::json;

pub async fn run_playlist(cmd: PlaylistCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    let services = ctx.services().await?;
    let playlists = &services.playlists;

    match cmd {
        PlaylistCommands::Create { name, description, cover_url } => {
            let playlist = playlists.create_playlist(&name, description, cover_url).await?;
            output.success(format!("Created playlist {} ({})", playlist.name, playlist.id));
            output.data(&playlist);
        }
        PlaylistCommands::List => {
            let all = playlists.get_user_playlists().await?;
            if all.is_empty() {
                output.info("No playlists yet");
            } else {
                output.block(playlist_table(&all));
            }
            output.data(&all);
        }
        PlaylistCommands::Show { id } => {
            let playlist = playlists
                .get_playlist_by_id(&id)
                .await?
                .ok_or_else(|| eyre!("Playlist {} not found", id))?;
            let movies = with_spinner(output, "Loading movies...", playlists.get_playlist_movies(&id)).await?;

            output.block(playlist_table(std::slice::from_ref(&playlist)));
            if movies.is_empty() {
                output.info("This playlist is empty");
            } else {
                output.block(movie_table(&movies));
            }
            if movies.len() < playlist.movie_ids.len() {
                output.warn(format!(
                    "{} movie(s) in this playlist could not be resolved",
                    playlist.movie_ids.len() - movies.len()
                ));
            }
            output.data(&json!({ "playlist": playlist, "movies": movies }));
        }
        PlaylistCommands::Edit {
            id,
            name,
            description,
            cover_url,
            clear_description,
            clear_cover,
        } => {
            let patch = PlaylistPatch {
                name,
                description: if clear_description { Some(None) } else { description.map(Some) },
                cover_url: if clear_cover { Some(None) } else { cover_url.map(Some) },
            };
            if patch == PlaylistPatch::default() {
                return Err(eyre!("Nothing to change. Pass --name, --description or --cover-url"));
            }
            let playlist = playlists.update_playlist(&id, patch).await?;
            output.success(format!("Updated playlist {}", playlist.name));
            output.data(&playlist);
        }
        PlaylistCommands::Add { id, movie_id } => {
            if services.movies.get_movie_by_id(&movie_id).await?.is_none() {
                return Err(eyre!("Movie {} not found", movie_id));
            }
            let playlist = playlists.add_movie(&id, &movie_id).await?;
            output.success(format!("{} is in {} ({} movies)", movie_id, playlist.name, playlist.movie_ids.len()));
            output.data(&playlist);
        }
        PlaylistCommands::Remove { id, movie_id } => {
            let playlist = playlists.remove_movie(&id, &movie_id).await?;
            output.success(format!("Removed {} from {}", movie_id, playlist.name));
            output.data(&playlist);
        }
        PlaylistCommands::Delete { id, yes } => {
            if !confirm_destructive(&format!("Delete playlist {}?", id), yes)? {
                output.info("Cancelled");
                return Ok(());
            }
            playlists.delete_playlist(&id).await?;
            output.success(format!("Deleted playlist {}", id));
            output.data(&json!({ "deleted": id }));
        }
    }

    Ok(())
}

fn playlist_table(playlists: &[Playlist]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["ID", "Name", "Movies", "Description", "Created"]));
    for playlist in playlists {
        table.add_row(vec![
            Cell::new(&playlist.id),
            Cell::new(&playlist.name).add_attribute(Attribute::Bold),
            Cell::new(playlist.movie_ids.len()),
            Cell::new(playlist.description.as_deref().unwrap_or("")),
            Cell::new(playlist.created_at.format("%Y-%m-%d")),
        ]);
    }
    table
}
