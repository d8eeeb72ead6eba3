use crate::commands::ui::{header, new_table};
use crate::context::AppContext;
use crate::output::Output;
use crate::TagCommands;
use cinetrack_models::{Tag, TagUpdate};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;
use std::fmt::Display;

pub async fn run_tag(cmd: TagCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    let services = ctx.services().await?;

    match cmd {
        TagCommands::Set { movie_id, watched, interest, rewatch } => {
            let update = TagUpdate { watched, interest, rewatch };
            if update.is_empty() {
                return Err(eyre!("Nothing to set. Pass --watched, --interest and/or --rewatch"));
            }
            let tag = services.tags.add_tag(&movie_id, update).await?;
            output.success(format!("Tagged {}", movie_id));
            output.block(tag_table(std::slice::from_ref(&tag)));
            output.data(&tag);
        }
        TagCommands::Show { movie_id } => match services.tags.get_tag(&movie_id).await? {
            Some(tag) => {
                output.block(tag_table(std::slice::from_ref(&tag)));
                output.data(&tag);
            }
            None => {
                output.info(format!("No tag for {}", movie_id));
                output.data(&json!(null));
            }
        },
        TagCommands::List => {
            let tags = services.tags.get_user_tags().await?;
            if tags.is_empty() {
                output.info("No tags yet");
            } else {
                output.block(tag_table(&tags));
            }
            output.data(&tags);
        }
        TagCommands::Delete { id } => {
            services.tags.delete_tag(&id).await?;
            output.success(format!("Tag {} deleted", id));
            output.data(&json!({ "deleted": id }));
        }
    }

    Ok(())
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn tag_table(tags: &[Tag]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["ID", "Movie", "Watched", "Interest", "Rewatch"]));
    for tag in tags {
        table.add_row(vec![
            Cell::new(&tag.id),
            Cell::new(&tag.movie_id),
            Cell::new(or_dash(tag.watched)),
            Cell::new(or_dash(tag.interest)),
            Cell::new(or_dash(tag.rewatch)),
        ]);
    }
    table
}
