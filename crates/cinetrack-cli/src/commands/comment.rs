use crate::commands::prompts::{confirm_destructive, prompt_string};
use crate::commands::review::comment_table;
use crate::context::AppContext;
use crate::output::Output;
use crate::CommentCommands;
use color_eyre::Result;
use serde_json::json;

/// Words from the command line, or a prompt when none were given
fn text_or_prompt(words: Vec<String>) -> Result<String> {
    if words.is_empty() {
        prompt_string("Comment", None)
    } else {
        Ok(words.join(" "))
    }
}

pub async fn run_comment(cmd: CommentCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    let services = ctx.services().await?;

    match cmd {
        CommentCommands::Add { review_id, text } => {
            let text = text_or_prompt(text)?;
            let comment = services.comments.add_comment(&review_id, &text).await?;
            output.success(format!("Comment {} added", comment.id));
            output.data(&comment);
        }
        CommentCommands::List { review_id } => {
            let comments = services.comments.get_comments_by_review_id(&review_id).await?;
            if comments.is_empty() {
                output.info("No comments yet");
            } else {
                output.block(comment_table(&comments));
            }
            output.data(&comments);
        }
        CommentCommands::Edit { id, text } => {
            let text = text_or_prompt(text)?;
            let comment = services.comments.update_comment(&id, &text).await?;
            output.success(format!("Comment {} updated", comment.id));
            output.data(&comment);
        }
        CommentCommands::Delete { id, yes } => {
            if !confirm_destructive(&format!("Delete comment {}?", id), yes)? {
                output.info("Cancelled");
                return Ok(());
            }
            services.comments.delete_comment(&id).await?;
            output.success(format!("Comment {} deleted", id));
            output.data(&json!({ "deleted": id }));
        }
    }

    Ok(())
}
