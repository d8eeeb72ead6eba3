use crate::commands::prompts::confirm_destructive;
use crate::commands::ui::{header, new_table, status_cell};
use crate::context::AppContext;
use crate::output::Output;
use crate::ReviewCommands;
use cinetrack_models::{Comment, Review};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;

pub async fn run_review(cmd: ReviewCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    let services = ctx.services().await?;

    match cmd {
        ReviewCommands::Set { movie_id, review_type, content } => {
            if services.movies.get_movie_by_id(&movie_id).await?.is_none() {
                output.warn(format!("Movie {} could not be resolved, reviewing it anyway", movie_id));
            }
            let review = services.reviews.create_review(&movie_id, review_type, content).await?;
            output.success(format!("Marked {} as {}", movie_id, review.review_type));
            output.data(&review);
        }
        ReviewCommands::Show { movie_id } => {
            let reviews = services.reviews.get_reviews_by_movie_id(&movie_id).await?;
            let Some(review) = reviews.into_iter().next() else {
                output.info(format!("You haven't reviewed {} yet", movie_id));
                output.data(&json!({ "review": null, "comments": [] }));
                return Ok(());
            };
            let comments = services.comments.get_comments_by_review_id(&review.id).await?;
            output.block(review_table(std::slice::from_ref(&review)));
            if !comments.is_empty() {
                output.block(comment_table(&comments));
            }
            output.data(&json!({ "review": review, "comments": comments }));
        }
        ReviewCommands::List => {
            let reviews = services.reviews.get_all_user_reviews().await?;
            if reviews.is_empty() {
                output.info("No reviews yet");
            } else {
                output.block(review_table(&reviews));
            }
            output.data(&reviews);
        }
        ReviewCommands::Delete { id, yes } => {
            let review = services
                .reviews
                .get_review_by_id(&id)
                .await?
                .ok_or_else(|| eyre!("Review {} not found", id))?;
            if !confirm_destructive(&format!("Delete your review of {} and its comments?", review.movie_id), yes)? {
                output.info("Cancelled");
                return Ok(());
            }
            services.reviews.delete_review(&id).await?;
            let comments = services.comments.delete_comments_by_review_id(&id).await?;
            output.success(format!("Deleted review {} and {} comment(s)", id, comments));
            output.data(&json!({ "deleted": id, "commentsDeleted": comments }));
        }
    }

    Ok(())
}

fn review_table(reviews: &[Review]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["ID", "Movie", "Review", "Content", "Updated"]));
    for review in reviews {
        table.add_row(vec![
            Cell::new(&review.id),
            Cell::new(&review.movie_id),
            status_cell(Some(review.review_type.into())),
            Cell::new(review.content.as_deref().unwrap_or("")),
            Cell::new(review.updated_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

pub fn comment_table(comments: &[Comment]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["ID", "Author", "Comment", "Posted"]));
    for comment in comments {
        let posted = comment.created_at.format("%Y-%m-%d %H:%M").to_string();
        let posted = if comment.updated_at.is_some() {
            format!("{} (edited)", posted)
        } else {
            posted
        };
        table.add_row(vec![
            Cell::new(&comment.id),
            Cell::new(&comment.user_id),
            Cell::new(&comment.content),
            Cell::new(posted),
        ]);
    }
    table
}
