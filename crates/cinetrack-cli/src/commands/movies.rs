use crate::commands::prompts::{confirm_destructive, prompt_string, value_or_prompt};
use crate::commands::ui::{header, movie_detail, movie_table, new_table, with_spinner};
use crate::context::AppContext;
use crate::output::Output;
use crate::{MovieCommands, MovieFields};
use cinetrack_core::{MovieFilter, SearchOutcome, SearchSession, ServiceResult, Services};
use cinetrack_models::{Movie, MovieDraft, MoviePatch};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinSet;
use tracing::debug;

pub async fn run_movies(cmd: MovieCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    let services = ctx.services().await?;

    match cmd {
        MovieCommands::Popular { filter } => {
            warn_without_catalog(&services, output);
            let movies = with_spinner(output, "Loading popular movies...", services.movies.get_popular_movies()).await?;
            print_movies(filter.into_filter().apply(movies), output);
        }
        MovieCommands::Search { query, filter } => {
            warn_without_catalog(&services, output);
            let filter = filter.into_filter();
            let query = query.join(" ");
            if query.trim().is_empty() {
                let debounce = Duration::from_millis(ctx.config.search.debounce_ms);
                interactive_search(&services, debounce, &filter, output).await?;
            } else {
                let session = services.search_session(Duration::ZERO);
                match with_spinner(output, "Searching...", session.search(&query)).await? {
                    SearchOutcome::Completed(movies) => print_movies(filter.apply(movies), output),
                    SearchOutcome::Superseded => debug!("Search for '{}' was superseded", query),
                }
            }
        }
        MovieCommands::Show { id } => {
            let movie = with_spinner(output, "Loading movie...", services.movies.get_movie_by_id(&id))
                .await?
                .ok_or_else(|| eyre!("Movie {} not found", id))?;
            show_movie(&services, movie, output).await?;
        }
        MovieCommands::Add { fields, external_id } => {
            let draft = MovieDraft {
                title: value_or_prompt(fields.title, "Title")?,
                poster_url: fields.poster_url,
                release_year: fields.year.unwrap_or_default(),
                director: fields.director.unwrap_or_default(),
                duration: fields.duration.unwrap_or_default(),
                genre: fields.genre.unwrap_or_default(),
                synopsis: fields.synopsis.unwrap_or_default(),
                external_id,
            };
            let movie = services.movies.create_external_movie(draft).await?;
            output.success(format!("Added {} ({})", movie.title, movie.id));
            output.block(movie_detail(&movie));
            output.data(&movie);
        }
        MovieCommands::Edit { id, fields, clear_poster } => {
            let patch = patch_from_fields(fields, clear_poster);
            if patch.is_empty() {
                return Err(eyre!("Nothing to change. Pass at least one field, e.g. --title"));
            }
            let movie = services.movies.update_movie(&id, patch).await?;
            output.success(format!("Updated {}", movie.title));
            output.block(movie_detail(&movie));
            output.data(&movie);
        }
        MovieCommands::Delete { id, yes } => {
            if !confirm_destructive(&format!("Delete movie {} with its reviews and their comments?", id), yes)? {
                output.info("Cancelled");
                return Ok(());
            }
            let deletion = services.movies.delete_movie(&id).await?;
            output.success(format!(
                "Deleted movie {} with {} review(s) and {} comment(s)",
                id, deletion.reviews, deletion.comments
            ));
            output.data(&json!({
                "deleted": id,
                "reviewsDeleted": deletion.reviews,
                "commentsDeleted": deletion.comments,
            }));
        }
        MovieCommands::Mine { filter } => {
            let movies = services.movies.list_external_movies().await?;
            print_movies(filter.into_filter().apply(movies), output);
        }
    }

    Ok(())
}

fn patch_from_fields(fields: MovieFields, clear_poster: bool) -> MoviePatch {
    MoviePatch {
        title: fields.title,
        poster_url: if clear_poster {
            Some(None)
        } else {
            fields.poster_url.map(Some)
        },
        release_year: fields.year,
        director: fields.director,
        duration: fields.duration,
        genre: fields.genre,
        synopsis: fields.synopsis,
    }
}

fn warn_without_catalog(services: &Services, output: &Output) {
    if !services.movies.has_catalog() {
        output.warn("TMDB is not configured. Set [tmdb].api_token or TMDB_API_TOKEN to browse the catalog");
    }
}

fn print_movies(movies: Vec<Movie>, output: &Output) {
    if movies.is_empty() {
        output.info("No movies found");
    } else {
        output.block(movie_table(&movies));
    }
    output.data(&movies);
}

/// Movie details plus the viewer's own review and tag
async fn show_movie(services: &Services, movie: Movie, output: &Output) -> Result<()> {
    let reviews = services.reviews.get_reviews_by_movie_id(&movie.id).await?;
    let tag = services.tags.get_tag(&movie.id).await?;

    output.block(movie_detail(&movie));

    if output.is_human() && (!reviews.is_empty() || tag.is_some()) {
        let mut table = new_table();
        table.set_header(header(&["Yours", ""]));
        for review in &reviews {
            let text = review.content.clone().unwrap_or_default();
            table.add_row(vec![
                Cell::new(format!("Review ({})", review.id)),
                Cell::new(format!("{} {}", review.review_type, text).trim_end().to_string()),
            ]);
        }
        if let Some(tag) = &tag {
            let describe = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
            table.add_row(vec![
                Cell::new("Tag"),
                Cell::new(format!(
                    "watched: {}, interest: {}, rewatch: {}",
                    describe(tag.watched.map(|w| w.to_string())),
                    describe(tag.interest.map(|a| a.to_string())),
                    describe(tag.rewatch.map(|a| a.to_string())),
                )),
            ]);
        }
        output.block(table);
    }

    output.data(&json!({ "movie": movie, "reviews": reviews, "tag": tag }));
    Ok(())
}

/// Prompt for queries until an empty line. Input is read on a blocking
/// thread so typing a new query while one is pending supersedes it.
async fn interactive_search(
    services: &Services,
    debounce: Duration,
    filter: &MovieFilter,
    output: &Output,
) -> Result<()> {
    let session = services.search_session(debounce);
    let (tx, rx) = unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let line = prompt_string("Search (empty to quit)", None);
        let last = !matches!(&line, Ok(query) if !query.trim().is_empty());
        if tx.send(line).is_err() || last {
            break;
        }
    });

    drive_searches(&session, rx, |query, outcome| match outcome {
        Ok(SearchOutcome::Completed(movies)) => print_movies(filter.apply(movies), output),
        Ok(SearchOutcome::Superseded) => debug!("Search for '{}' was superseded", query),
        Err(e) => output.warn(format!("Search for '{}' failed: {}", query, e)),
    })
    .await
}

/// Start a search for every incoming query without waiting for the previous
/// one, reporting each outcome as it lands. Stops at an empty query or when
/// input ends, cancelling whatever is still pending.
async fn drive_searches<F>(
    session: &SearchSession,
    mut queries: UnboundedReceiver<Result<String>>,
    mut on_outcome: F,
) -> Result<()>
where
    F: FnMut(&str, ServiceResult<SearchOutcome>),
{
    let mut searches = JoinSet::new();
    loop {
        tokio::select! {
            line = queries.recv() => match line {
                Some(Ok(query)) if !query.trim().is_empty() => {
                    let session = session.clone();
                    searches.spawn(async move {
                        let outcome = session.search(&query).await;
                        (query, outcome)
                    });
                }
                Some(Err(e)) => {
                    session.cancel();
                    return Err(e);
                }
                _ => {
                    session.cancel();
                    return Ok(());
                }
            },
            Some(joined) = searches.join_next() => match joined {
                Ok((query, outcome)) => on_outcome(&query, outcome),
                Err(e) => debug!("Search task ended early: {}", e),
            },
        }
    }
}
