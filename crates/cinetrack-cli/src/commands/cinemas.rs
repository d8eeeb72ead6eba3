use crate::commands::ui::{header, new_table, with_spinner};
use crate::context::AppContext;
use crate::output::Output;
use cinetrack_sources::Cinema;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

pub async fn run_cinemas(
    latitude: f64,
    longitude: f64,
    radius: Option<u32>,
    limit: Option<usize>,
    ctx: &AppContext,
    output: &Output,
) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(eyre!("Coordinates out of range: {}, {}", latitude, longitude));
    }

    let client = ctx.cinemas();
    let radius_m = radius.unwrap_or_else(|| client.default_radius());
    let mut cinemas = with_spinner(
        output,
        &format!("Looking for cinemas within {} m...", radius_m),
        client.nearby(latitude, longitude, radius),
    )
    .await?;

    if let Some(limit) = limit {
        cinemas.truncate(limit);
    }

    if cinemas.is_empty() {
        output.info(format!("No cinemas within {} m", radius_m));
    } else {
        output.block(cinema_table(&cinemas));
    }
    output.data(&cinemas);
    Ok(())
}

fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

fn cinema_table(cinemas: &[Cinema]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["Name", "Distance", "Address", "Location"]));
    for cinema in cinemas {
        table.add_row(vec![
            Cell::new(&cinema.name).add_attribute(Attribute::Bold),
            Cell::new(format_distance(cinema.distance_m)).set_alignment(CellAlignment::Right),
            Cell::new(cinema.address.as_deref().unwrap_or("-")),
            Cell::new(format!("{:.5}, {:.5}", cinema.latitude, cinema.longitude)),
        ]);
    }
    table
}
