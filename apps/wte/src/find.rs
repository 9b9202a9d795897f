use std::time::Duration;

use anyhow::Context;
use tracing::info;
use wte_core::{Providers, locator_with_options};
use wte_domain::{LocatorOptions, Place, PriceLevel, format_bool, pick_random_place};

use crate::cli::FindArgs;
use crate::wifi;

pub(crate) async fn run(providers: &Providers, args: &FindArgs) -> anyhow::Result<()> {
    let options = LocatorOptions {
        page_delay: Duration::from_millis(args.page_delay_ms),
        max_pages: args.max_pages,
    };
    let locator = locator_with_options(providers, options)?;

    let rows = wifi::scan().await.context("wifi scan failed")?;
    let located = locator.fetch_location(&rows).await?;
    info!(event = "located", location = %located.location, accuracy = located.accuracy);

    let address = locator.reverse_geocode(located.location).await?;
    println!("Estás em: {}", address.formatted_address);

    let min_price = args.min_price.and_then(PriceLevel::from_level);
    let candidates = locator
        .collect_restaurants(located.location, args.radius, min_price)
        .await?;
    info!(event = "candidates_collected", count = candidates.len());

    let picked = pick_random_place(candidates, &mut rand::rng())?;
    let place = locator.place_details(&picked.place_id).await?;
    print!("{}", render_place(&place));
    Ok(())
}

fn render_place(place: &Place) -> String {
    let open_now = place.open_now.map(format_bool).unwrap_or("Desconhecido");
    format!(
        "Nome: {name}\n\
         Morada: {address}\n\
         Proximidade: {vicinity}\n\
         Preço: {price_level}/5\n\
         Rating: {rating}\n\
         Está aberto agora? {open_now}\n",
        name = place.name,
        address = place.address,
        vicinity = place.vicinity,
        price_level = place.price_level,
        rating = place.rating,
    )
}
