use radiobrowser_http::{Page, RadioBrowserClient, StreamValidator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let country = std::env::args().nth(1).unwrap_or_else(|| "Austria".to_owned());

    let client = RadioBrowserClient::from_env()?;

    let countries = client.countries().await?;
    println!("{} countries listed", countries.len());

    let stations = client.stations_by_country(&country).await?;
    let page = Page::of(stations, 1, Page::<()>::STATIONS_PER_PAGE);
    println!(
        "{country}: {} stations, page {}/{}",
        page.total_items, page.page, page.total_pages
    );
    for station in &page.items {
        println!("{:>4} kbps  {}", station.bitrate, station.name);
    }

    if let Some(first) = page.items.first() {
        let validator = StreamValidator::new()?;
        let resolved = validator.validate(first.stream_url()).await?;
        println!("{} streams from {resolved}", first.name);
    }

    Ok(())
}
