//! Example: Find the representative image and media of a webpage
//!
//! Run with `RUST_LOG=imgpick=debug` to see dropped candidates and deadlines.

use std::time::Duration;

use imgpick::{FinderOptions, MediaFinder, ProbeOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string());

    println!("Fetching: {}\n", url);

    let options = FinderOptions::new().probe(
        ProbeOptions::new()
            .deadline(Duration::from_secs(2))
            .preserve_order(true),
    );
    let finder = MediaFinder::with_options(options)?;
    let result = finder.detect_media(&url, true).await?;

    println!("=== Page ===");
    println!("Title: {:?}", result.title);
    println!("Media URL: {:?}", result.media_url);
    println!("Media type: {:?}", result.media_type.map(|t| t.as_str()));
    println!("Duration: {:?}", result.media_duration);

    println!("\n=== Candidates ({}) ===", result.candidates.len());
    for candidate in result.candidates.iter().take(10) {
        println!("  {}", candidate);
    }
    if result.candidates.len() > 10 {
        println!("  ... and {} more", result.candidates.len() - 10);
    }

    println!("\n=== Measured ({}) ===", result.images.len());
    for image in &result.images {
        println!("  {}x{} {}", image.width, image.height, image.url);
    }
    if result.probe_timed_out {
        println!("  (deadline reached, results are partial)");
    }

    println!("\nBest image: {:?}", result.best_image);

    Ok(())
}
