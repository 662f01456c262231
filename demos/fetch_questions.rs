//! Fetch questions example
//!
//! This example demonstrates the core functionality of trivia-fetch:
//! - Configuring the question source and filters
//! - Subscribing to progress events
//! - Requesting a total larger than one page (two paced requests)
//! - Reading the published snapshot and derived categories
//! - Serving the same total again from the session cache
//!
//! Usage: `cargo run --example fetch_questions -- [TOTAL]`

use trivia_fetch::config::{Config, QueryFilters};
use trivia_fetch::{Difficulty, Event, TriviaService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let total: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(80);

    let config = Config {
        filters: QueryFilters {
            difficulty: Some(Difficulty::Medium),
            ..Default::default()
        },
        ..Default::default()
    };

    let service = TriviaService::new(config)?;

    // Subscribe to events
    let mut events = service.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::FetchStarted { batches, .. } => {
                    println!("Fetching in {} request(s)...", batches);
                }
                Event::BatchCompleted {
                    batch,
                    batches,
                    received,
                    ..
                } => {
                    println!(
                        "  batch {}/{} done, {} questions so far",
                        batch + 1,
                        batches,
                        received
                    );
                }
                Event::CacheHit { total_amount } => {
                    println!("Served {} questions from the session cache", total_amount);
                }
                Event::FetchFailed { error, .. } => {
                    println!("Fetch failed: {}", error);
                }
                _ => {}
            }
        }
    });

    service.request(total);
    let snapshot = service.settled().await;

    if let Some(error) = &snapshot.error {
        eprintln!("Error: {}", error);
        return Ok(());
    }

    println!("\nCategories: {}", snapshot.categories.join(", "));
    for question in snapshot.questions.iter().take(5) {
        println!("\n[{}] {}", question.category(), question.question());
        for answer in question.answers() {
            println!("  - {}", answer);
        }
    }

    // Same total again: answered from the cache, no network
    service.reload();
    let again = service.settled().await;
    println!("\nReloaded {} questions", again.questions.len());

    Ok(())
}
