//! Demo harness for the recommendation engine.
//!
//! Seeds a small in-memory shop and lets you exercise the full flow
//! from the command line: request recommendations, inspect persisted
//! records, or simulate a burst of shopper traffic.

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_store::{
    BehaviorEvent, BehaviorLog, BehaviorType, CatalogReader, InMemoryCatalog, InMemoryOrders,
    Product, Strategy, UserId,
};
use engine::{
    InMemoryCache, InMemoryRecommendationStore, Recommendation, RecommendationService,
    TrackRequest,
};
use std::sync::Arc;
use std::time::Instant;

/// ShopRecs - product recommendation engine
#[derive(Parser)]
#[command(name = "shop-recs")]
#[command(about = "Product recommendation engine demo over a seeded in-memory shop", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get product recommendations for a user
    Recommend {
        /// User ID to get recommendations for (seeded users: 1-4)
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Comma-separated strategy mix (default: collaborative,content_based,trending)
        #[arg(long)]
        strategies: Option<String>,

        /// Show per-recommendation metadata
        #[arg(long)]
        explain: bool,
    },

    /// Compute recommendations and show the persisted records
    Records {
        /// User ID to inspect
        #[arg(long)]
        user_id: UserId,
    },

    /// Simulate random shopper traffic, then show the trending list
    Simulate {
        /// Number of behavior events to generate
        #[arg(long, default_value = "200")]
        events: usize,

        /// Number of simulated shoppers
        #[arg(long, default_value = "20")]
        users: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let shop = seed_demo_shop();
    println!(
        "{} Seeded demo shop: {} products, {} behavior events",
        "✓".green(),
        shop.catalog.len(),
        shop.behavior.len()
    );

    match cli.command {
        Commands::Recommend { user_id, limit, strategies, explain } => {
            handle_recommend(&shop, user_id, limit, strategies, explain).await?
        }
        Commands::Records { user_id } => handle_records(&shop, user_id).await?,
        Commands::Simulate { events, users } => handle_simulate(&shop, events, users).await?,
    }

    Ok(())
}

struct DemoShop {
    behavior: Arc<BehaviorLog>,
    catalog: Arc<InMemoryCatalog>,
    store: Arc<InMemoryRecommendationStore>,
    service: RecommendationService,
}

/// Build a small deterministic shop: three categories, a dozen
/// products, four shoppers with overlapping purchase histories.
fn seed_demo_shop() -> DemoShop {
    let catalog = Arc::new(InMemoryCatalog::new());
    let products = [
        (1, "Espresso Grinder Pro", 129.0, 1, 1),
        (2, "Espresso Grinder Mini", 89.0, 1, 1),
        (3, "Pour Over Kettle", 49.0, 1, 2),
        (4, "French Press Classic", 35.0, 1, 2),
        (5, "Trail Running Shoes", 110.0, 2, 3),
        (6, "Trail Running Socks", 15.0, 2, 3),
        (7, "Hiking Daypack", 75.0, 2, 4),
        (8, "Insulated Water Bottle", 25.0, 2, 4),
        (9, "Mechanical Keyboard", 140.0, 3, 5),
        (10, "Wireless Mouse", 45.0, 3, 5),
        (11, "USB-C Dock", 95.0, 3, 6),
        (12, "Laptop Stand", 55.0, 3, 6),
    ];
    for (id, title, price, category_id, seller_id) in products {
        catalog.insert_product(Product {
            id,
            title: title.to_string(),
            price,
            category_id,
            seller_id,
            is_active: true,
        });
    }

    let orders = Arc::new(InMemoryOrders::new());
    orders.insert_order(1, 1, &[1, 3]);
    orders.insert_order(2, 2, &[1, 3, 4]);
    orders.insert_order(3, 2, &[9]);
    orders.insert_order(4, 3, &[5, 6, 8]);
    orders.insert_order(5, 4, &[9, 10, 11]);

    let behavior = Arc::new(BehaviorLog::new());
    let now = Utc::now();
    // Purchase events mirroring the order history
    let purchases: [(UserId, u64, u64); 10] = [
        (1, 1, 1),
        (1, 3, 1),
        (2, 1, 1),
        (2, 3, 1),
        (2, 4, 1),
        (2, 9, 3),
        (3, 5, 2),
        (3, 6, 2),
        (3, 8, 2),
        (4, 9, 3),
    ];
    for (i, (user_id, product_id, category_id)) in purchases.into_iter().enumerate() {
        behavior.append(
            BehaviorEvent::new(user_id, BehaviorType::Purchase, now - Duration::hours(48 - i as i64))
                .with_product(product_id)
                .with_category(category_id)
                .with_weight(2.0),
        );
    }
    // Browsing activity inside the trending window
    let views: [(UserId, u64, u64); 8] = [
        (1, 2, 1),
        (2, 2, 1),
        (3, 2, 1),
        (1, 9, 3),
        (3, 9, 3),
        (4, 5, 2),
        (4, 7, 2),
        (2, 11, 3),
    ];
    for (user_id, product_id, category_id) in views {
        behavior.append(
            BehaviorEvent::new(user_id, BehaviorType::View, now - Duration::hours(12))
                .with_product(product_id)
                .with_category(category_id),
        );
    }

    let store = Arc::new(InMemoryRecommendationStore::new());
    let service = RecommendationService::new(
        Arc::clone(&behavior),
        Arc::clone(&catalog) as Arc<dyn data_store::CatalogReader>,
        Arc::clone(&orders) as Arc<dyn data_store::OrderReader>,
        Arc::new(InMemoryCache::new()),
        Arc::clone(&store) as Arc<dyn engine::RecommendationStore>,
    );

    DemoShop { behavior, catalog, store, service }
}

/// Parse a comma-separated strategy list
fn parse_strategies(raw: Option<&str>) -> Result<Vec<Strategy>> {
    let Some(raw) = raw else { return Ok(Vec::new()) };
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Strategy::parse(name).ok_or_else(|| anyhow!("Unknown strategy: {}", name)))
        .collect()
}

/// Handle the 'recommend' command
async fn handle_recommend(
    shop: &DemoShop,
    user_id: UserId,
    limit: usize,
    strategies: Option<String>,
    explain: bool,
) -> Result<()> {
    let mix = parse_strategies(strategies.as_deref()).context("Failed to parse --strategies")?;

    let start = Instant::now();
    let recommendations = shop.service.get_recommendations(user_id, limit, &mix).await;
    println!(
        "{} Computed {} recommendations in {:?}",
        "✓".green(),
        recommendations.len(),
        start.elapsed()
    );

    print_recommendations(shop, &recommendations, explain);
    Ok(())
}

/// Handle the 'records' command
async fn handle_records(shop: &DemoShop, user_id: UserId) -> Result<()> {
    // Warm the store with a fresh computation first
    shop.service.get_recommendations(user_id, 10, &[]).await;

    let records = shop.store.live_records_for(user_id, Utc::now());
    println!("{}", format!("Persisted records for user {}:", user_id).bold().blue());
    for record in &records {
        println!(
            "  {} [{}] score {:.3} via {} (expires {})",
            product_title(shop, record.product_id),
            record.strategy.to_string().cyan(),
            record.score,
            record.algorithm,
            record.expires_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

/// Handle the 'simulate' command
async fn handle_simulate(shop: &DemoShop, events: usize, users: u64) -> Result<()> {
    let product_count = shop.catalog.len() as u64;
    println!("Simulating {} events from {} shoppers...", events, users);

    for _ in 0..events {
        let user_id = rand::random::<u64>() % users + 1;
        let product_id = rand::random::<u64>() % product_count + 1;
        let behavior_type = match rand::random::<u32>() % 10 {
            0 => BehaviorType::Purchase,
            1 | 2 => BehaviorType::AddToCart,
            3 => BehaviorType::Wishlist,
            _ => BehaviorType::View,
        };
        shop.service.track_behavior(
            TrackRequest::new(user_id, behavior_type)
                .with_product(product_id)
                .with_session(format!("sim-{}", user_id)),
        );
    }
    println!("{} Log now holds {} events", "✓".green(), shop.behavior.len());

    // A shopper with no history falls back to the shared trending list
    let fresh_user = users + 1;
    let trending = shop
        .service
        .get_recommendations(fresh_user, 10, &[Strategy::Trending])
        .await;
    println!("{}", "Trending after simulation:".bold().blue());
    print_recommendations(shop, &trending, false);
    Ok(())
}

fn product_title(shop: &DemoShop, product_id: u64) -> String {
    shop.catalog
        .get_product(product_id)
        .ok()
        .flatten()
        .map(|p| p.title)
        .unwrap_or_else(|| format!("product {}", product_id))
}

/// Helper to format and print recommendations
fn print_recommendations(shop: &DemoShop, recommendations: &[Recommendation], explain: bool) {
    if recommendations.is_empty() {
        println!("{}", "No recommendations (no usable signal for this user).".yellow());
        return;
    }

    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.3} [{}]",
            (rank + 1).to_string().green(),
            product_title(shop, rec.product_id),
            rec.score,
            rec.strategy.to_string().cyan(),
        );
        if explain {
            let metadata: Vec<String> = rec
                .metadata
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            println!("   algorithm: {}, {}", rec.algorithm, metadata.join(", "));
        }
    }
}
