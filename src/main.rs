//! Interactive planner REPL.
//!
//! Reads user turns from stdin and prints the assistant's replies.
//! Without an API key configured, selections come from the heuristic
//! fallback via the mock provider.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stag_planner::adapters::ai::{MockReasoningProvider, OpenAiProvider};
use stag_planner::adapters::catalog::InMemoryCatalog;
use stag_planner::application::handlers::chat::{SendMessageCommand, SendMessageHandler};
use stag_planner::config::AppConfig;
use stag_planner::domain::catalog::{ServiceCategory, ServiceRecord};
use stag_planner::domain::conversation::Conversation;
use stag_planner::domain::foundation::ServiceId;
use stag_planner::domain::selection::ReasoningSelector;
use stag_planner::ports::ReasoningProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;

    let provider: Arc<dyn ReasoningProvider> = match OpenAiProvider::from_config(&config.ai) {
        Ok(provider) => {
            info!(model = %config.ai.model, "using OpenAI provider");
            Arc::new(provider)
        }
        Err(_) => {
            warn!("no API key configured, running offline with heuristic selection");
            Arc::new(MockReasoningProvider::new())
        }
    };

    let catalog = Arc::new(InMemoryCatalog::new(demo_catalog()));
    let selector = Arc::new(ReasoningSelector::new(provider));
    let handler = SendMessageHandler::new(catalog, selector);

    let mut conversation = Conversation::new();
    println!("{}", SendMessageHandler::opening_message());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let command = SendMessageCommand {
            message: line.to_string(),
            today: Utc::now().date_naive(),
        };
        match handler.handle(&mut conversation, command).await {
            Ok(result) => println!("{}", result.reply),
            Err(err) => eprintln!("error: {}", err),
        }
    }

    Ok(())
}

fn demo_catalog() -> Vec<ServiceRecord> {
    fn svc(
        id: &str,
        name: &str,
        category: ServiceCategory,
        description: &str,
        price: f64,
    ) -> ServiceRecord {
        ServiceRecord {
            id: ServiceId::new(id).expect("demo ids are non-empty"),
            name: name.to_string(),
            alt_name: None,
            category,
            description: description.to_string(),
            price,
            currency: "USD".to_string(),
            duration_minutes: None,
            city: "Austin".to_string(),
            min_group: None,
            max_group: None,
        }
    }

    vec![
        svc("atx-smokehouse", "Smokehouse 512", ServiceCategory::Restaurant, "Texas bbq, brisket and steak for big tables", 85.0),
        svc("atx-taqueria", "Taqueria Norte", ServiceCategory::Restaurant, "late night tacos", 25.0),
        svc("atx-diner", "Congress Diner", ServiceCategory::Restaurant, "breakfast and recovery brunch", 30.0),
        svc("atx-topgolf", "Topgolf Austin", ServiceCategory::Activity, "golf bays, beer and music", 65.0),
        svc("atx-boat", "Lake Travis Boat Party", ServiceCategory::Activity, "private boat with captain on the lake", 150.0),
        svc("atx-axe", "Axe House", ServiceCategory::Activity, "axe throwing lanes for groups", 45.0),
        svc("atx-neon", "Neon Room", ServiceCategory::Nightclub, "dance floor, bottle service until late", 120.0),
        svc("atx-dive", "Rainey Street Dive", ServiceCategory::Bar, "cheap drinks, patio", 20.0),
        svc("atx-whiskey", "Whiskey Library", ServiceCategory::Bar, "whiskey flights and cigars", 70.0),
        svc("atx-partybus", "ATX Party Bus", ServiceCategory::Transport, "bus between venues with a cooler", 95.0),
    ]
}
