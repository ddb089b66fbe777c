//! Moderation walkthrough against the in-memory runtime

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::DomainArg;
use marketplace_core::common::Status;
use marketplace_core::domains::mediums_of_exchange::{ExchangeType, MediumOfExchange};
use marketplace_core::domains::moderation::{Domain, EntityStore};
use marketplace_core::domains::service_types::ServiceType;
use marketplace_core::kernel::{AppContext, InMemoryConnector, InMemoryRuntime};
use marketplace_core::Config;

pub async fn run(domain: DomainArg, config: Config, lag: u32, flaky_connects: u32) -> Result<()> {
    let runtime = Arc::new(InMemoryRuntime::marketplace());
    runtime.set_visibility_lag(lag);

    println!("{}", "Connecting to the in-memory runtime...".bright_blue().bold());
    let connector = InMemoryConnector::new(runtime.clone()).failing_times(flaky_connects);
    let context = AppContext::connect(&connector, config)
        .await
        .context("Runtime never came up")?;
    println!(
        "{}",
        format!("Connected after {} attempt(s)", connector.attempts()).green()
    );

    match domain {
        DomainArg::ServiceTypes => {
            let samples = vec![
                ServiceType::new("Web Development", "Websites and web applications")
                    .technical()
                    .with_tags(["javascript", "css"]),
                ServiceType::new("Gardening", "Planting, pruning and garden care"),
                ServiceType::new("Translation", "Written translation between languages"),
            ];
            let edited = ServiceType::new("Gardening", "Planting, pruning, composting")
                .with_tags(["outdoors"]);
            moderate(&context.service_types, samples, edited).await?;
        }
        DomainArg::MediumsOfExchange => {
            let samples = vec![
                MediumOfExchange::new("EUR", "Euro", ExchangeType::Currency),
                MediumOfExchange::new("TIME", "Time Banking", ExchangeType::Base),
                MediumOfExchange::new("PAY_IT_FORWARD", "Pay it Forward", ExchangeType::Base),
            ];
            let edited = MediumOfExchange::new("TIME", "Time Banking", ExchangeType::Base)
                .with_description("One hour for one hour");
            moderate(&context.mediums_of_exchange, samples, edited).await?;
        }
    }

    println!();
    println!(
        "{}",
        format!("{} remote calls issued", runtime.calls().len()).dimmed()
    );
    Ok(())
}

/// First sample is created directly, the rest are suggested. The second is
/// approved then edited, the third rejected.
async fn moderate<D: Domain>(
    store: &EntityStore<D>,
    samples: Vec<D::Entry>,
    edited: D::Entry,
) -> Result<()> {
    let _events = store.events().on_status_changed(|original, from, to| {
        let from = from.map(|s| s.to_string()).unwrap_or_else(|| "untracked".into());
        println!("  {} {} {} -> {}", "event".magenta(), original, from, to);
    });

    let mut samples = samples.into_iter();
    let mut submitted = Vec::new();
    if let Some(first) = samples.next() {
        submitted.push(store.create(first).await?);
    }
    for entry in samples {
        submitted.push(store.suggest(entry).await?);
    }
    for entity in &submitted {
        println!("{} {}", "submitted".green(), D::label(&entity.entry));
        store.wait_until_visible(&entity.original()).await?;
    }

    if let Some(entity) = submitted.get(1) {
        store.approve(&entity.original()).await?;
        let revised = store.update(&entity.original(), edited).await?;
        println!("{} {}", "edited".yellow(), D::label(&revised.entry));
    }
    if let Some(entity) = submitted.get(2) {
        store.reject(&entity.original()).await?;
    }

    let snapshot = store.get_all_by_status().await?;
    println!();
    for status in Status::ALL {
        let heading = format!("{} ({})", status, snapshot.get(status).len());
        let heading = match status {
            Status::Pending => heading.yellow(),
            Status::Approved => heading.green(),
            Status::Rejected => heading.red(),
        };
        println!("{}", heading.bold());
        for entity in snapshot.get(status) {
            println!("  {} {}", D::label(&entity.entry), entity.original().to_string().dimmed());
        }
    }

    if let Some(entity) = submitted.get(1) {
        let history = store.status_history(&entity.original()).await?;
        println!();
        println!("{}", "Status history".bold());
        for change in history {
            println!("  {} {}", change.changed_at.format("%H:%M:%S%.3f"), change.status);
        }
    }
    Ok(())
}
