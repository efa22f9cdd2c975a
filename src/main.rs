mod telemetry;

use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;
use subtrack_api::{
    execute, GetMonthlyCalendarUseCase, GetUpcomingBillingsUseCase, SubtrackError,
};
use subtrack_domain::{date::parse_date, Subscription};
use subtrack_infra::{setup_context, Config, StaticTimeSys};
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

const USAGE: &str = "Usage: subtrack <subscriptions.json> [YYYY-MM-DD]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("subtrack".into(), Config::log_level_from_env());
    init_subscriber(subscriber);

    let mut args = std::env::args().skip(1);
    let path = args.next().context(USAGE)?;
    let date = match args.next() {
        Some(date) => Some(
            parse_date(&date).with_context(|| format!("Invalid date: {}. {}", date, USAGE))?,
        ),
        None => None,
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Unable to read subscriptions file: {}", path))?;
    let subscriptions: Vec<Subscription> = serde_json::from_str(&content)
        .with_context(|| format!("Unable to parse subscriptions file: {}", path))?;
    info!("Loaded {} subscriptions from {}", subscriptions.len(), path);

    let mut ctx = setup_context();
    if let Some(date) = date {
        freeze_today(&mut ctx, date);
    }
    ctx.repos.subscriptions.bulk_insert(&subscriptions).await?;

    let calendar = execute(GetMonthlyCalendarUseCase { date: None }, &ctx)
        .await
        .map_err(SubtrackError::from)?;
    let upcoming = execute(GetUpcomingBillingsUseCase::default(), &ctx)
        .await
        .map_err(SubtrackError::from)?;

    let output = serde_json::json!({
        "today": ctx.today(),
        "calendar": calendar,
        "upcoming": upcoming,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// A date given on the command line is already a calendar day and must not
/// be shifted by the configured timezone
fn freeze_today(ctx: &mut subtrack_infra::SubtrackContext, date: NaiveDate) {
    ctx.sys = Arc::new(StaticTimeSys::at_date(date));
    ctx.config.timezone = chrono_tz::Tz::UTC;
}
