use crate::infra::build_review_service;
use clap::Args;
use interview_access::access::Person;
use interview_access::config::AppConfig;
use interview_access::error::AppError;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReviewArgs {
    /// Number of occurred interviews required for a grant
    #[arg(long)]
    pub(crate) count: NonZeroUsize,
    /// JSON file shaped like the HTTP body: {"people": [{"email", "username"}]}
    #[arg(long)]
    pub(crate) people: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Roster {
    people: Vec<Person>,
}

fn parse_roster(raw: &str) -> Result<Vec<Person>, AppError> {
    let roster: Roster = serde_json::from_str(raw)?;
    Ok(roster.people)
}

pub(crate) async fn run_review(args: ReviewArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let people = parse_roster(&std::fs::read_to_string(&args.people)?)?;

    let service = build_review_service(&config)?;
    let decisions = service.review(args.count, &people).await?;

    println!("{}", serde_json::to_string_pretty(&decisions)?);
    Ok(())
}
