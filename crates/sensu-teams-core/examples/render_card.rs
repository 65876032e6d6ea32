//! Prints the card the handler would post for an event, without sending it.
//!
//! Reads a single Sensu event from the file given as first argument, or from
//! stdin when no argument is given.

use sensu_teams_core::{build_card, Event, HandlerOptions};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Read};

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1);
    let mut reader: Box<dyn Read> = match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(io::stdin()),
    };

    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    let event: Event = serde_json::from_str(&input)?;
    event.validate()?;

    let mut options = HandlerOptions {
        webhook_url: "https://example.invalid/preview".to_string(),
        include_entity_labels: true,
        redact: true,
        ..HandlerOptions::default()
    };
    options.apply_annotations(&event)?;
    let config = options.validate()?;

    let card = build_card(&event, &config);
    serde_json::to_writer_pretty(io::stdout(), &card)?;
    println!();

    Ok(())
}
