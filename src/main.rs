use anyhow::{Context, Result};
use clap::{App, Arg};
use log::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use twitter_preview::{
    config::{Config, Credentials},
    events::{Handler, TriggerMatcher},
    logger,
    transport::StdoutTransport,
    twitter::{session::SessionStore, Twitter},
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("Posts one-line previews of Twitter links found in chat messages")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.yml")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase log verbosity"),
        )
        .arg(
            Arg::with_name("MESSAGE")
                .multiple(true)
                .help("Chat messages to scan; reads stdin lines when omitted"),
        )
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logger::init(level)?;

    let mut config = Config::new();
    config.load(matches.value_of("config"))?;

    if let Ok(Credentials::Session { .. }) = config.credentials() {
        let store = SessionStore::new(config.session_base());
        if let Err(e) = store.migrate() {
            warn!("Could not migrate legacy session file: {}", e);
        }
    }

    let twitter = Twitter::from_config(&config)?;
    let matcher = TriggerMatcher::new(&config.alternate_domains)?;
    let transport = StdoutTransport::new(config.max_line_length);
    let formatter = config.time_formatter();
    let handler = Handler::new(&twitter, &transport, &formatter, config.show_quoted_posts);

    if let Some(messages) = matches.values_of("MESSAGE") {
        for message in messages {
            for event in matcher.parse(message) {
                handler.handle(event).await?;
            }
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        for event in matcher.parse(&line) {
            handler.handle(event).await?;
        }
    }
    Ok(())
}
