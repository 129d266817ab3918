use anyhow::{Context as _, Result};
use merge_core::{
    event_log::{write_atomically, EventLog},
    events::parse_address,
    invariants::check_invariants,
    logging,
    models::{Collection, Nft, User},
    oracle::PackedValues,
    BlockContext, Event, InMemoryStore, Indexer, IndexerConfig, MergeEventHandler,
};
use primitive_types::H160;
use serde::Serialize;
use std::{convert::TryFrom, io, path::PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "merge-indexer", rename_all = "kebab")]
struct Options {
    /// JSON event log to replay, in chain order or not.
    #[structopt(long, env = "EVENT_LOG", parse(from_os_str))]
    event_log: PathBuf,

    /// JSON object mapping decimal token ids to the packed values the
    /// contract reported for them at mint time.
    #[structopt(long, env = "PACKED_VALUES", parse(from_os_str))]
    packed_values: PathBuf,

    /// Where to write the resulting entities. Printed to stdout if omitted.
    #[structopt(long, env = "OUTPUT", parse(from_os_str))]
    output: Option<PathBuf>,

    /// Only replay events up to and including this block.
    #[structopt(long, env = "UNTIL_BLOCK")]
    until_block: Option<u64>,

    /// Check the projection invariants after every event and stop at the
    /// first violation.
    #[structopt(long)]
    check_invariants: bool,

    #[structopt(long, env = "COLLECTION_ADDRESS", parse(try_from_str = parse_address))]
    collection_address: Option<H160>,

    #[structopt(long, env = "DISTRIBUTOR", parse(try_from_str = parse_address))]
    distributor: Option<H160>,

    #[structopt(long, env = "DEAD_ADDRESS", parse(try_from_str = parse_address))]
    dead_address: Option<H160>,

    #[structopt(long, env = "COLLECTION_NAME")]
    collection_name: Option<String>,

    #[structopt(long, env = "TOKEN_STANDARD")]
    token_standard: Option<String>,

    #[structopt(long, env = "LOG_FILTER", default_value = "warn,merge_core=info,merge_indexer=info")]
    log_filter: String,
}

impl Options {
    fn indexer_config(&self) -> IndexerConfig {
        let defaults = IndexerConfig::default();
        IndexerConfig {
            collection_address: self
                .collection_address
                .unwrap_or(defaults.collection_address),
            distributor: self.distributor.unwrap_or(defaults.distributor),
            dead_address: self.dead_address.unwrap_or(defaults.dead_address),
            collection_name: self
                .collection_name
                .clone()
                .unwrap_or(defaults.collection_name),
            token_standard: self
                .token_standard
                .clone()
                .unwrap_or(defaults.token_standard),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Projection<'a> {
    collection: Option<&'a Collection>,
    users: Vec<&'a User>,
    nfts: Vec<&'a Nft>,
}

fn main() {
    let options = Options::from_args();
    let (_, guard) = logging::init(&options.log_filter);
    log::info!("Starting merge indexer with runtime options: {:#?}", options);

    let result = run(options);
    if let Err(err) = &result {
        log::error!("indexing failed: {:?}", err);
    }
    // Flush the async logger before exiting.
    drop(guard);
    if result.is_err() {
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<()> {
    let config = options.indexer_config();
    let event_log = EventLog::try_from(options.event_log.as_path())?;
    let packed_values = PackedValues::from_file(&options.packed_values)?;
    match event_log.last_handled_block() {
        Some(block_number) => log::info!(
            "event log holds {} events through block {}",
            event_log.len(),
            block_number
        ),
        None => log::warn!("event log {} is empty", options.event_log.display()),
    }

    let handler = MergeEventHandler::new(config.clone(), Box::new(packed_values));
    let mut indexer = Indexer::new(InMemoryStore::new(), Box::new(handler));
    let events: Box<dyn Iterator<Item = (BlockContext, &Event)>> = match options.until_block {
        Some(block_number) => Box::new(event_log.events_until_block(block_number)),
        None => Box::new(event_log.events()),
    };

    let mut handled = 0;
    for (block, event) in events {
        indexer.handle_event(&block, event)?;
        if options.check_invariants {
            check_invariants(indexer.store(), &config).with_context(|| {
                format!(
                    "projection inconsistent after {} event at {}",
                    event.name(),
                    block.sort_key()
                )
            })?;
        }
        handled += 1;
    }
    log::info!(
        "replayed {} events, last one at {}",
        handled,
        indexer
            .last_handled()
            .map(|key| key.to_string())
            .unwrap_or_else(|| "nothing".to_string())
    );

    let store = indexer.into_store();
    if store.is_empty() {
        log::warn!("no entities were indexed");
    } else {
        log::info!("projection holds {} entities", store.len());
    }
    let projection = Projection {
        collection: store.collection(&config.collection_id()),
        users: store.users().collect(),
        nfts: store.nfts().collect(),
    };
    match &options.output {
        Some(path) => write_atomically(path, |writer| {
            serde_json::to_writer_pretty(writer, &projection)?;
            Ok(())
        })
        .with_context(|| format!("failed to write {}", path.display()))?,
        None => serde_json::to_writer_pretty(io::stdout().lock(), &projection)?,
    }
    Ok(())
}
