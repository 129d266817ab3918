//! A persisted, ordered log of contract events.
//!
//! Replaying a log from the start through an `Indexer` reproduces the entity
//! projection, which is how projections are rebuilt and how reconciliation
//! changes are checked against recorded history.

use crate::{
    events::{BlockContext, Event, EventSortKey},
    serialization::Version,
};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    convert::TryFrom,
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    ops::Bound,
    path::Path,
};
use typenum::U1;

/// A logged event as it appears in the file.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    #[serde(flatten)]
    block: BlockContext,
    event: Event,
}

#[derive(Deserialize, Serialize)]
struct EventLogFile {
    version: Version<U1>,
    events: Vec<Entry>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Value {
    timestamp: u64,
    event: Event,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventLog {
    events: BTreeMap<EventSortKey, Value>,
}

impl EventLog {
    /// Reads a log. Entries may appear in any order but no two may share a
    /// position in the chain.
    pub fn read(reader: impl Read) -> Result<Self> {
        let file: EventLogFile = serde_json::from_reader(reader)?;
        let mut log = EventLog::default();
        for Entry { block, event } in file.events {
            let key = block.sort_key();
            if log.events.contains_key(&key) {
                return Err(anyhow!("duplicate event at {}", key));
            }
            log.insert(block, event);
        }
        Ok(log)
    }

    /// Records an event, replacing whatever was logged at the same position.
    pub fn insert(&mut self, block: BlockContext, event: Event) {
        let replaced = self.events.insert(
            block.sort_key(),
            Value {
                timestamp: block.timestamp,
                event,
            },
        );
        if let Some(replaced) = replaced {
            log::warn!(
                "replaced {} event logged at {}",
                replaced.event.name(),
                block.sort_key()
            );
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        let file = EventLogFile {
            version: Version::default(),
            events: self
                .events()
                .map(|(block, event)| Entry {
                    block,
                    event: event.clone(),
                })
                .collect(),
        };
        serde_json::to_writer(writer, &file)?;
        Ok(())
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        write_atomically(path.as_ref(), |writer| self.write_to(writer))
    }

    pub fn last_handled_block(&self) -> Option<u64> {
        Some(self.events.keys().next_back()?.block_number)
    }

    /// All events in chain order along with the block they were emitted in.
    pub fn events(&self) -> impl DoubleEndedIterator<Item = (BlockContext, &'_ Event)> + '_ {
        self.events.iter().map(|(key, value)| (context(key, value), &value.event))
    }

    /// Events up to and including the last one of `block_number`.
    pub fn events_until_block(
        &self,
        block_number: u64,
    ) -> impl Iterator<Item = (BlockContext, &'_ Event)> + '_ {
        self.events
            .range(bounds_until_end_of_block(block_number))
            .map(|(key, value)| (context(key, value), &value.event))
    }
}

fn context(key: &EventSortKey, value: &Value) -> BlockContext {
    BlockContext {
        block_number: key.block_number,
        log_index: key.log_index,
        timestamp: value.timestamp,
    }
}

fn bounds_until_end_of_block(block_number: u64) -> (Bound<EventSortKey>, Bound<EventSortKey>) {
    (
        Bound::Unbounded,
        Bound::Excluded(EventSortKey {
            block_number: block_number.saturating_add(1),
            ..Default::default()
        }),
    )
}

/// Writes to a temporary file next to `path` and renames it into place once
/// complete, so readers never observe a partial file.
pub fn write_atomically(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<()>,
) -> Result<()> {
    let temp_path = path.with_extension("temp");
    {
        let temp_file = File::create(&temp_path)
            .with_context(|| format!("couldn't create {}", temp_path.display()))?;
        let mut buffered_writer = BufWriter::new(temp_file);
        write(&mut buffered_writer)?;
        buffered_writer.flush()?;
    }
    fs::rename(&temp_path, path)
        .with_context(|| format!("couldn't move {} into place", temp_path.display()))?;
    Ok(())
}

impl TryFrom<File> for EventLog {
    type Error = anyhow::Error;

    fn try_from(mut file: File) -> Result<Self> {
        let buffered_reader = BufReader::new(&mut file);
        let events = EventLog::read(buffered_reader)
            .with_context(|| format!("Failed to read file: {:?}", file))?;
        log::info!(
            "Successfully loaded {} events in {} bytes from event log file",
            events.len(),
            file.metadata()?.len(),
        );
        Ok(events)
    }
}

impl TryFrom<&Path> for EventLog {
    type Error = anyhow::Error;

    fn try_from(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("couldn't open {}", path.display()))?;
        EventLog::try_from(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_data::*;
    use primitive_types::H160;
    use serde_json::json;

    fn block(block_number: u64, log_index: u64) -> BlockContext {
        BlockContext {
            block_number,
            log_index,
            timestamp: 1_617_000_000 + block_number * 13
        }
    }

    fn sample() -> EventLog {
        let mut log = EventLog::default();
        log.insert(
            block(12, 1),
            Event::MassUpdate(MassUpdate {
                token_id_burned: 1.into(),
                token_id_persist: 2.into(),
                mass: 3.into()
            }),
        );
        log.insert(
            block(11, 7),
            Event::Transfer(Transfer {
                from: H160::zero(),
                to: H160::from_low_u64_be(1),
                token_id: 1.into()
            }),
        );
        log.insert(
            block(12, 0),
            Event::WhitelistUpdate(WhitelistUpdate {
                address: H160::from_low_u64_be(1),
                status: true
            }),
        );
        log
    }

    #[test]
    fn events_are_in_chain_order() {
        let log = sample();
        let keys = log
            .events()
            .map(|(block, _)| block.sort_key().to_string())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["11:7", "12:0", "12:1"]);
        assert_eq!(log.last_handled_block(), Some(12));
        assert_eq!(log.events_until_block(11).count(), 1);
        assert_eq!(log.events_until_block(12).count(), 3);
        assert_eq!(
            log.events().next().map(|(block, _)| block.timestamp),
            Some(1_617_000_143)
        );
    }

    #[test]
    fn reads_json_log() {
        let file = json!({
            "version": 1,
            "events": [
                {
                    "blockNumber": 5,
                    "logIndex": 2,
                    "timestamp": 1617000000u64,
                    "event": {
                        "name": "AlphaMassUpdate",
                        "params": { "tokenId": "4", "alphaMass": "90" }
                    }
                },
                {
                    "blockNumber": 5,
                    "logIndex": 1,
                    "timestamp": 1617000000u64,
                    "event": {
                        "name": "Transfer",
                        "params": {
                            "from": "0x0000000000000000000000000000000000000000",
                            "to": "0xe052113bd7d7700d623414a0a4585bcae754e9d5",
                            "tokenId": "4"
                        }
                    }
                }
            ]
        });
        let log = EventLog::read(file.to_string().as_bytes()).unwrap();
        let names = log
            .events()
            .map(|(_, event)| event.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Transfer", "AlphaMassUpdate"]);
    }

    #[test]
    fn rejects_duplicates_and_other_versions() {
        let entry = json!({
            "blockNumber": 5,
            "logIndex": 1,
            "timestamp": 0,
            "event": {
                "name": "WhitelistUpdate",
                "params": {
                    "address": "0x0000000000000000000000000000000000000001",
                    "status": true
                }
            }
        });
        let duplicate = json!({ "version": 1, "events": [entry.clone(), entry] });
        assert!(EventLog::read(duplicate.to_string().as_bytes()).is_err());

        let future = json!({ "version": 2, "events": [] });
        assert!(EventLog::read(future.to_string().as_bytes()).is_err());
    }

    #[test]
    fn write_then_read_preserves_log() {
        let log = sample();
        let mut bytes = Vec::new();
        log.write_to(&mut bytes).unwrap();
        assert_eq!(EventLog::read(&bytes[..]).unwrap(), log);
    }

    #[test]
    fn write_to_file_replaces_atomically() {
        let path = std::env::temp_dir().join(format!("merge-event-log-{}.json", std::process::id()));
        sample().write_to_file(&path).unwrap();
        assert!(!path.with_extension("temp").exists());

        let recovered = EventLog::try_from(path.as_path()).unwrap();
        assert_eq!(recovered, sample());
        fs::remove_file(&path).unwrap();
    }
}
