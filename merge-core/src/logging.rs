use chrono::Utc;
use slog::{o, Drain, Level, Logger, OwnedKVList, Record};
use slog_async::{Async, OverflowStrategy};
use slog_envlogger::LogBuilder;
use slog_scope::GlobalLoggerGuard;
use slog_term::{FullFormat, TermDecorator};
use std::{
    io::{self, Write},
    panic, thread,
};

/// Initialize indexer logging.
///
/// `filter` uses the `env_logger` syntax, e.g. `warn,merge_core=debug`. Records
/// emitted through the `log` facade (which is what the library uses) are
/// forwarded into the returned logger, so the guard must be kept alive for as
/// long as events are being processed.
pub fn init(filter: impl AsRef<str>) -> (Logger, GlobalLoggerGuard) {
    // Errors go to stderr so that a failed replay is visible even when stdout
    // is redirected to a file.
    let format = ByLevel {
        errors: FullFormat::new(TermDecorator::new().stderr().build())
            .use_custom_timestamp(utc_timestamp)
            .build(),
        others: FullFormat::new(TermDecorator::new().stdout().build())
            .use_custom_timestamp(utc_timestamp)
            .build(),
    }
    .fuse();
    let drain = Async::new(LogBuilder::new(format).parse(filter.as_ref()).build())
        .overflow_strategy(OverflowStrategy::Block)
        .build();
    let logger = Logger::root(drain.fuse(), o!());

    let guard = slog_scope::set_global_logger(logger.clone());
    if let Err(err) = slog_stdlog::init() {
        slog::warn!(logger, "log facade already initialized: {}", err);
    }

    set_panic_hook();

    (logger, guard)
}

/// Panics abort index construction, so they are routed through the log
/// facilities to end up next to the event that caused them.
fn set_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let thread = thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>");

        log::error!("thread '{}' {}", thread_name, info);
    }));
}

/// Sends `Error` and `Critical` records to one drain and everything else to
/// the other.
struct ByLevel<E, O> {
    errors: E,
    others: O,
}

impl<E, O> Drain for ByLevel<E, O>
where
    E: Drain<Ok = (), Err = io::Error>,
    O: Drain<Ok = (), Err = io::Error>,
{
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        if record.level().is_at_least(Level::Error) {
            self.errors.log(record, values)
        } else {
            self.others.log(record, values)
        }
    }
}

fn utc_timestamp(io: &mut dyn Write) -> io::Result<()> {
    write!(io, "{}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
}
