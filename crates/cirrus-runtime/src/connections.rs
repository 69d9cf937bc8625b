//! Building and connecting the configured connections.

use cirrus_core::{BoxedConnection, ConnectionFactory, EventSink};
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::config::{ConfigResult, ConnectionConfig, validate_connections};

/// Builds one connection per config entry, in order.
///
/// Names are canonicalized first; two entries that canonicalize to the same
/// name are rejected.
pub(crate) fn build_connections(
    configs: &[ConnectionConfig],
    factory: &dyn ConnectionFactory,
    sink: &EventSink,
) -> ConfigResult<Vec<BoxedConnection>> {
    validate_connections(configs)?;

    Ok(configs
        .iter()
        .map(|config| {
            let record = config.to_record();
            debug!(
                connection = %record.name,
                server = %record.server,
                port = record.port,
                "Creating connection"
            );
            factory.create(record, sink.clone())
        })
        .collect())
}

/// Connects every connection concurrently. Failures are logged per
/// connection and do not affect the others.
pub(crate) async fn connect_all(connections: &[BoxedConnection]) {
    let results = join_all(connections.iter().map(|conn| async move {
        info!(connection = %conn.name(), "Connecting");
        (conn, conn.connect().await)
    }))
    .await;

    for (conn, result) in results {
        match result {
            Ok(()) => info!(connection = %conn.name(), "Connected"),
            Err(e) => error!(
                connection = %conn.name(),
                readable_name = %conn.readable_name(),
                error = %e,
                "Failed to connect"
            ),
        }
    }
}
