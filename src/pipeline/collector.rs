use crate::model::Record;
use tokio::sync::mpsc;

/// Drains the record queue until every extraction worker is done
///
/// Returns once the queue is closed, i.e. after the extraction pool's
/// completion barrier. Records keep their arrival order.
pub async fn collect(mut records: mpsc::Receiver<Record>) -> Vec<Record> {
    let mut collected = Vec::new();
    while let Some(record) = records.recv().await {
        tracing::trace!("Collected record for {}", record.url);
        collected.push(record);
    }
    collected
}
