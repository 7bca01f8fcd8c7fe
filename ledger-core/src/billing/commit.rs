use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::batch::BatchReport;
use crate::store::{to_payload, Collection, RecordStore};

/// Partial update written to every purchase a bill covers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BilledPatch {
    billed: bool,
    billed_at: DateTime<Utc>,
}

/// Marks the given purchases as billed, one store update at a time.
///
/// This is not a transaction. A failure on one purchase is recorded in the
/// report and the loop moves on; updates that already went through stay
/// applied.
#[instrument(skip(store, purchase_ids), fields(count = purchase_ids.len()))]
pub async fn mark_as_billed(
    store: &dyn RecordStore,
    purchase_ids: &[String],
    now: DateTime<Utc>,
) -> BatchReport {
    let mut report = BatchReport::default();

    for id in purchase_ids {
        let patch = BilledPatch {
            billed: true,
            billed_at: now,
        };

        let result = match to_payload(&patch) {
            Ok(payload) => store.update(Collection::Purchases, id, payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => report.record_success(id.as_str()),
            Err(e) => {
                error!("Failed to mark purchase {} as billed: {}", id, e);
                report.record_failure(id.as_str(), e);
            }
        }
    }

    info!(
        "Billing commit finished: {} marked, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    #[tokio::test]
    async fn marks_existing_purchases_and_reports_missing_ones() {
        let store = InMemoryStore::new();
        let p1 = store
            .create(Collection::Purchases, json!({"billed": false}))
            .await
            .unwrap();
        let p2 = store
            .create(Collection::Purchases, json!({"billed": false}))
            .await
            .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();

        let ids = vec![p1.clone(), "gone".to_string(), p2.clone()];
        let report = mark_as_billed(&store, &ids, now).await;

        assert_eq!(report.succeeded, vec![p1, p2]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "gone");

        for record in store.list(Collection::Purchases).await.unwrap() {
            assert_eq!(record.fields["billed"], json!(true));
            assert_eq!(record.fields["billedAt"], json!("2024-02-01T10:00:00Z"));
        }
    }
}
