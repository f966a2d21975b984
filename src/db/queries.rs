use crate::models::{IttItem, MatchPairRow, MatchRecord, ResponseItem};
use sqlx::PgPool;
use std::path::Path;

/// All ITT items for a project, in bill order
pub async fn list_itt_items(pool: &PgPool, project_id: i64) -> Result<Vec<IttItem>, sqlx::Error> {
    sqlx::query_as::<_, IttItem>(
        r#"
        SELECT itt_item_id, project_id, section_id, item_code,
               description, unit, qty, rate, amount
        FROM t_tender_itt_item
        WHERE project_id = $1
        ORDER BY itt_item_id
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Response items not yet bound to an accepted or manual match, optionally
/// restricted to one contractor
pub async fn list_unmatched_response_items(
    pool: &PgPool,
    project_id: i64,
    contractor_id: Option<i64>,
) -> Result<Vec<ResponseItem>, sqlx::Error> {
    sqlx::query_as::<_, ResponseItem>(
        r#"
        SELECT r.response_item_id, r.project_id, r.contractor_id, r.section_guess,
               r.item_code, r.description, r.unit, r.qty, r.rate, r.amount, r.amount_label
        FROM t_tender_response_item r
        WHERE r.project_id = $1
          AND ($2::bigint IS NULL OR r.contractor_id = $2)
          AND NOT EXISTS (
              SELECT 1 FROM t_tender_match m
              WHERE m.response_item_id = r.response_item_id
                AND m.status IN ('accepted', 'manual')
          )
        ORDER BY r.response_item_id
        "#,
    )
    .bind(project_id)
    .bind(contractor_id)
    .fetch_all(pool)
    .await
}

/// Every (response item, ITT item) pair already represented by a match record
pub async fn list_match_pairs(
    pool: &PgPool,
    project_id: i64,
) -> Result<Vec<MatchPairRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchPairRow>(
        r#"
        SELECT response_item_id, itt_item_id, status
        FROM t_tender_match
        WHERE project_id = $1
        ORDER BY response_item_id, itt_item_id
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Batch-insert suggested match records. The deterministic match_id makes the
/// insert idempotent under ON CONFLICT DO NOTHING.
pub async fn insert_match_records(
    pool: &PgPool,
    records: &[MatchRecord],
) -> Result<(), sqlx::Error> {
    if records.is_empty() {
        return Ok(());
    }

    tracing::debug!("Building batch insert for {} match records", records.len());

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO t_tender_match (
            match_id, project_id, itt_item_id, contractor_id, response_item_id,
            status, confidence, match_type, reason, comment,
            created_at, updated_at
        ) ",
    );

    query_builder.push_values(records, |mut b, record| {
        b.push_bind(&record.match_id)
            .push_bind(record.project_id)
            .push_bind(record.itt_item_id)
            .push_bind(record.contractor_id)
            .push_bind(record.response_item_id)
            .push_bind(record.status.as_str())
            .push_bind(record.confidence)
            .push_bind(&record.match_type)
            .push_bind(&record.reason)
            .push_bind(record.comment.clone())
            .push_bind(record.created_at)
            .push_bind(record.updated_at);
    });
    query_builder.push(" ON CONFLICT (match_id) DO NOTHING");

    // 30 second guard against a wedged pool
    let execute_result = tokio::time::timeout(
        std::time::Duration::from_secs(30),
        query_builder.build().execute(pool),
    )
    .await;

    match execute_result {
        Ok(Ok(result)) => {
            tracing::info!("Inserted {} suggested match rows", result.rows_affected());
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!("Match insert failed: {:?}", e);
            Err(e)
        }
        Err(_) => {
            tracing::error!("Match insert timed out (>30s)");
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

/// Export match records to a CSV file for the downstream report step
pub fn export_to_csv(
    records: &[MatchRecord],
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use csv::Writer;
    use std::fs::File;

    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    for record in records {
        writer.write_record(&[
            record.match_id.clone(),
            record.project_id.to_string(),
            record.itt_item_id.to_string(),
            record.contractor_id.to_string(),
            record.response_item_id.to_string(),
            record.status.to_string(),
            record.confidence.to_string(),
            record.match_type.clone(),
            record.reason.clone(),
            record.comment.clone().unwrap_or_default(),
            record.created_at.to_rfc3339(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
