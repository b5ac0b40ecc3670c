use crate::core::validator::LotterySchema;
use crate::domain::model::{DrawnNumber, Prize, RawRecord, TransformedRecord};
use crate::domain::report::FileOutcome;
use serde_json::Value;

/// Flattens a lottery result into one prize per category, keeping the
/// category order of the source document and the round order within each.
pub fn transform(record: &RawRecord) -> TransformedRecord {
    let result = &record.response.result;

    let prizes = result
        .data
        .iter()
        .map(|(category, entry)| Prize {
            category: category.to_string(),
            price: entry.price.clone(),
            numbers: entry
                .number
                .iter()
                .map(|n| DrawnNumber {
                    round: n.round.clone(),
                    value: n.value.clone(),
                })
                .collect(),
        })
        .collect();

    TransformedRecord {
        lottery_date: result.date.clone(),
        prizes,
    }
}

/// Parse, validate and transform one raw document.
pub fn validate_and_transform(schema: &LotterySchema, contents: &[u8]) -> FileOutcome {
    // 部分編輯器存檔時會加上 UTF-8 BOM
    let contents = contents.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(contents);
    let value: Value = match serde_json::from_slice(contents) {
        Ok(value) => value,
        Err(e) => return FileOutcome::Failed(format!("Invalid JSON: {}", e)),
    };

    if let Err(violations) = schema.check(&value) {
        return FileOutcome::Rejected(violations);
    }

    match RawRecord::from_value(value) {
        Ok(record) => FileOutcome::Transformed(transform(&record)),
        Err(e) => FileOutcome::Failed(format!("Schema-valid document could not be decoded: {}", e)),
    }
}
