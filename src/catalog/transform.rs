//! Reshaping feed rows into industry and tag groups.

use super::schema::ResponseSchema;
use super::slug::slugify;
use crate::models::{Catalog, RawRow, Response, ResponseType, SkipReason, SkippedRow};
use tracing::{debug, warn};

/// Build a fresh catalog from rows in feed order.
///
/// Rows that cannot be classified or have no usable industry are recorded
/// in [`Catalog::skipped`]; the remaining rows are still processed.
pub fn transform(rows: &[RawRow], schema: &ResponseSchema) -> Catalog {
    let mut catalog = Catalog::default();

    for (row_idx, row) in rows.iter().enumerate() {
        match normalize(row, schema) {
            Ok(response) => add_response(&mut catalog, response, row_idx),
            Err(reason) => {
                warn!("Skipping row {}: {}", row_idx, reason);
                catalog.skipped.push(SkippedRow {
                    row: row_idx,
                    reason,
                });
            }
        }
    }

    debug!(
        "Grouped {} responses into {} industries and {} tags ({} skipped)",
        catalog.responses.len(),
        catalog.industries.len(),
        catalog.tags.len(),
        catalog.skipped.len()
    );

    catalog
}

/// Classify a row and copy the fields its type recognizes, prefix stripped.
pub fn normalize(row: &RawRow, schema: &ResponseSchema) -> Result<Response, SkipReason> {
    let response_type = schema.classify(row)?;
    let mut response = Response::new(response_type);

    for field in schema.fields(response_type) {
        if let Some(value) = row.get(&prefixed(response_type, field)) {
            response.fields.insert(field.clone(), value.to_string());
        }
    }

    let has_industry = response
        .industry()
        .is_some_and(|industry| !slugify(industry).is_empty());
    if has_industry {
        Ok(response)
    } else {
        Err(SkipReason::MissingIndustry)
    }
}

fn prefixed(response_type: ResponseType, field: &str) -> String {
    format!("{}.{}", response_type.as_str(), field)
}

fn add_response(catalog: &mut Catalog, response: Response, row_idx: usize) {
    let idx = catalog.responses.len();

    if let Some(tags) = response.tags() {
        for tag in tags.split(',').map(str::trim) {
            let slug = slugify(tag);
            if slug.is_empty() {
                continue;
            }
            let group = catalog.tags.entry(&slug, tag);
            // A tag listed twice on one response only counts once.
            if group.members.last() != Some(&idx) {
                group.members.push(idx);
            }
        }
    }

    // Checked in normalize().
    let industry = response.industry().unwrap_or_default();
    let group = catalog.industries.entry(&slugify(industry), industry);
    if group.name != industry {
        debug!(
            "Row {}: industry {:?} grouped under {:?}",
            row_idx, industry, group.name
        );
    }
    group.members.push(idx);

    catalog.responses.push(response);
}
