//! Per-sex breakdown of a metric across category buckets (age groups) for one region.

use crate::config::CategoricalColumns;
use crate::error::{QueryError, QueryResult};
use crate::series::{AxisValue, ProportionResult, Share};
use crate::types::{cell, DataType, RecordTable};

use super::{column_index, metric_index};

/// Break `cols.metric` down by `cols.group` for the male and female rows of `region`.
///
/// `region` of `""` or `"all"` reads the nation-wide rows (`cols.all_regions_label`). Missing
/// metric cells count as zero and values are truncated to whole counts. With `normalize`, each
/// sex's counts become fractions of that sex's total; an all-zero group stays all zero.
///
/// Bucket order follows the source rows. Unlike the time-series queries, a region with no rows
/// at all is an error, since an empty breakdown carries no information.
pub fn proportions(
    table: &RecordTable,
    cols: &CategoricalColumns,
    region: &str,
    normalize: bool,
) -> QueryResult<ProportionResult> {
    let region = match region.trim() {
        "" | "all" => cols.all_regions_label.as_str(),
        other => other,
    };
    let region_idx = column_index(table, &cols.region, DataType::Utf8)?;
    let sex_idx = column_index(table, &cols.sex, DataType::Utf8)?;
    column_index(table, &cols.group, DataType::Utf8)?;
    metric_index(table, &cols.metric)?;

    let scoped = table.filter_rows(|row| cell(row, region_idx).as_str() == Some(region));
    if scoped.is_empty() {
        return Err(QueryError::UnknownRegion {
            region: region.to_string(),
        });
    }

    let breakdown = |label: &str| -> QueryResult<Vec<AxisValue>> {
        let rows = scoped
            .filter_rows(|row| cell(row, sex_idx).as_str() == Some(label))
            .project(&[cols.group.as_str(), cols.metric.as_str()])
            .ok_or_else(|| QueryError::UnknownColumn {
                column: cols.metric.clone(),
            })?;
        let counts: Vec<(String, i64)> = rows
            .rows
            .iter()
            .map(|row| {
                let axis = cell(row, 0).as_str().unwrap_or_default().to_string();
                let count = cell(row, 1).as_f64().map(|v| v as i64).unwrap_or(0);
                (axis, count)
            })
            .collect();
        Ok(to_shares(counts, normalize))
    };

    Ok(ProportionResult {
        male: breakdown(&cols.male_label)?,
        female: breakdown(&cols.female_label)?,
    })
}

fn to_shares(counts: Vec<(String, i64)>, normalize: bool) -> Vec<AxisValue> {
    let total: i64 = counts.iter().map(|(_, c)| c).sum();
    counts
        .into_iter()
        .map(|(axis, count)| {
            let value = if !normalize {
                Share::Count(count)
            } else if total == 0 {
                Share::Fraction(0.0)
            } else {
                Share::Fraction(count as f64 / total as f64)
            };
            AxisValue { axis, value }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::proportions;
    use crate::config::CategoricalColumns;
    use crate::error::QueryError;
    use crate::series::Share;
    use crate::types::{DataType, Field, RecordTable, Schema, Value};

    fn deaths(rows: &[(&str, &str, &str, Option<f64>)]) -> RecordTable {
        let schema = Schema::new(vec![
            Field::new("state", DataType::Utf8),
            Field::new("sex", DataType::Utf8),
            Field::new("age_group", DataType::Utf8),
            Field::new("covid_19_deaths", DataType::Float64),
        ]);
        RecordTable::new(
            schema,
            rows.iter()
                .map(|(st, sex, age, v)| {
                    vec![
                        Value::Utf8(st.to_string()),
                        Value::Utf8(sex.to_string()),
                        Value::Utf8(age.to_string()),
                        v.map(Value::Float64).unwrap_or(Value::Null),
                    ]
                })
                .collect(),
        )
    }

    fn values(shares: &[crate::series::AxisValue]) -> Vec<f64> {
        shares.iter().map(|s| s.value.as_f64()).collect()
    }

    fn ohio() -> RecordTable {
        deaths(&[
            ("Ohio", "Male", "0-17", Some(10.0)),
            ("Ohio", "Male", "18-64", None),
            ("Ohio", "Male", "65+", Some(30.0)),
            ("Ohio", "Female", "0-17", Some(0.0)),
            ("Ohio", "Female", "18-64", Some(0.0)),
            ("Ohio", "Female", "65+", Some(0.0)),
            ("Ohio", "All Sexes", "65+", Some(99.0)),
            ("United States", "Male", "65+", Some(7.9)),
        ])
    }

    #[test]
    fn normalized_shares_sum_per_group() {
        let out = proportions(&ohio(), &CategoricalColumns::default(), "Ohio", true).unwrap();
        assert_eq!(values(&out.male), vec![0.25, 0.0, 0.75]);
        assert_eq!(
            out.male.iter().map(|a| a.axis.as_str()).collect::<Vec<_>>(),
            vec!["0-17", "18-64", "65+"]
        );
    }

    #[test]
    fn all_zero_group_normalizes_to_zeros() {
        let out = proportions(&ohio(), &CategoricalColumns::default(), "Ohio", true).unwrap();
        assert_eq!(values(&out.female), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn raw_mode_returns_integer_counts() {
        let out = proportions(&ohio(), &CategoricalColumns::default(), "Ohio", false).unwrap();
        assert_eq!(
            out.male.iter().map(|a| a.value).collect::<Vec<_>>(),
            vec![Share::Count(10), Share::Count(0), Share::Count(30)]
        );
    }

    #[test]
    fn all_reads_the_national_rows() {
        let out = proportions(&ohio(), &CategoricalColumns::default(), "all", false).unwrap();
        assert_eq!(out.male.len(), 1);
        assert_eq!(out.male[0].value, Share::Count(7));
        assert!(out.female.is_empty());
    }

    #[test]
    fn unknown_region_is_an_error() {
        let err = proportions(&ohio(), &CategoricalColumns::default(), "Guam", true).unwrap_err();
        assert_eq!(err, QueryError::UnknownRegion { region: "Guam".into() });
    }
}
