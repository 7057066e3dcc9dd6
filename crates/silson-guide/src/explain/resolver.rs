use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::{Catalog, GenerationId, GenerationRecord, DATE_FORMAT};

/// Generation an enrollment date belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub generation: GenerationId,
    pub generation_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("유효하지 않은 날짜 형식입니다. (YYYY-MM-DD)")]
    InvalidDateFormat { input: String },
    #[error("해당 날짜에 맞는 실손 보험 세대를 찾을 수 없습니다.")]
    NoMatchingGeneration { date: NaiveDate },
}

pub fn parse_join_date(raw: &str) -> Result<NaiveDate, ClassificationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ClassificationError::InvalidDateFormat {
            input: raw.to_string(),
        }
    })
}

/// First record, in catalog order, whose join period contains `date`.
/// Records with unreadable bounds are skipped.
pub fn record_for_date(catalog: &Catalog, date: NaiveDate) -> Option<&GenerationRecord> {
    catalog
        .generations()
        .iter()
        .find(|record| record.join_period.contains(date).unwrap_or(false))
}

pub fn resolve(catalog: &Catalog, join_date: &str) -> Result<Classification, ClassificationError> {
    let date = parse_join_date(join_date)?;
    let record = record_for_date(catalog, date)
        .ok_or(ClassificationError::NoMatchingGeneration { date })?;

    Ok(Classification {
        generation: record.generation,
        generation_name: record.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        let record = |generation: u32, start: &str, end: &str| {
            json!({
                "generation": generation,
                "name": format!("{generation}세대 실손"),
                "join_period": { "start_date": start, "end_date": end },
                "guarantees": { "급여_의료비": { "coverage": "80% 보장" } },
                "exclusions": ["치과", "한방"],
                "special_features": ["특징"],
                "premium": { "level": "보통" },
                "pros": ["장점"],
                "cons": ["단점"]
            })
        };

        Catalog::from_json_str(
            &json!({
                "generations": [
                    record(1, "2003-10-01", "2009-09-30"),
                    record(9, "2005-01-01", "bogus"),
                    record(2, "2009-10-01", "2017-03-31"),
                    record(4, "2021-07-01", "2025-12-31")
                ]
            })
            .to_string(),
        )
        .expect("catalog parses")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn bounds_resolve_inclusively() {
        let catalog = catalog();
        for (raw, expected) in [
            ("2009-10-01", 2),
            ("2017-03-31", 2),
            ("2015-06-01", 2),
            ("2009-09-30", 1),
            ("2003-10-01", 1),
        ] {
            let classification = resolve(&catalog, raw).expect("date classifies");
            assert_eq!(classification.generation, GenerationId(expected), "{raw}");
        }
    }

    #[test]
    fn gaps_and_outer_edges_do_not_match() {
        let catalog = catalog();
        for raw in ["2003-09-30", "2017-04-01", "2021-06-30", "2026-01-01", "1999-01-01"] {
            let err = resolve(&catalog, raw).expect_err("no generation");
            assert!(
                matches!(err, ClassificationError::NoMatchingGeneration { .. }),
                "{raw}"
            );
        }
    }

    #[test]
    fn records_with_unreadable_periods_are_skipped() {
        let mut first = json!({
            "generation": 1,
            "name": "1세대 실손",
            "join_period": { "start_date": 20031001, "end_date": "2009-09-30" },
            "guarantees": { "급여_의료비": { "coverage": "100% 보장" } },
            "exclusions": ["치과", "한방"],
            "special_features": ["특징"],
            "premium": { "level": "매우 높음" },
            "pros": ["장점"],
            "cons": ["단점"]
        });
        let mut second = first.clone();
        second["generation"] = json!(2);
        second["name"] = json!("2세대 실손");
        second["join_period"] = json!({ "start_date": "2009-10-01", "end_date": "2017-03-31" });
        let mut third = first.clone();
        third["generation"] = json!(3);
        third["join_period"] = json!(null);

        let catalog = Catalog::from_json_str(
            &json!({ "generations": [first.take(), second.take(), third.take()] }).to_string(),
        )
        .expect("catalog keeps every record");
        assert_eq!(catalog.len(), 3);

        let classification = resolve(&catalog, "2012-01-01").expect("second generation matches");
        assert_eq!(classification.generation, GenerationId(2));
        assert!(matches!(
            resolve(&catalog, "2005-01-01"),
            Err(ClassificationError::NoMatchingGeneration { .. })
        ));
    }

    #[test]
    fn malformed_dates_are_invalid_input() {
        let catalog = catalog();
        for raw in ["2020/01/01", "not-a-date", "", "2021-02-30", "20210101"] {
            let err = resolve(&catalog, raw).expect_err("invalid date");
            assert_eq!(
                err,
                ClassificationError::InvalidDateFormat {
                    input: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn error_messages_are_distinct_and_user_facing() {
        let invalid = ClassificationError::InvalidDateFormat {
            input: String::new(),
        };
        let missing = ClassificationError::NoMatchingGeneration {
            date: date(1999, 1, 1),
        };
        assert_eq!(invalid.to_string(), "유효하지 않은 날짜 형식입니다. (YYYY-MM-DD)");
        assert_eq!(
            missing.to_string(),
            "해당 날짜에 맞는 실손 보험 세대를 찾을 수 없습니다."
        );
    }

    #[test]
    fn resolution_is_deterministic_and_skips_malformed_records() {
        let catalog = catalog();
        let first = resolve(&catalog, "2006-05-05").expect("classifies");
        let second = resolve(&catalog, "2006-05-05").expect("classifies");
        assert_eq!(first, second);
        assert_eq!(first.generation, GenerationId(1));
        assert!(record_for_date(&catalog, date(2018, 1, 1)).is_none());
    }
}
