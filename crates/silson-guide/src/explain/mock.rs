//! Offline report assembled straight from catalog fields.

use crate::catalog::{CoverageItem, GenerationRecord};

/// Coverage item highlighted first in the offline report when present.
pub const PRIMARY_COVERAGE_ITEM: &str = "급여_의료비";

/// Deterministic stand-in for a provider answer, following the same section
/// layout the system instruction asks providers for.
///
/// Relies on the catalog having passed load-time validation; absent optional
/// entries are simply left out.
pub fn synthesize(record: &GenerationRecord) -> String {
    let first = |items: &[String]| items.first().cloned().unwrap_or_default();
    let mut lines = vec![
        String::new(),
        "## 📊 현재 실손보험 진단 결과".to_string(),
        format!(
            "- 가입하신 보험은 **{}**입니다. ({})",
            record.name,
            record.join_period.label()
        ),
        format!("- 핵심 요약: {}", first(&record.special_features)),
        String::new(),
        "## 🔍 상세 보장 정보".to_string(),
        "### ✅ 든든하게 보장받는 항목".to_string(),
    ];

    if let Some((item_name, item)) = primary_coverage(record) {
        lines.push(format!(
            "- **{}**: {}",
            item_name.replace('_', " "),
            describe_coverage(item)
        ));
    }
    if let Some(feature) = record.special_features.get(1) {
        lines.push(format!("- **특징**: {feature}"));
    }
    lines.push(String::new());

    lines.push("### ⚠️ 주의가 필요한 미보장 항목".to_string());
    lines.extend(
        record
            .exclusions
            .items()
            .iter()
            .take(2)
            .map(|exclusion| format!("- {exclusion}")),
    );
    lines.push(String::new());

    lines.extend([
        "## 🔄 최신 세대 실손으로 전환한다면? (예상 분석)".to_string(),
        "> **AI 분석 한마디**: 보험료 부담이 크다면 최신 세대가 대안이 될 수 있으나 보장 축소를 함께 고려해야 합니다.".to_string(),
        String::new(),
        "### 💡 전환 시 얻게 되는 이로운 점 (Pros)".to_string(),
        format!(
            "1. **보험료 절감**: 현재 '{}' 수준에서 더 낮은 수준으로 낮아질 수 있음",
            record.premium.level
        ),
        format!("2. {}", first(&record.pros)),
        String::new(),
        "### 📉 전환 시 감수해야 할 부분 (Cons)".to_string(),
        "1. **자기부담금 증가**: 기존보다 높은 자기부담률 적용 예상".to_string(),
        format!("2. {}", first(&record.cons)),
        String::new(),
        "## 📋 전문가 제언".to_string(),
        "- (외부 AI 서비스 없이 기초 데이터만으로 작성된 분석입니다.)".to_string(),
        "- 실제 보장 내용은 보험사마다 다를 수 있으니 가입하신 약관을 확인해 주세요."
            .to_string(),
    ]);

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// The primary item, otherwise the first item in authored order.
fn primary_coverage(record: &GenerationRecord) -> Option<(&str, &CoverageItem)> {
    record
        .guarantees
        .get_key_value(PRIMARY_COVERAGE_ITEM)
        .or_else(|| record.guarantees.iter().next())
}

fn describe_coverage(item: &CoverageItem) -> String {
    match item.limits.as_deref() {
        Some(limits) if !limits.trim().is_empty() => format!("{} (한도: {limits})", item.coverage),
        _ => item.coverage.clone(),
    }
}
