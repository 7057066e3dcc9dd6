//! Provider-agnostic prompt composition.

use serde_json::Value;
use tracing::warn;

use crate::catalog::{Catalog, GenerationRecord, TransitionGuide};

/// System-level instruction shared by every provider.
pub const SYSTEM_INSTRUCTION: &str = r#"
당신은 대한민국 실손의료비 보험을 분석하는 전문 AI 애널리스트입니다.
보험 설계사가 고객에게 브리핑하듯 전문적이고 친절하며 신뢰감 있는 어조를 유지하세요.

# 임무
1. 고객이 가입한 실손보험 세대를 정확히 짚고 그 특징을 설명합니다.
2. 현재 세대에서 보장되는 항목과 보장되지 않는 항목을 구체적으로 안내합니다.
3. 최신 세대로 전환할 때의 이득과 손해를 숫자를 근거로 비교합니다.

# 출력 형식 (Markdown)

## 📊 현재 실손보험 진단 결과
- 가입하신 보험: **{세대 이름}** ({가입 기간})
- 핵심 요약: {세대 특징 한 줄}

## 🔍 상세 보장 정보
### ✅ 든든하게 보장받는 항목
- (보장 항목 4~5개를 수치와 함께)
### ⚠️ 주의가 필요한 미보장 항목
- (제외·제한 항목 3~4개)

## 🔄 최신 세대로 전환한다면?
> **AI 분석 한마디**: {전환 권유 여부와 핵심 이유}

### 💡 전환 시 이로운 점 (Pros)
1. **보험료 절감**: {데이터 기반 수치}
2. (그 밖의 장점 2가지)

### 📉 전환 시 감수할 부분 (Cons)
1. **자기부담금 증가**: {데이터 기반 수치}
2. (그 밖의 단점 2가지)

## 📋 전문가 제언
- (고객 성향별 유지/전환 가이드)
- (실제 결정 전 약관 확인과 담당 설계사 상담 필요)

# 제약
- 제공된 JSON 데이터에 없는 수치는 만들어 내지 마세요.
- 전문 용어는 쉽게 풀어 쓰되 업계 전문성은 유지하세요.
- 섹션마다 이모지를 적절히 사용해 읽기 쉽게 구성하세요.
"#;

/// Returned instead of a prompt when the record cannot be serialized.
pub const COMPOSITION_FAILED: &str = "프롬프트 생성 중 오류가 발생했습니다.";

/// Build the user prompt for `record`, comparing it against the catalog's
/// newest generation. Never fails: serialization problems degrade to
/// [`COMPOSITION_FAILED`].
pub fn compose(catalog: &Catalog, record: &GenerationRecord) -> String {
    let terminal = catalog.terminal();
    let guide = terminal
        .and_then(|terminal| catalog.transition_guide(record.generation, terminal.generation))
        .cloned()
        .unwrap_or_default();

    match render_prompt(record, terminal, &guide) {
        Ok(prompt) => prompt,
        Err(err) => {
            warn!(
                generation = %record.generation,
                error = %err,
                "prompt composition degraded"
            );
            COMPOSITION_FAILED.to_string()
        }
    }
}

/// Narrative template as a pure function of the source record, the comparison
/// record and the transition guide.
pub fn render_prompt(
    source: &GenerationRecord,
    terminal: Option<&GenerationRecord>,
    guide: &TransitionGuide,
) -> Result<String, serde_json::Error> {
    let source_json = serde_json::to_string(source)?;
    let terminal_json = match terminal {
        Some(record) => serde_json::to_string(record)?,
        None => serde_json::to_string(&Value::Object(Default::default()))?,
    };
    let guide_json = serde_json::to_string(guide)?;

    let comparison_heading = match terminal {
        Some(record) => format!("{}세대 - {}", record.generation, record.name),
        None => "최신 세대 (데이터 없음)".to_string(),
    };
    let coverage_type = source.coverage_structure.kind.as_deref().unwrap_or("-");

    Ok(format!(
        r#"
## 입력 데이터 (보험 통계 및 가이드)

### [현재 가입 모델: {generation}세대 - {name}]
- 가입기간: {period}
- 보장구조: {coverage_type}
- 세부 데이터: {source_json}

### [비교 대상 모델: {comparison_heading}]
- 세부 데이터: {terminal_json}

### [전문가 전환 가이드라인]
- 핵심 비교 요소: {guide_json}

## 요청사항
위 데이터를 바탕으로 고객에게 보내는 '실손보험 진단 보고서' 형태로 설명을 작성해주세요.
각 항목마다 자기부담금 비율(%), 보장 한도 금액 등 구체적인 수치를 반드시 포함해 신뢰도를 높여주세요.
"#,
        generation = source.generation,
        name = source.name,
        period = source.join_period.label(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GenerationId;
    use serde_json::json;

    fn record(generation: u32, name: &str) -> GenerationRecord {
        serde_json::from_value(json!({
            "generation": generation,
            "name": name,
            "join_period": {
                "start_date": "2009-10-01",
                "end_date": "2017-03-31",
                "description": "2009년 10월 ~ 2017년 3월 가입"
            },
            "coverage_structure": { "type": "통합 보장형" },
            "guarantees": { "급여_의료비": { "coverage": "90% 보장", "limits": "연간 5,000만원" } },
            "exclusions": ["치과", "한방"],
            "special_features": ["자기부담금 10%"],
            "premium": { "level": "높음" },
            "pros": ["넓은 보장"],
            "cons": ["보험료 인상"]
        }))
        .expect("record parses")
    }

    #[test]
    fn prompt_contains_all_three_sections() {
        let source = record(2, "표준화 실손 (2세대)");
        let terminal = record(5, "5세대 실손 (중증 중심형)");
        let guide: TransitionGuide =
            serde_json::from_value(json!({ "premium_change": "월 보험료 약 60% 절감" }))
                .expect("guide parses");

        let prompt = render_prompt(&source, Some(&terminal), &guide).expect("renders");

        assert!(prompt.contains("### [현재 가입 모델: 2세대 - 표준화 실손 (2세대)]"));
        assert!(prompt.contains("- 가입기간: 2009년 10월 ~ 2017년 3월 가입"));
        assert!(prompt.contains("- 보장구조: 통합 보장형"));
        assert!(prompt.contains("### [비교 대상 모델: 5세대 - 5세대 실손 (중증 중심형)]"));
        assert!(prompt.contains("월 보험료 약 60% 절감"));
        assert!(prompt.contains("'실손보험 진단 보고서'"));
        assert!(prompt.contains("\"name\":\"표준화 실손 (2세대)\""));
    }

    #[test]
    fn missing_terminal_and_guide_render_empty_blocks() {
        let source = record(2, "표준화 실손 (2세대)");
        let prompt = render_prompt(&source, None, &TransitionGuide::default()).expect("renders");

        assert!(prompt.contains("### [비교 대상 모델: 최신 세대 (데이터 없음)]\n- 세부 데이터: {}"));
        assert!(prompt.contains("- 핵심 비교 요소: {}"));
    }

    #[test]
    fn compose_looks_up_guide_for_newest_generation() {
        let mut document = crate::catalog::CatalogDocument::default();
        document.generations = vec![record(2, "표준화 실손 (2세대)"), record(5, "5세대 실손")];
        document.switch_guide.insert(
            "from_2nd_to_5th".to_string(),
            serde_json::from_value(json!({ "caution": "도수치료 이용이 잦다면 유지" }))
                .expect("guide parses"),
        );
        // Intervals overlap in this fixture; only composition is exercised.
        let catalog = Catalog::from_document(document).expect("catalog builds");

        let source = catalog.generation(GenerationId(2)).expect("generation 2");
        let prompt = compose(&catalog, source);
        assert!(prompt.contains("도수치료 이용이 잦다면 유지"));
        assert!(prompt.contains("5세대 - 5세대 실손"));
    }
}
