//! Response classification and the fields recognized per response type.

use crate::config::{PerType, SectionSpec, SurveyConfig};
use crate::models::{RawRow, ResponseType, SkipReason};
use std::collections::HashMap;

/// Survey layout used to turn raw rows into responses.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    type_field: String,
    types: HashMap<String, ResponseType>,
    fields: PerType<Vec<String>>,
    sections: PerType<Vec<SectionSpec>>,
}

impl From<&SurveyConfig> for ResponseSchema {
    fn from(config: &SurveyConfig) -> Self {
        let recognized = |response_type: ResponseType| {
            let mut keys: Vec<String> = Vec::new();
            let section_keys = config
                .sections
                .get(response_type)
                .iter()
                .flat_map(|s| [s.key.clone(), s.citation_key()]);
            for key in config.fields.get(response_type).iter().cloned().chain(section_keys) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys
        };

        Self {
            type_field: config.type_field.clone(),
            types: config
                .response_types
                .iter()
                .map(|(answer, t)| (answer.clone(), *t))
                .collect(),
            fields: PerType {
                report: recognized(ResponseType::Report),
                anecdote: recognized(ResponseType::Anecdote),
            },
            sections: config.sections.clone(),
        }
    }
}

impl Default for ResponseSchema {
    fn default() -> Self {
        Self::from(&SurveyConfig::default())
    }
}

impl ResponseSchema {
    /// Determine the response type of a row by exact answer match.
    pub fn classify(&self, row: &RawRow) -> Result<ResponseType, SkipReason> {
        let answer = row.get(&self.type_field);
        answer
            .and_then(|a| self.types.get(a).copied())
            .ok_or_else(|| SkipReason::UnknownResponseType {
                answer: answer.map(str::to_string),
            })
    }

    /// Unprefixed field keys copied for a type, sections and citations included.
    pub fn fields(&self, response_type: ResponseType) -> &[String] {
        self.fields.get(response_type)
    }

    /// Sections rendered for a type, in display order.
    pub fn sections(&self, response_type: ResponseType) -> &[SectionSpec] {
        self.sections.get(response_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(answer: &str) -> RawRow {
        [("response-type", answer)].into_iter().collect()
    }

    #[test]
    fn test_classify_known_answers() {
        let schema = ResponseSchema::default();
        let report = row("Reporting information you found in a news article or on social media?");
        assert_eq!(schema.classify(&report), Ok(ResponseType::Report));

        let anecdote = row("Providing a firsthand account or testimonial about a friend's experience or your own experiences?");
        assert_eq!(schema.classify(&anecdote), Ok(ResponseType::Anecdote));
    }

    #[test]
    fn test_classify_requires_exact_text() {
        let schema = ResponseSchema::default();
        let near_miss = row("reporting information you found in a news article or on social media?");
        assert_eq!(
            schema.classify(&near_miss),
            Err(SkipReason::UnknownResponseType {
                answer: Some(
                    "reporting information you found in a news article or on social media?"
                        .to_string()
                )
            })
        );

        assert_eq!(
            schema.classify(&RawRow::new()),
            Err(SkipReason::UnknownResponseType { answer: None })
        );
    }

    #[test]
    fn test_fields_include_sections_and_citations() {
        let schema = ResponseSchema::default();
        let report = schema.fields(ResponseType::Report);
        assert!(report.contains(&"industry".to_string()));
        assert!(report.contains(&"impact".to_string()));
        assert!(report.contains(&"impact.citation".to_string()));
        assert!(!report.contains(&"federal-relief".to_string()));

        let anecdote = schema.fields(ResponseType::Anecdote);
        assert!(anecdote.contains(&"federal-relief.citation".to_string()));
        assert!(!anecdote.contains(&"scope".to_string()));
    }

    #[test]
    fn test_fields_are_unique() {
        let mut config = SurveyConfig::default();
        config.fields.report.push("relief".to_string());
        let schema = ResponseSchema::from(&config);
        let relief = schema
            .fields(ResponseType::Report)
            .iter()
            .filter(|k| k.as_str() == "relief")
            .count();
        assert_eq!(relief, 1);
    }
}
