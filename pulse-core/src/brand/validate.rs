//! Strict parsing of model output into brand types.
//!
//! Serde rejects missing fields, wrong types and unknown enum values; the
//! `Validate` impls add the range checks the schema dialect cannot express.

use serde::de::DeserializeOwned;

use super::types::*;
use crate::ai::{AiError, GenerationResponse};

pub trait Validate {
    /// Push a description of every violation onto `errors`; `path` is the
    /// location of `self` in the document.
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>);

    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        self.collect_violations("$", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        for (i, item) in self.iter().enumerate() {
            item.collect_violations(&format!("{path}[{i}]"), errors);
        }
    }
}

fn check_percent(value: f64, path: &str, errors: &mut Vec<String>) {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        errors.push(format!("{path} must be within 0-100, got {value}"));
    }
}

fn check_non_negative(value: f64, path: &str, errors: &mut Vec<String>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(format!("{path} must be a non-negative number, got {value}"));
    }
}

fn check_finite(value: f64, path: &str, errors: &mut Vec<String>) {
    if !value.is_finite() {
        errors.push(format!("{path} must be a finite number, got {value}"));
    }
}

fn check_not_blank(value: &str, path: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{path} must not be empty"));
    }
}

impl Validate for BrandHealth {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        check_percent(self.seo_score, &format!("{path}.seoScore"), errors);
    }
}

impl Validate for Strategy {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        check_not_blank(
            &self.target_persona.name,
            &format!("{path}.targetPersona.name"),
            errors,
        );
    }
}

impl Validate for AdConcept {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        check_not_blank(&self.id, &format!("{path}.id"), errors);
        check_not_blank(&self.copy.headline, &format!("{path}.copy.headline"), errors);
    }
}

impl Validate for AuditResult {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        self.health
            .collect_violations(&format!("{path}.health"), errors);
        self.strategy
            .collect_violations(&format!("{path}.strategy"), errors);
        self.ads.collect_violations(&format!("{path}.ads"), errors);
    }
}

impl Validate for SimulationResult {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        check_finite(
            self.average_conversion_lift,
            &format!("{path}.averageConversionLift"),
            errors,
        );
        let heatmap = &self.sentiment_heatmap;
        for (name, value) in [
            ("trust", heatmap.trust),
            ("excitement", heatmap.excitement),
            ("confusion", heatmap.confusion),
            ("urgency", heatmap.urgency),
        ] {
            check_non_negative(value, &format!("{path}.sentimentHeatmap.{name}"), errors);
        }
        for (i, reaction) in self.reactions.iter().enumerate() {
            check_percent(
                reaction.buy_probability,
                &format!("{path}.reactions[{i}].buyProbability"),
                errors,
            );
        }
    }
}

impl Validate for OmniChannelCampaign {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        for (i, asset) in self.assets.iter().enumerate() {
            check_not_blank(&asset.copy, &format!("{path}.assets[{i}].copy"), errors);
        }
    }
}

impl Validate for WarRoomIntelligence {
    fn collect_violations(&self, path: &str, errors: &mut Vec<String>) {
        for (i, signal) in self.signals.iter().enumerate() {
            check_percent(
                signal.relevance,
                &format!("{path}.signals[{i}].relevance"),
                errors,
            );
        }
        check_not_blank(
            &self.recommended_pivot.theme,
            &format!("{path}.recommendedPivot.theme"),
            errors,
        );
    }
}

/// Parse the JSON text of `response` into `T` and validate it.
pub fn parse_response<T>(response: &GenerationResponse) -> Result<T, AiError>
where
    T: DeserializeOwned + Validate,
{
    let text = response
        .joined_text()
        .ok_or_else(|| AiError::SchemaMismatch(anyhow::anyhow!("response contained no text")))?;
    parse_json(&text)
}

pub fn parse_json<T>(text: &str) -> Result<T, AiError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        AiError::SchemaMismatch(anyhow::anyhow!(
            "response does not match the expected shape: {e}"
        ))
    })?;

    value.validate().map_err(|violations| {
        AiError::SchemaMismatch(anyhow::anyhow!(
            "response failed validation: {}",
            violations.join("; ")
        ))
    })?;

    Ok(value)
}

/// Models occasionally wrap JSON mode output in a markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
