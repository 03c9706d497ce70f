use serde::Serialize;

use super::types::{AdConcept, BrandHealth, Strategy};
use crate::ai::AiError;

fn to_json<T: Serialize>(value: &T) -> Result<String, AiError> {
    serde_json::to_string(value)
        .map_err(|e| AiError::Terminal(anyhow::anyhow!("Failed to serialize prompt input: {e}")))
}

pub fn deep_audit(url: &str) -> String {
    format!(
        "Analyze this brand URL: {url}. Perform a brand health audit, formulate a \
         go-to-market strategy for the most valuable persona, and create 3 \
         high-converting ad concepts. Give the seoScore on a 0-100 scale."
    )
}

pub fn more_ads(health: &BrandHealth, strategy: &Strategy) -> Result<String, AiError> {
    Ok(format!(
        "Based on the brand health profile and strategic roadmap provided, generate 3 more \
         distinct high-converting ad concepts targeting the identified persona.\n\
         HEALTH: {}\n\
         STRATEGY: {}",
        to_json(health)?,
        to_json(strategy)?
    ))
}

pub fn ad_simulation(ad: &AdConcept, strategy: &Strategy) -> Result<String, AiError> {
    Ok(format!(
        "Perform a neural simulation of target audience reaction for this ad concept. \
         Report buyProbability per persona on a 0-100 scale.\n\
         AD: {}\n\
         STRATEGY: {}",
        to_json(ad)?,
        to_json(strategy)?
    ))
}

pub fn omni_channel(ad: &AdConcept, strategy: &Strategy) -> Result<String, AiError> {
    Ok(format!(
        "Refract this core ad concept into platform-native assets for Instagram, LinkedIn, \
         TikTok, Email, and Search.\n\
         AD: {}\n\
         STRATEGY: {}",
        to_json(ad)?,
        to_json(strategy)?
    ))
}

pub fn market_intelligence(brand: &str, niche: &str) -> String {
    format!(
        "Scan the web for recent (last 7 days) market news, competitor activities, and trending \
         topics related to the brand \"{brand}\" in the \"{niche}\" industry.\n\
         Analyze the data and identify 4-5 key 'signals' that represent competitive threats or \
         market opportunities.\n\
         For each signal, provide a title, a brief description, and its relevance score (0-100).\n\
         Also provide a 'strategicAssessment' of how the brand should react and a \
         'recommendedPivot' theme.\n\
         Return the data in the specified JSON format."
    )
}

pub fn tactical_pivot(ad: &AdConcept, theme: &str) -> Result<String, AiError> {
    Ok(format!(
        "Pivot the following ad concept to align with the new market theme: \"{theme}\".\n\
         ORIGINAL AD: {}\n\n\
         Maintain the core brand voice but rewrite the headline, caption, and visual prompt to \
         address this new tactical angle.\n\
         Return a NEW AdConcept in JSON format.",
        to_json(ad)?
    ))
}

pub fn ad_image(visual_prompt: &str) -> String {
    format!("High quality marketing visual: {visual_prompt}")
}
