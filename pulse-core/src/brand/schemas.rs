//! Response schemas for each brand result type

use serde_json::Value;
use strum::VariantNames;

use super::types::{Platform, SignalCategory};
use crate::ai::schema::*;

pub fn brand_health() -> Value {
    strict_object(&[
        ("seoScore", number()),
        ("brandVoice", string()),
        ("voiceDescription", string()),
        ("gaps", array(string())),
        ("colorPalette", array(string())),
        ("typography", string()),
    ])
}

pub fn strategy() -> Value {
    strict_object(&[
        (
            "targetPersona",
            strict_object(&[
                ("name", string()),
                ("description", string()),
                ("demographics", string()),
                ("painPoints", array(string())),
            ]),
        ),
        ("valueProposition", string()),
        (
            "channels",
            array(strict_object(&[
                ("platform", string()),
                ("rationale", string()),
            ])),
        ),
        ("roadmap", array(string())),
    ])
}

pub fn ad_concept() -> Value {
    strict_object(&[
        ("id", string()),
        ("title", string()),
        ("conceptType", string()),
        (
            "copy",
            strict_object(&[
                ("headline", string()),
                ("caption", string()),
                ("cta", string()),
            ]),
        ),
        ("visualPrompt", string()),
    ])
}

pub fn ad_concepts() -> Value {
    array(ad_concept())
}

pub fn audit_result() -> Value {
    strict_object(&[
        ("health", brand_health()),
        ("strategy", strategy()),
        ("ads", ad_concepts()),
    ])
}

pub fn simulation_result() -> Value {
    strict_object(&[
        ("averageConversionLift", number()),
        (
            "sentimentHeatmap",
            strict_object(&[
                ("trust", number()),
                ("excitement", number()),
                ("confusion", number()),
                ("urgency", number()),
            ]),
        ),
        (
            "reactions",
            array(strict_object(&[
                ("personaName", string()),
                ("personaTrait", string()),
                ("reactionText", string()),
                ("buyProbability", number()),
                ("critique", string()),
            ])),
        ),
    ])
}

pub fn omni_channel_campaign() -> Value {
    strict_object(&[
        ("id", string()),
        (
            "assets",
            array(object(
                &[
                    ("platform", string_enum(Platform::VARIANTS)),
                    ("headline", string()),
                    ("copy", string()),
                    ("visualDirection", string()),
                    ("behavioralLogic", string()),
                ],
                &["platform", "copy", "visualDirection", "behavioralLogic"],
            )),
        ),
    ])
}

pub fn war_room_intelligence() -> Value {
    strict_object(&[
        (
            "signals",
            array(object(
                &[
                    ("title", string()),
                    ("description", string()),
                    (
                        "url",
                        string_described("Placeholder for URL to be filled by grounding chunks"),
                    ),
                    ("source", string()),
                    ("relevance", number()),
                    ("category", string_enum(SignalCategory::VARIANTS)),
                ],
                &["title", "description", "source", "relevance", "category"],
            )),
        ),
        ("strategicAssessment", string()),
        (
            "recommendedPivot",
            strict_object(&[("theme", string()), ("rationale", string())]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_requires_all_sections() {
        let schema = audit_result();
        assert_eq!(schema["required"], json!(["health", "strategy", "ads"]));
        assert_eq!(schema["properties"]["ads"]["type"], "ARRAY");
    }

    #[test]
    fn test_headline_optional_for_assets() {
        let schema = omni_channel_campaign();
        let asset = &schema["properties"]["assets"]["items"];
        let required = asset["required"].as_array().unwrap();
        assert!(!required.contains(&json!("headline")));
        assert_eq!(
            asset["properties"]["platform"]["enum"],
            json!(["Instagram", "LinkedIn", "TikTok", "Email", "Search"])
        );
    }

    #[test]
    fn test_signal_url_not_required() {
        let schema = war_room_intelligence();
        let signal = &schema["properties"]["signals"]["items"];
        let required = signal["required"].as_array().unwrap();
        assert!(!required.contains(&json!("url")));
    }
}
