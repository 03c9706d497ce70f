use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use pulse_core::ai::AiProvider;
use pulse_core::brand::{parse_json, AdConcept, AdImage, AuditResult};
use pulse_core::settings::{ProviderConfig, Settings};
use pulse_core::voice::audio::playback::CpalOutput;
use pulse_core::voice::tts::GeminiSpeech;
use pulse_core::voice::{NarrationOutcome, Narrator};
use pulse_core::{create_provider, decode_base64, AiError, BrandStudio, SettingsManager};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Command, SettingsAction};

type Studio = BrandStudio<Arc<dyn AiProvider>>;

fn studio(settings: &Settings) -> Result<Studio> {
    Ok(BrandStudio::new(
        create_provider(settings)?,
        settings.studio_config(),
    ))
}

pub async fn run(command: Command, manager: &SettingsManager) -> Result<()> {
    let settings = manager.settings();

    match command {
        Command::Settings { action } => run_settings(action, manager),
        Command::Speak { text } => speak(&settings, &text).await,
        Command::Audit { url } => {
            let audit = studio(&settings)?
                .perform_deep_audit(&url)
                .await
                .context("Failed to audit brand")?;
            print_json(&audit)
        }
        Command::Ads { audit } => {
            let audit = read_audit(&audit)?;
            let ads = studio(&settings)?
                .generate_more_ads(&audit.health, &audit.strategy)
                .await
                .context("Failed to generate ad concepts")?;
            print_json(&ads)
        }
        Command::Simulate { audit, ad } => {
            let audit = read_audit(&audit)?;
            let ad = select_ad(&audit, ad.as_deref())?;
            let simulation = studio(&settings)?
                .run_ad_simulation(ad, &audit.strategy)
                .await
                .context("Failed to run ad simulation")?;
            print_json(&simulation)
        }
        Command::Forge { audit, ad } => {
            let audit = read_audit(&audit)?;
            let ad = select_ad(&audit, ad.as_deref())?;
            let campaign = studio(&settings)?
                .generate_omni_channel_campaign(ad, &audit.strategy)
                .await
                .context("Failed to forge campaign")?;
            print_json(&campaign)
        }
        Command::Intel { brand, niche } => {
            let intel = studio(&settings)?
                .fetch_market_intelligence(&brand, &niche)
                .await
                .context("Failed to fetch market intelligence")?;
            print_json(&intel)
        }
        Command::Pivot {
            audit,
            theme,
            count,
        } => {
            let mut audit = read_audit(&audit)?;
            let pivots = pivot_ads(&studio(&settings)?, &audit, &theme, count).await?;
            info!(count = pivots.len(), theme, "pivoted ads");
            audit.prepend_ads(pivots);
            print_json(&audit)
        }
        Command::Image { prompt, output } => {
            let image = studio(&settings)?
                .generate_ad_image(&prompt)
                .await
                .context("Failed to generate image")?;
            match output {
                Some(path) => print_json(&save_image(&image, &path)?),
                None => print_json(&image),
            }
        }
    }
}

/// Write an inline image to `path`. A placeholder has nothing to write; the
/// user is warned and the summary says so.
fn save_image(image: &AdImage, path: &Path) -> Result<serde_json::Value> {
    match image {
        AdImage::Inline { mime_type, data } => {
            let bytes = decode_base64(data).context("Image payload is not valid base64")?;
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write image to {path:?}"))?;
            Ok(json!({
                "kind": "inline",
                "mime_type": mime_type,
                "path": path,
                "bytes": bytes.len(),
                "written": true,
            }))
        }
        AdImage::Placeholder { url } => {
            warn!(?path, url = %url, "no image returned, nothing written");
            eprintln!("Warning: the image model returned no picture; {path:?} was not written.");
            Ok(json!({
                "kind": "placeholder",
                "url": url,
                "written": false,
            }))
        }
    }
}

async fn pivot_ads(
    studio: &Studio,
    audit: &AuditResult,
    theme: &str,
    count: usize,
) -> Result<Vec<AdConcept>> {
    if audit.ads.is_empty() {
        bail!("Audit contains no ad concepts to pivot");
    }

    let pivots = audit
        .ads
        .iter()
        .take(count)
        .map(|ad| studio.generate_tactical_pivot(ad, theme));
    try_join_all(pivots)
        .await
        .context("Failed to pivot ad concepts")
}

async fn speak(settings: &Settings, text: &str) -> Result<()> {
    let tts = GeminiSpeech::new(create_provider(settings)?, settings.speech_config());
    let output = CpalOutput::new().context("No audio output device available")?;
    let narrator = Narrator::new(tts, output);

    match narrator.speak(text).await {
        NarrationOutcome::Played { frames, end } => print_json(&json!({
            "outcome": "played",
            "frames": frames,
            "end": format!("{end:?}").to_lowercase(),
        })),
        NarrationOutcome::Skipped => print_json(&json!({ "outcome": "skipped" })),
        NarrationOutcome::Empty => print_json(&json!({ "outcome": "empty" })),
        NarrationOutcome::Superseded => print_json(&json!({ "outcome": "superseded" })),
        NarrationOutcome::QuotaExhausted => Err(AiError::QuotaExhausted(anyhow::anyhow!(
            "speech synthesis quota exhausted"
        ))
        .into()),
        NarrationOutcome::Failed(e) => Err(anyhow::Error::new(e).context("Narration failed")),
    }
}

fn run_settings(action: SettingsAction, manager: &SettingsManager) -> Result<()> {
    match action {
        SettingsAction::Path => {
            println!("{}", manager.path().display());
            Ok(())
        }
        SettingsAction::Show => {
            let contents = toml::to_string_pretty(&redacted(manager.settings()))
                .context("Failed to serialize settings")?;
            println!("{contents}");
            Ok(())
        }
        SettingsAction::SetKey { key } => {
            let key = key.trim().to_string();
            if key.is_empty() {
                bail!("API key must not be empty");
            }
            manager.update_setting(|settings| settings.set_gemini_api_key(key));
            manager.save()?;
            println!("Saved Gemini API key to {}", manager.path().display());
            Ok(())
        }
    }
}

fn redacted(mut settings: Settings) -> Settings {
    for config in settings.providers.values_mut() {
        if let ProviderConfig::Gemini {
            api_key: Some(key), ..
        } = config
        {
            *key = redact(key);
        }
    }
    settings
}

fn redact(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("****{tail}")
}

fn read_audit(path: &Path) -> Result<AuditResult> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read audit from {path:?}"))?;
    parse_json(&contents).with_context(|| format!("{path:?} is not a valid audit result"))
}

fn select_ad<'a>(audit: &'a AuditResult, id: Option<&str>) -> Result<&'a AdConcept> {
    match id {
        Some(id) => audit
            .find_ad(id)
            .with_context(|| format!("No ad concept with id '{id}' in audit")),
        None => audit
            .ads
            .first()
            .context("Audit contains no ad concepts"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{text}");
    Ok(())
}
