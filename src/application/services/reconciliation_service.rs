//! Reconciliation Service - Turns an untrusted model draft into an accepted record
//!
//! Each attempt requests a fresh draft, merges it with facts mined from the
//! page, canonicalizes it and validates the result. The first record that
//! validates is returned; after the attempt budget the last violation is
//! surfaced to the caller.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::application::dto::{coerce_u32, non_empty_str, scalar_object, string_list, whitelist, Draft};
use crate::application::ports::outbound::{
    LlmPort, MediaInfoPort, SchemaValidatorPort, SchemaViolation,
};
use crate::application::services::draft_normalizer::{
    append_missing_bonuses, enrich_effect, parse_attribution, parse_effect, parse_enchantments,
    parse_focal_point, parse_foundry, parse_physical, parse_srcset_entry, resolve_kind,
    resolve_kind_detail, StatBonusLookup,
};
use crate::application::services::llm::build_extraction_request;
use crate::application::services::media_resolver::MediaResolver;
use crate::application::services::record_stamper::{stamp_metadata, stamp_provenance};
use crate::domain::entities::{Effect, Image, ImageType, Record, SrcsetEntry, DEFAULT_SERIES};
use crate::domain::services::MinedSource;
use crate::domain::value_objects::field_sets::{ACTIVATION_FIELDS, IMAGE_FIELDS};
use crate::domain::value_objects::RecordId;

/// Drafts requested per title before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Errors that can occur while reconciling one title
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Every attempt produced a record the schema rejected
    #[error("Validation failed after {attempts} attempts: {source}")]
    Validation {
        attempts: u32,
        #[source]
        source: SchemaViolation,
    },
    /// Error from the underlying LLM client
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReconcileError {
    /// The schema violation behind a validation failure
    pub fn violation(&self) -> Option<&SchemaViolation> {
        match self {
            Self::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Service reconciling drafts against mined page facts
pub struct ReconciliationService<L: LlmPort, M: MediaInfoPort, V: SchemaValidatorPort> {
    llm: L,
    resolver: MediaResolver<M>,
    validator: V,
    series: String,
}

impl<L, M, V> ReconciliationService<L, M, V>
where
    L: LlmPort,
    M: MediaInfoPort,
    V: SchemaValidatorPort,
{
    pub fn new(llm: L, resolver: MediaResolver<M>, validator: V) -> Self {
        Self {
            llm,
            resolver,
            validator,
            series: DEFAULT_SERIES.to_string(),
        }
    }

    /// Series stamped on records whose draft names none
    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = series.into();
        self
    }

    /// Produce a schema-valid record for one page
    #[instrument(skip(self, source_text), fields(title = %title))]
    pub async fn reconcile(
        &self,
        title: &str,
        url: &str,
        source_text: &str,
    ) -> Result<Record, ReconcileError> {
        let mined = MinedSource::from_text(source_text);
        debug!(
            type_tokens = mined.type_tokens.len(),
            file_references = mined.file_references.len(),
            stat_bonuses = mined.stat_bonuses.len(),
            effect_details = mined.effect_details.len(),
            "Mined source text"
        );

        let mut last_violation: Option<SchemaViolation> = None;
        for attempt in 1..=MAX_ATTEMPTS {
            let draft = self.request_draft(title, url, source_text).await?;
            let record = self.assemble(draft, title, url, &mined, Utc::now()).await;
            let value = serde_json::to_value(&record)
                .map_err(|e| ReconcileError::Internal(e.to_string()))?;

            match self.validator.validate(&value) {
                Ok(()) => {
                    info!(attempt, id = %record.id, "Record accepted");
                    return Ok(record);
                }
                Err(violation) => {
                    warn!(attempt, error = %violation, "Record failed validation");
                    last_violation = Some(violation);
                }
            }
        }

        match last_violation {
            Some(source) => Err(ReconcileError::Validation {
                attempts: MAX_ATTEMPTS,
                source,
            }),
            None => Err(ReconcileError::Internal(
                "no validation result was recorded".to_string(),
            )),
        }
    }

    async fn request_draft(
        &self,
        title: &str,
        url: &str,
        source_text: &str,
    ) -> Result<Draft, ReconcileError> {
        let request = build_extraction_request(self.validator.schema(), title, url, source_text);
        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| ReconcileError::Llm(e.to_string()))?;
        debug!(model = %response.model, tokens = response.tokens_used, "Received draft");
        Ok(Draft::parse(&response.content))
    }

    /// Build a record from one draft; nothing here can fail
    pub async fn assemble(
        &self,
        draft: Draft,
        title: &str,
        url: &str,
        mined: &MinedSource,
        now: DateTime<Utc>,
    ) -> Record {
        let draft = draft.whitelisted();

        let provenance = stamp_provenance(draft.object("provenance"), url);
        let metadata = stamp_metadata(draft.object("metadata"), now);

        let kind_detail = resolve_kind_detail(&draft, mined);
        let description = draft.text("description").or_else(|| mined.intro.clone());
        let ai_description = draft
            .text("ai_description")
            .or_else(|| mined.ai_description.clone());

        let aliases = string_list(draft.get("aliases"));
        let tags = string_list(draft.get("tags"));

        let name = draft.text("name").unwrap_or_else(|| title.trim().to_string());
        let id = RecordId::from_text(&draft.text("id").unwrap_or_else(|| name.clone()));

        let kind = resolve_kind(
            &mined.type_tokens,
            draft.get("kind").and_then(Value::as_str),
            &tags,
        );

        let images = self.resolve_images(&draft, &mined.file_references).await;

        let bonuses = StatBonusLookup::from_sources(draft.list("enchantments"), &mined.stat_bonuses);
        let mut effects: Vec<Effect> = draft
            .list("effects")
            .iter()
            .filter_map(|value| parse_effect(value, &bonuses))
            .collect();
        for effect in &mut effects {
            enrich_effect(effect, &mined.effect_details);
        }
        append_missing_bonuses(&mut effects, &bonuses);

        Record {
            id,
            name,
            kind,
            kind_detail,
            series: draft.text("series").unwrap_or_else(|| self.series.clone()),
            description,
            ai_description,
            aliases,
            activation: scalar_object(draft.get("activation"), ACTIVATION_FIELDS),
            enchantments: parse_enchantments(draft.list("enchantments")),
            images,
            effects,
            tags,
            physical: parse_physical(draft.get("physical")),
            provenance,
            metadata,
        }
    }

    async fn resolve_images(&self, draft: &Draft, candidates: &[String]) -> Vec<Image> {
        let mut images = Vec::new();

        for entry in draft.list("images") {
            let Some(object) = entry.as_object() else {
                continue;
            };
            let object = whitelist(object, IMAGE_FIELDS);
            let Some(src) = object.get("src").and_then(non_empty_str) else {
                debug!("Dropping image without src");
                continue;
            };

            let resolved = self.resolver.resolve(&src, candidates).await;
            if resolved.src.trim().is_empty() {
                continue;
            }

            let image_type = ImageType::parse(object.get("type").and_then(Value::as_str));
            let mut image = Image::new(image_type, resolved.src);
            image.alt = object.get("alt").and_then(non_empty_str);
            image.mime = object.get("mime").and_then(non_empty_str).or(resolved.mime);
            image.width = object.get("width").and_then(coerce_u32).or(resolved.width);
            image.height = object.get("height").and_then(coerce_u32).or(resolved.height);
            image.srcset = self.resolve_srcset(object.get("srcset")).await;
            image.focal_point = parse_focal_point(object.get("focal_point"));
            image.attribution = parse_attribution(object.get("attribution"));
            image.foundry = parse_foundry(object.get("foundry"));
            images.push(image);
        }

        images
    }

    async fn resolve_srcset(&self, value: Option<&Value>) -> Vec<SrcsetEntry> {
        let entries: Vec<SrcsetEntry> = match value {
            Some(Value::Array(items)) => items.iter().filter_map(parse_srcset_entry).collect(),
            _ => return Vec::new(),
        };

        let mut resolved = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.src = self.resolver.resolve(&entry.src, &[]).await.src;
            resolved.push(entry);
        }
        resolved
    }
}
