/*!
 * Pipeline resolution.
 *
 * Maps a (source, target) pair to the model(s) that produce the translation.
 * Per hop, the first match wins: configured override, local fine-tuned model
 * directory, built-in default model. Pairs with no model of their own are
 * pivoted through English.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::app_config::ModelConfig;
use crate::errors::TranslationError;
use crate::language_utils::{Language, pair_key};

/// Language every pivot goes through
pub const PIVOT_LANGUAGE: Language = Language::English;

/// Files that mark a directory as a usable local model
const LOCAL_MODEL_MARKERS: [&str; 3] = ["config.json", "pytorch_model.bin", "model.safetensors"];

/// Default public models (Helsinki-NLP opus-mt)
pub const DEFAULT_MODELS: &[(Language, Language, &str)] = &[
    (Language::English, Language::Hindi, "Helsinki-NLP/opus-mt-en-hi"),
    (Language::Hindi, Language::English, "Helsinki-NLP/opus-mt-hi-en"),
    (Language::English, Language::Marathi, "Helsinki-NLP/opus-mt-en-mr"),
    (Language::Marathi, Language::English, "Helsinki-NLP/opus-mt-mr-en"),
];

/// A resolved model, tagged by where it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelRef {
    /// Public model identifier served by the hub endpoint
    Hub { id: String },
    /// Fine-tuned model directory under the local model root
    Local { path: PathBuf },
    /// Location named by a per-pair override
    Override { location: String },
}

impl ModelRef {
    /// Identifier sent to the serving endpoint
    pub fn location(&self) -> String {
        match self {
            Self::Hub { id } => id.clone(),
            Self::Local { path } => path.to_string_lossy().into_owned(),
            Self::Override { location } => location.clone(),
        }
    }

    /// Whether this model is served from local disk
    pub fn is_local(&self) -> bool {
        match self {
            Self::Hub { .. } => false,
            Self::Local { .. } => true,
            Self::Override { location } => Path::new(location).exists(),
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location())
    }
}

/// One translation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub source: Language,
    pub target: Language,
    pub model: ModelRef,
}

/// How a translation is produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineDescriptor {
    /// Source equals target; no model needed
    Identity,
    /// One model for the exact pair
    Direct(Hop),
    /// Two models applied in sequence through the pivot language
    Pivot(Hop, Hop),
}

impl PipelineDescriptor {
    /// Ordered hops to apply
    pub fn hops(&self) -> Vec<&Hop> {
        match self {
            Self::Identity => Vec::new(),
            Self::Direct(hop) => vec![hop],
            Self::Pivot(first, second) => vec![first, second],
        }
    }

    /// Whether the pivot path was used
    pub fn is_pivot(&self) -> bool {
        matches!(self, Self::Pivot(..))
    }

    /// Model identifiers, in application order
    pub fn model_names(&self) -> Vec<String> {
        self.hops().iter().map(|hop| hop.model.location()).collect()
    }
}

impl fmt::Display for PipelineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            _ => write!(f, "{}", self.model_names().join(" + ")),
        }
    }
}

/// Resolves language pairs to pipelines
#[derive(Debug, Clone)]
pub struct PipelineResolver {
    overrides: BTreeMap<String, String>,
    local_model_root: PathBuf,
    defaults: Vec<(Language, Language, String)>,
}

impl PipelineResolver {
    /// Create a resolver from the model configuration with the built-in default table
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            overrides: config.overrides.clone(),
            local_model_root: config.local_model_root.clone(),
            defaults: DEFAULT_MODELS
                .iter()
                .map(|(s, t, id)| (*s, *t, (*id).to_string()))
                .collect(),
        }
    }

    /// Replace the default public model table
    pub fn with_default_models<I, S>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (Language, Language, S)>,
        S: Into<String>,
    {
        self.defaults = defaults.into_iter().map(|(s, t, id)| (s, t, id.into())).collect();
        self
    }

    /// Resolve a pair to a pipeline descriptor
    pub fn resolve(&self, source: Language, target: Language) -> Result<PipelineDescriptor, TranslationError> {
        if source == target {
            return Ok(PipelineDescriptor::Identity);
        }

        if let Some(model) = self.resolve_hop(source, target) {
            debug!("Direct pipeline {} -> {}: {}", source, target, model);
            return Ok(PipelineDescriptor::Direct(Hop { source, target, model }));
        }

        if source == PIVOT_LANGUAGE || target == PIVOT_LANGUAGE {
            return Err(no_model(source, target));
        }

        let first = self
            .resolve_hop(source, PIVOT_LANGUAGE)
            .ok_or_else(|| no_model(source, PIVOT_LANGUAGE))?;
        let second = self
            .resolve_hop(PIVOT_LANGUAGE, target)
            .ok_or_else(|| no_model(PIVOT_LANGUAGE, target))?;

        debug!("Pivot pipeline {} -> {} -> {}: {} + {}", source, PIVOT_LANGUAGE, target, first, second);
        Ok(PipelineDescriptor::Pivot(
            Hop { source, target: PIVOT_LANGUAGE, model: first },
            Hop { source: PIVOT_LANGUAGE, target, model: second },
        ))
    }

    /// Resolve a single exact pair: override, then local model, then default
    pub fn resolve_hop(&self, source: Language, target: Language) -> Option<ModelRef> {
        let key = pair_key(source, target);

        if let Some(location) = self.overrides.get(&key) {
            return Some(ModelRef::Override { location: location.clone() });
        }

        if let Some(path) = self.local_model_dir(source, target) {
            return Some(ModelRef::Local { path });
        }

        self.defaults
            .iter()
            .find(|(s, t, _)| *s == source && *t == target)
            .map(|(_, _, id)| ModelRef::Hub { id: id.clone() })
    }

    fn local_model_dir(&self, source: Language, target: Language) -> Option<PathBuf> {
        let path = self
            .local_model_root
            .join(format!("{}-{}", source.code(), target.code()));
        let usable = path.is_dir() && LOCAL_MODEL_MARKERS.iter().any(|f| path.join(f).exists());
        usable.then_some(path)
    }
}

fn no_model(source: Language, target: Language) -> TranslationError {
    TranslationError::NoModel {
        source_lang: source.name().to_string(),
        target_lang: target.name().to_string(),
    }
}
