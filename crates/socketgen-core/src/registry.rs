//! Language registry and per-language orchestration.
//!
//! [`EmitterRegistry`] maps a language tag to its [`Emitter`] and runs the
//! requested emitters against one model. A failure in one language never
//! stops the others: every requested tag gets an entry in the
//! [`GenerationReport`], in request order.

use crate::emit::{
    CSharpEmitter, DartEmitter, EmitOptions, Emitter, GoEmitter, JavaEmitter, KotlinEmitter,
    PhpEmitter, PythonEmitter, RubyEmitter, SourceUnit, TypeScriptEmitter,
};
use crate::error::GenerateError;
use crate::model::DescriptorModel;
use std::collections::BTreeMap;

/// Tags of the built-in emitters, sorted.
pub const BUILTIN_LANGUAGES: [&str; 9] = [
    "csharp", "dart", "go", "java", "kotlin", "php", "python", "ruby", "ts",
];

/// Registry mapping language tags to emitters.
pub struct EmitterRegistry {
    emitters: BTreeMap<&'static str, Box<dyn Emitter>>,
    options: EmitOptions,
}

impl Default for EmitterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EmitterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterRegistry")
            .field("languages", &self.supported_languages())
            .field("options", &self.options)
            .finish()
    }
}

impl EmitterRegistry {
    /// Registry with all built-in emitters and default options.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(GoEmitter));
        registry.register(Box::new(TypeScriptEmitter));
        registry.register(Box::new(PythonEmitter));
        registry.register(Box::new(CSharpEmitter));
        registry.register(Box::new(DartEmitter));
        registry.register(Box::new(PhpEmitter));
        registry.register(Box::new(RubyEmitter));
        registry.register(Box::new(KotlinEmitter));
        registry.register(Box::new(JavaEmitter));
        registry
    }

    /// Registry with no emitters.
    pub fn empty() -> Self {
        Self {
            emitters: BTreeMap::new(),
            options: EmitOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EmitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Add an emitter, replacing any emitter already registered for its tag.
    pub fn register(&mut self, emitter: Box<dyn Emitter>) {
        let language = emitter.language();
        if self.emitters.insert(language, emitter).is_some() {
            tracing::debug!("Replaced emitter for '{}'", language);
        }
    }

    /// Registered tags in sorted order.
    pub fn supported_languages(&self) -> Vec<&'static str> {
        self.emitters.keys().copied().collect()
    }

    pub fn supports(&self, language: &str) -> bool {
        self.emitters.contains_key(language)
    }

    /// Run the emitter for each requested tag, in order.
    pub fn generate<S: AsRef<str>>(
        &self,
        model: &DescriptorModel,
        languages: &[S],
    ) -> GenerationReport {
        let outcomes = languages
            .iter()
            .map(|tag| {
                let language = tag.as_ref();
                LanguageOutcome {
                    language: language.to_string(),
                    result: self.generate_one(model, language),
                }
            })
            .collect();

        GenerationReport { outcomes }
    }

    fn generate_one(
        &self,
        model: &DescriptorModel,
        language: &str,
    ) -> Result<Vec<SourceUnit>, GenerateError> {
        let emitter = self
            .emitters
            .get(language)
            .ok_or_else(|| GenerateError::UnsupportedLanguage(language.to_string()))?;

        let units = emitter
            .emit(model, &self.options)
            .map_err(|source| GenerateError::EmitterFailure {
                language: language.to_string(),
                source,
            })?;

        tracing::debug!("Generated {} file(s) for '{}'", units.len(), language);
        Ok(units)
    }
}

/// Outcome for one requested language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOutcome {
    /// The tag as requested.
    pub language: String,

    pub result: Result<Vec<SourceUnit>, GenerateError>,
}

impl LanguageOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-language outcomes of one generation run, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationReport {
    pub outcomes: Vec<LanguageOutcome>,
}

impl GenerationReport {
    /// Successful languages with their generated files.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &[SourceUnit])> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(units) => Some((o.language.as_str(), units.as_slice())),
            Err(_) => None,
        })
    }

    /// Failed languages with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &GenerateError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(err) => Some((o.language.as_str(), err)),
        })
    }

    /// True when every requested language succeeded.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(LanguageOutcome::is_success)
    }

    /// First outcome for `language`.
    pub fn get(&self, language: &str) -> Option<&LanguageOutcome> {
        self.outcomes.iter().find(|o| o.language == language)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
