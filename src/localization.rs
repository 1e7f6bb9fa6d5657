//! # Localization
//!
//! Fluent message bundles for everything the CLI prints. Resources are
//! compiled into the binary from `locales/<lang>/main.ftl`.

use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

use crate::errors::{AppError, AppResult};

/// Languages with a bundled resource, default first
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "fr"];

const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

/// Localization manager for report and prompt text
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a manager with every bundled language loaded
    pub fn new() -> AppResult<Self> {
        let mut bundles = HashMap::new();

        for (locale_str, source) in RESOURCES {
            let locale: LanguageIdentifier = locale_str
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid locale '{}': {}", locale_str, e)))?;
            let bundle = Self::create_bundle(&locale, source)?;
            bundles.insert(locale_str.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: &LanguageIdentifier,
        source: &str,
    ) -> AppResult<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string()).map_err(|(_, errors)| {
            AppError::Internal(format!(
                "Locale '{}' has {} syntax error(s)",
                locale,
                errors.len()
            ))
        })?;
        bundle.add_resource(resource).map_err(|errors| {
            AppError::Internal(format!(
                "Locale '{}' has {} duplicate message(s)",
                locale,
                errors.len()
            ))
        })?;

        Ok(bundle)
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self.bundles.get(language) {
            Some(bundle) => bundle,
            None => {
                // Fallback to English if language not found
                match self.bundles.get("en") {
                    Some(bundle) => bundle,
                    None => return format!("Missing translation: {}", key),
                }
            }
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut value = String::new();
        let mut errors = vec![];

        if let Some(args) = args {
            let fluent_args = FluentArgs::from_iter(
                args.iter().map(|(k, v)| (*k, FluentValue::from(*v))),
            );
            let _ = bundle.write_pattern(&mut value, pattern, Some(&fluent_args), &mut errors);
        } else {
            let _ = bundle.write_pattern(&mut value, pattern, None, &mut errors);
        }

        if !errors.is_empty() {
            tracing::debug!(key = %key, language = %language, errors = errors.len(), "Message formatted with errors");
        }

        value
    }

    /// Get a localized message with arguments in a specific language
    pub fn get_message_with_args_in_language(
        &self,
        key: &str,
        language: &str,
        args: &[(&str, &str)],
    ) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }
}

/// Reduce a language tag to a supported language ("fr-CA" -> "fr"),
/// defaulting to English
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    language_code
        .and_then(|code| code.split(['-', '_']).next())
        .map(|lang| lang.to_lowercase())
        .and_then(|lang| SUPPORTED_LANGUAGES.iter().copied().find(|s| *s == lang))
        .unwrap_or("en")
}
