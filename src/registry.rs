use std::collections::HashMap;
use std::path::Path;

use crate::decorations::{Decoration, simplify};
use crate::error::{ArancioResult, Error};
use crate::languages::{
    DEFAULT_CODE, DEFAULT_MARKUP, LanguageDefinition, LanguageOptions, register_builtins,
};
use crate::lexer::{Lexer, RuleSet};
use crate::style::StyleTag;
use crate::tokenizer::{ScanJob, Tokenizer};

/// The main struct in arancio.
///
/// Holds the lexer of every language by name. Languages are registered first, then the
/// registry is frozen and can be used to scan text, possibly from several threads.
#[derive(Debug, Default)]
pub struct Registry {
    lexers: Vec<Lexer>,
    // language name -> index in `lexers`, several names can point to the same lexer
    lexer_id_by_name: HashMap<String, usize>,
    // Once frozen, no languages can be added
    frozen: bool,
}

impl Registry {
    /// A frozen registry with all the builtin languages
    pub fn builtin() -> ArancioResult<Self> {
        let mut registry = Registry::default();
        registry.register_builtins()?;
        registry.freeze();
        Ok(registry)
    }

    /// Registers all the builtin languages, eg to add more languages before freezing.
    /// Names registered before keep their language.
    pub fn register_builtins(&mut self) -> ArancioResult<()> {
        register_builtins(self)
    }

    /// Compiles the rules and registers the lexer under all the given names.
    ///
    /// A name that is already taken keeps its original language: the first registration wins.
    pub fn register_language(&mut self, names: &[&str], rules: RuleSet) -> ArancioResult<()> {
        if self.frozen {
            return Err(Error::RegistryFrozen);
        }
        let lexer = Lexer::new(rules)?;
        let lexer_id = self.lexers.len();
        let mut used = false;

        for name in names {
            if self.lexer_id_by_name.contains_key(*name) {
                log::warn!("cannot override language `{name}`, keeping its first registration");
                continue;
            }
            self.lexer_id_by_name.insert((*name).to_owned(), lexer_id);
            used = true;
        }

        if used {
            self.lexers.push(lexer);
        }
        Ok(())
    }

    /// Registers a language described by options
    pub fn register_options(
        &mut self,
        names: &[&str],
        options: &LanguageOptions,
    ) -> ArancioResult<()> {
        self.register_language(names, options.to_rule_set())
    }

    pub fn register_definition(&mut self, definition: &LanguageDefinition) -> ArancioResult<()> {
        let rules = definition.rule_set()?;
        let names: Vec<&str> = definition.names.iter().map(String::as_str).collect();
        self.register_language(&names, rules)
    }

    /// Reads a JSON language definition and registers it
    pub fn register_from_path(&mut self, path: impl AsRef<Path>) -> ArancioResult<()> {
        let definition = LanguageDefinition::load_from_file(path)?;
        self.register_definition(&definition)
    }

    /// Ends the registration phase. Scanning is only possible after that.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Checks whether the given name is registered
    pub fn contains_language(&self, name: &str) -> bool {
        self.lexer_id_by_name.contains_key(name)
    }

    /// All the registered names, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lexer_id_by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn lexer(&self, name: &str) -> Option<&Lexer> {
        self.lexer_id_by_name
            .get(name)
            .map(|&lexer_id| &self.lexers[lexer_id])
    }

    /// Finds the lexer for some embedded text.
    ///
    /// Unknown languages fall back to the default markup lexer if the text starts with `<`,
    /// and to the default code lexer otherwise.
    pub(crate) fn embedded_lexer(&self, language: &str, text: &str) -> Option<&Lexer> {
        if let Some(lexer) = self.lexer(language) {
            return Some(lexer);
        }
        let fallback = if text.trim_start().starts_with('<') {
            DEFAULT_MARKUP
        } else {
            DEFAULT_CODE
        };
        self.lexer(fallback)
    }

    /// The main entry point: finds the lexer for `lang` and scans the source with it.
    ///
    /// Positions of the decorations are offset by `base_offset`. Unknown languages
    /// are guessed the same way embedded ones are and if there is nothing to fall back on,
    /// the whole source is plain.
    ///
    /// Make sure `freeze` is called before calling `scan`, this will error otherwise.
    pub fn scan(
        &self,
        lang: &str,
        source: &str,
        base_offset: usize,
    ) -> ArancioResult<Vec<Decoration>> {
        if !self.frozen {
            return Err(Error::RegistryNotFrozen);
        }
        match self.embedded_lexer(lang, source) {
            Some(lexer) => self.scan_with(lexer, source, base_offset),
            None if source.is_empty() => Ok(Vec::new()),
            None => Ok(vec![Decoration::new(base_offset, StyleTag::Plain)]),
        }
    }

    /// Scans the source with a specific lexer.
    /// Embedded languages are still looked up in this registry.
    pub fn scan_with(
        &self,
        lexer: &Lexer,
        source: &str,
        base_offset: usize,
    ) -> ArancioResult<Vec<Decoration>> {
        if !self.frozen {
            return Err(Error::RegistryNotFrozen);
        }
        let mut tokenizer = Tokenizer::new(self);
        let mut decorations = Vec::new();
        tokenizer.scan(
            lexer,
            ScanJob::new(source, base_offset),
            &mut decorations,
            0,
        );
        simplify(&mut decorations, base_offset + source.len());
        Ok(decorations)
    }

    /// Every language with all of its names, in registration order
    pub fn definitions(&self) -> Vec<LanguageDefinition> {
        let mut names_by_lexer = vec![Vec::new(); self.lexers.len()];
        for (name, &lexer_id) in &self.lexer_id_by_name {
            names_by_lexer[lexer_id].push(name.clone());
        }
        names_by_lexer
            .into_iter()
            .zip(&self.lexers)
            .map(|(mut names, lexer)| {
                names.sort_unstable();
                LanguageDefinition {
                    names,
                    options: None,
                    rules: Some(lexer.rules().clone()),
                }
            })
            .collect()
    }

    #[cfg(feature = "dump")]
    /// Dump the language definitions to a binary file that can be loaded later
    pub fn dump_to_file(&self, path: impl AsRef<Path>) -> ArancioResult<()> {
        let dump = crate::dump::Dump::from_definitions(&self.definitions());
        let data = bitcode::serialize(&dump)?;
        let compressed = zstd::encode_all(data.as_slice(), 19)?;
        std::fs::write(path, compressed)?;
        Ok(())
    }

    #[cfg(feature = "dump")]
    fn load_from_bytes(compressed_data: &[u8]) -> ArancioResult<Self> {
        let data = zstd::decode_all(compressed_data)?;
        let dump: crate::dump::Dump = bitcode::deserialize(&data)?;

        let mut registry = Registry::default();
        for definition in dump.into_definitions() {
            registry.register_definition(&definition)?;
        }
        registry.freeze();
        Ok(registry)
    }

    #[cfg(feature = "dump")]
    /// Read a binary dump and compile every language in it. The registry is frozen.
    pub fn load_from_file(path: impl AsRef<Path>) -> ArancioResult<Self> {
        let compressed_data = std::fs::read(path)?;
        Self::load_from_bytes(&compressed_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Pattern, Rule};

    fn words() -> RuleSet {
        RuleSet::new(
            vec![Rule::new(StyleTag::Plain, Pattern::new(r"^\s+")).with_shortcut(" ")],
            vec![Rule::new(StyleTag::Keyword, Pattern::new(r"^\w+"))],
        )
    }

    #[test]
    fn cannot_register_after_freezing() {
        let mut registry = Registry::default();
        registry.register_language(&["words"], words()).unwrap();
        registry.freeze();
        assert!(matches!(
            registry.register_language(&["other"], words()),
            Err(Error::RegistryFrozen)
        ));
    }

    #[test]
    fn cannot_scan_before_freezing() {
        let mut registry = Registry::default();
        registry.register_language(&["words"], words()).unwrap();
        assert!(matches!(
            registry.scan("words", "a b", 0),
            Err(Error::RegistryNotFrozen)
        ));
    }

    #[test]
    fn first_registration_wins() {
        let mut registry = Registry::default();
        registry.register_language(&["words", "w"], words()).unwrap();
        registry
            .register_language(
                &["w", "strings"],
                RuleSet::new(vec![], vec![Rule::new(StyleTag::String, Pattern::new(r"^.+"))]),
            )
            .unwrap();
        registry.freeze();

        assert_eq!(registry.languages(), vec!["strings", "w", "words"]);
        assert_eq!(
            registry.scan("w", "ab", 0).unwrap(),
            vec![Decoration::new(0, StyleTag::Keyword)]
        );
        assert_eq!(
            registry.scan("strings", "ab", 0).unwrap(),
            vec![Decoration::new(0, StyleTag::String)]
        );
    }

    #[test]
    fn invalid_languages_are_not_registered() {
        let mut registry = Registry::default();
        let rules = RuleSet::new(
            vec![],
            vec![Rule::new(StyleTag::Plain, Pattern::with_flags("^a", "g").unwrap())],
        );
        assert!(matches!(
            registry.register_language(&["bad"], rules),
            Err(Error::ForbiddenPatternFlag { flag: 'g', .. })
        ));
        assert!(!registry.contains_language("bad"));
    }

    #[test]
    fn unknown_language_without_defaults_is_plain() {
        let mut registry = Registry::default();
        registry.freeze();
        assert_eq!(
            registry.scan("nope", "int x;", 4).unwrap(),
            vec![Decoration::new(4, StyleTag::Plain)]
        );
        assert!(registry.scan("nope", "", 4).unwrap().is_empty());
    }

    #[test]
    fn decorations_are_offset() {
        let mut registry = Registry::default();
        registry.register_language(&["words"], words()).unwrap();
        registry.freeze();
        assert_eq!(
            registry.scan("words", "ab cd", 10).unwrap(),
            vec![
                Decoration::new(10, StyleTag::Keyword),
                Decoration::new(12, StyleTag::Plain),
                Decoration::new(13, StyleTag::Keyword),
            ]
        );
    }

    #[test]
    fn can_register_from_path() {
        let mut registry = Registry::default();
        registry
            .register_from_path("src/fixtures/languages/ini.json")
            .unwrap();
        registry.freeze();
        assert!(registry.contains_language("ini"));
        assert!(registry.contains_language("cfg"));
        assert_eq!(
            registry.scan("ini", "; hi", 0).unwrap(),
            vec![Decoration::new(0, StyleTag::Comment)]
        );
    }

    #[test]
    fn can_register_options_from_path() {
        let mut registry = Registry::default();
        registry
            .register_from_path("src/fixtures/languages/sql.json")
            .unwrap();
        registry.freeze();
        let source = "select a from t where b = 'x'";
        let decorations = registry.scan("sql", source, 0).unwrap();
        let spans: Vec<_> = crate::decorations::spans(&decorations, source.len())
            .map(|(range, style)| (&source[range], style))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("select", StyleTag::Keyword),
                (" a ", StyleTag::Plain),
                ("from", StyleTag::Keyword),
                (" t ", StyleTag::Plain),
                ("where", StyleTag::Keyword),
                (" b ", StyleTag::Plain),
                ("=", StyleTag::Punctuation),
                (" ", StyleTag::Plain),
                ("'x'", StyleTag::String),
            ]
        );
        assert_eq!(
            registry.scan("sql", "INT", 0).unwrap(),
            vec![Decoration::new(0, StyleTag::Type)]
        );
    }

    #[test]
    fn definitions_list_every_name() {
        let mut registry = Registry::default();
        registry.register_language(&["words", "w"], words()).unwrap();
        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].names, vec!["w", "words"]);
        assert_eq!(definitions[0].rules, Some(words()));
    }

    #[cfg(feature = "dump")]
    #[test]
    fn can_dump_and_load_registry() {
        let registry = Registry::builtin().unwrap();
        let path = std::env::temp_dir().join("arancio-registry-test.zst");
        registry.dump_to_file(&path).unwrap();
        let loaded = Registry::load_from_file(&path).unwrap();
        assert_eq!(loaded.languages(), registry.languages());
        let source = "int main() { return 0; }";
        assert_eq!(
            loaded.scan("c", source, 0).unwrap(),
            registry.scan("c", source, 0).unwrap()
        );
    }
}
