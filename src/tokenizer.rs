use std::collections::HashMap;

use crate::Registry;
use crate::decorations::Decoration;
use crate::lexer::{Classification, Lexer};
use crate::style::StyleTag;

/// How deep scans can nest before we stop and style the text as `src`.
/// Entering an embedded language and re-scanning the text around it both count as a level.
pub const MAX_EMBEDDING_DEPTH: usize = 64;

/// A piece of source to scan with a given lexer.
/// `base_offset` is the position of `source` in the text of the top-level scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanJob<'s> {
    pub source: &'s str,
    pub base_offset: usize,
}

impl<'s> ScanJob<'s> {
    pub fn new(source: &'s str, base_offset: usize) -> Self {
        Self {
            source,
            base_offset,
        }
    }
}

/// Styles already computed for token texts, per lexer.
/// Lexers are identified by their address: they live in the registry for the whole scan.
#[derive(Debug, Default)]
struct StyleCache {
    by_lexer: HashMap<usize, HashMap<String, StyleTag>>,
}

impl StyleCache {
    fn key(lexer: &Lexer) -> usize {
        lexer as *const Lexer as usize
    }

    fn get(&self, lexer: &Lexer, token: &str) -> Option<StyleTag> {
        self.by_lexer
            .get(&Self::key(lexer))
            .and_then(|styles| styles.get(token))
            .copied()
    }

    fn insert(&mut self, lexer: &Lexer, token: &str, style: StyleTag) {
        self.by_lexer
            .entry(Self::key(lexer))
            .or_default()
            .insert(token.to_owned(), style);
    }
}

/// Scans one source string, recursing into embedded languages.
///
/// A tokenizer lives for a single top-level scan and owns the style cache of that scan.
#[derive(Debug)]
pub(crate) struct Tokenizer<'r> {
    registry: &'r Registry,
    cache: StyleCache,
}

impl<'r> Tokenizer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            cache: StyleCache::default(),
        }
    }

    /// Appends the decorations of the job to `out`, starting with a plain one at the
    /// base offset. Nothing is simplified.
    pub fn scan(
        &mut self,
        lexer: &Lexer,
        job: ScanJob<'_>,
        out: &mut Vec<Decoration>,
        depth: usize,
    ) {
        if depth > MAX_EMBEDDING_DEPTH {
            #[cfg(feature = "debug")]
            log::debug!("[scan] too deeply nested at {}, giving up", job.base_offset);
            out.push(Decoration::new(job.base_offset, StyleTag::Source));
            return;
        }
        out.push(Decoration::new(job.base_offset, StyleTag::Plain));

        for range in lexer.matcher().tokens(job.source) {
            let token = &job.source[range.clone()];
            let token_start = job.base_offset + range.start;

            let classification = match self.cache.get(lexer, token) {
                Some(style) => Classification::Terminal(style),
                None => {
                    let classification = lexer.classify(token);
                    if let Classification::Terminal(style) = classification {
                        self.cache.insert(lexer, token, style);
                    }
                    classification
                }
            };

            #[cfg(feature = "debug")]
            log::trace!("[scan] {token_start}: {token:?} => {classification:?}");

            match classification {
                Classification::Terminal(style) => {
                    out.push(Decoration::new(token_start, style));
                }
                Classification::Embedded { language, group } => {
                    if group.start > 0 {
                        let before = ScanJob::new(&token[..group.start], token_start);
                        self.scan(lexer, before, out, depth + 1);
                    }
                    let embedded = ScanJob::new(&token[group.clone()], token_start + group.start);
                    self.scan_embedded(language, embedded, out, depth + 1);
                    if group.end < token.len() {
                        let after = ScanJob::new(&token[group.end..], token_start + group.end);
                        self.scan(lexer, after, out, depth + 1);
                    }
                }
            }
        }
    }

    fn scan_embedded(
        &mut self,
        language: &str,
        job: ScanJob<'_>,
        out: &mut Vec<Decoration>,
        depth: usize,
    ) {
        match self.registry.embedded_lexer(language, job.source) {
            Some(lexer) => {
                #[cfg(feature = "debug")]
                log::debug!(
                    "[scan_embedded] {} bytes at {} handed over to {language:?}",
                    job.source.len(),
                    job.base_offset
                );
                self.scan(lexer, job, out, depth);
            }
            None => out.push(Decoration::new(job.base_offset, StyleTag::Plain)),
        }
    }
}
