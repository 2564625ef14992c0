//! Building documents.
//!
//! A [`Document`] is everything one navigation produces before layout: the
//! tree, the author stylesheet and the computed style of every element. It is
//! immutable once built; a new navigation builds a new one.

use std::collections::BTreeMap;
use std::time::Instant;

use futures::future::join_all;
use kestrel_common::url::resolve_url;
use kestrel_common::warning::WarningScope;
use kestrel_css::{
    LayoutResult, StyleTable, Stylesheet, Viewport, compute_styles, layout_document,
    parse_stylesheet,
};
use kestrel_dom::DomTree;
use kestrel_html::{ParseIssue, ParsedHtml, ScriptInfo, parse};

use crate::config::EngineConfig;
use crate::error::BuildError;
use crate::fetch::{Cancellation, Fetch, FetchLimiter};

/// A parsed and styled document.
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    title: Option<String>,
    charset: Option<String>,
    language: Option<String>,
    metadata: BTreeMap<String, String>,
    stylesheet: Stylesheet,
    stylesheet_links: Vec<String>,
    scripts: Vec<ScriptInfo>,
    issues: Vec<ParseIssue>,
    styles: StyleTable,
    base_url: Option<String>,
    warnings: Vec<String>,
}

impl Document {
    /// Build a document from markup alone. Linked stylesheets are recorded
    /// but not fetched.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidInput`] for empty or whitespace-only markup.
    pub fn build(html: &str, viewport_width: f32) -> Result<Self, BuildError> {
        Self::build_with_external(html, &[], viewport_width)
    }

    /// Build a document with already-fetched external CSS.
    ///
    /// The author stylesheet is the document's `<style>` text followed by
    /// `external_css` in the order given, which callers keep in link order.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidInput`] for empty or whitespace-only markup.
    pub fn build_with_external(
        html: &str,
        external_css: &[String],
        viewport_width: f32,
    ) -> Result<Self, BuildError> {
        let mut warnings = WarningScope::new();
        let parsed = warnings.enter(|| parse_markup(html))?;
        Ok(Self::from_parsed(
            parsed,
            external_css,
            None,
            viewport_width,
            warnings,
        ))
    }

    fn from_parsed(
        parsed: ParsedHtml,
        external_css: &[String],
        base_url: Option<&str>,
        viewport_width: f32,
        mut warnings: WarningScope,
    ) -> Self {
        let (stylesheet, styles) =
            warnings.enter(|| style_document(&parsed, external_css, viewport_width));

        Self {
            charset: parsed.charset().map(str::to_string),
            language: parsed.language().map(str::to_string),
            tree: parsed.tree,
            title: parsed.title,
            metadata: parsed.metadata,
            stylesheet,
            stylesheet_links: parsed.stylesheet_links,
            scripts: parsed.scripts,
            issues: parsed.issues,
            styles,
            base_url: base_url.map(str::to_string),
            warnings: warnings.into_messages(),
        }
    }

    /// Lay the document out for `viewport` and paint it into a display list.
    ///
    /// Styles were resolved at build time, so media queries reflect the
    /// build width even if `viewport` is wider or narrower.
    #[must_use]
    pub fn layout(&self, viewport: &Viewport) -> LayoutResult {
        layout_document(&self.tree, &self.styles, viewport)
    }

    /// The document tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Text of the first `<title>`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Character set from `<meta charset>`.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// The root element's `lang`.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// `<meta>` values.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// The author stylesheet: `<style>` text plus external sheets.
    #[must_use]
    pub const fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// `<link rel=stylesheet>` hrefs as written, in declaration order.
    #[must_use]
    pub fn stylesheet_links(&self) -> &[String] {
        &self.stylesheet_links
    }

    /// Scripts found in the markup.
    #[must_use]
    pub fn scripts(&self) -> &[ScriptInfo] {
        &self.scripts
    }

    /// Markup errors recovered while parsing.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Computed style of every element.
    #[must_use]
    pub const fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// The URL the document was loaded from, if any.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Distinct warnings raised while building, in the order first seen.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn parse_markup(html: &str) -> Result<ParsedHtml, BuildError> {
    if html.trim().is_empty() {
        return Err(BuildError::InvalidInput);
    }
    let start = Instant::now();
    let parsed = parse(html);
    log::debug!(
        "parsed {} nodes ({} issues) in {:?}",
        parsed.tree.len(),
        parsed.issues.len(),
        start.elapsed()
    );
    Ok(parsed)
}

fn style_document(
    parsed: &ParsedHtml,
    external_css: &[String],
    viewport_width: f32,
) -> (Stylesheet, StyleTable) {
    let start = Instant::now();
    let mut css = parsed.style_text.clone();
    for sheet in external_css {
        css.push('\n');
        css.push_str(sheet);
    }
    let stylesheet = parse_stylesheet(&css);
    let styles = compute_styles(&parsed.tree, &stylesheet, viewport_width);
    log::debug!(
        "styled {} elements with {} rules in {:?}",
        styles.len(),
        stylesheet.rules.len(),
        start.elapsed()
    );
    (stylesheet, styles)
}

/// The asynchronous build pipeline: fetch, then build.
///
/// The pipeline stages themselves never suspend. Only fetching the primary
/// document and the linked stylesheets does, and all of it goes through one
/// [`FetchLimiter`].
#[derive(Debug)]
pub struct DocumentBuilder<F> {
    fetcher: F,
    limiter: FetchLimiter,
    config: EngineConfig,
}

impl<F: Fetch> DocumentBuilder<F> {
    /// A builder fetching through `fetcher`, limited by `config`.
    #[must_use]
    pub fn new(fetcher: F, config: EngineConfig) -> Self {
        Self {
            fetcher,
            limiter: FetchLimiter::new(config.max_concurrent_fetches),
            config,
        }
    }

    /// The fetcher every request goes through.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The limiter shared by every fetch this builder makes.
    #[must_use]
    pub const fn limiter(&self) -> &FetchLimiter {
        &self.limiter
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a document from markup, fetching its linked stylesheets.
    ///
    /// Link hrefs are resolved against `base_url`. The stylesheets are
    /// fetched concurrently; a failed fetch contributes nothing and is
    /// logged. Whatever order they complete in, their text is appended in
    /// link order.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidInput`] for empty markup and
    /// [`BuildError::Cancelled`] if `cancel` fired during the build.
    pub async fn build(
        &self,
        html: &str,
        base_url: Option<&str>,
        cancel: &Cancellation,
    ) -> Result<Document, BuildError> {
        let mut warnings = WarningScope::new();
        let parsed = warnings.enter(|| parse_markup(html))?;

        let external = if self.config.fetch_external_stylesheets {
            self.fetch_stylesheets(&parsed.stylesheet_links, base_url, cancel)
                .await
        } else {
            Vec::new()
        };
        if cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }

        Ok(Document::from_parsed(
            parsed,
            &external,
            base_url,
            self.config.viewport_width,
            warnings,
        ))
    }

    /// Fetch the document at `url` and build it.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FetchFailure`] if the document itself cannot be
    /// fetched, [`BuildError::Cancelled`] on cancellation, and
    /// [`BuildError::InvalidInput`] if it is empty.
    pub async fn navigate(&self, url: &str, cancel: &Cancellation) -> Result<Document, BuildError> {
        log::info!("navigating to {url}");
        let start = Instant::now();
        let html = self
            .limiter
            .fetch(&self.fetcher, url, cancel)
            .await
            .map_err(|err| BuildError::from_fetch(url, err))?;
        let document = self.build(&html, Some(url), cancel).await?;
        log::info!("loaded {url} in {:?}", start.elapsed());
        Ok(document)
    }

    async fn fetch_stylesheets(
        &self,
        links: &[String],
        base_url: Option<&str>,
        cancel: &Cancellation,
    ) -> Vec<String> {
        let fetches = links.iter().map(|href| {
            let url = resolve_url(href, base_url);
            async move {
                match self.limiter.fetch(&self.fetcher, &url, cancel).await {
                    Ok(css) => css,
                    Err(err) => {
                        log::warn!("failed to fetch stylesheet {url}: {err}");
                        String::new()
                    }
                }
            }
        });
        join_all(fetches).await
    }
}
