use crate::debug::DebugLogger;
use crate::error::PageGradeError;
use crate::style::{ComputedStyle, DEFAULT_FONT_SIZE_PX, StyleResolver, Viewport};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;
use pagegrade_rubric::hex_sha256;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Elements that never render; they take part in the cascade but get no
/// `style` attribute.
const NON_RENDERED: [&str; 8] = [
    "head", "title", "meta", "link", "style", "script", "base", "noscript",
];

#[derive(Debug, Clone)]
pub struct InlineOptions {
    /// Directory relative stylesheet hrefs resolve against.
    pub base_dir: PathBuf,
    pub keep_link_tags: bool,
    pub remove_style_tags: bool,
    pub viewport: Viewport,
}

impl InlineOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            keep_link_tags: true,
            remove_style_tags: true,
            viewport: Viewport::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InlineOutput {
    pub html: String,
    /// SHA-256 of the source text the inliner parsed.
    pub source_fingerprint: String,
    pub stylesheets: usize,
    pub rules: usize,
    pub styled_elements: usize,
}

/// Resolves every stylesheet the document references and writes each
/// element's computed style into its `style` attribute.
pub fn inline_styles(html: &str, options: &InlineOptions) -> Result<InlineOutput, PageGradeError> {
    inline_styles_logged(html, options, None)
}

pub(crate) fn inline_styles_logged(
    html: &str,
    options: &InlineOptions,
    debug: Option<Arc<DebugLogger>>,
) -> Result<InlineOutput, PageGradeError> {
    let source_fingerprint = hex_sha256(html.as_bytes());
    let document = kuchiki::parse_html().one(html);
    let sheets = collect_stylesheets(&document, options, debug.as_deref())?;
    let resolver = StyleResolver::new(&sheets, options.viewport, debug.clone());

    let mut styled_elements = 0usize;
    apply_styles(
        &document,
        &resolver,
        None,
        DEFAULT_FONT_SIZE_PX,
        &mut styled_elements,
    );

    if options.remove_style_tags {
        detach_all(&document, "style");
    }
    if !options.keep_link_tags {
        detach_all(&document, "link[rel~=stylesheet]");
    }
    if let Some(logger) = debug.as_deref() {
        logger.increment("inline.styled_elements", styled_elements as u64);
    }
    Ok(InlineOutput {
        html: document.to_string(),
        source_fingerprint,
        stylesheets: sheets.len(),
        rules: resolver.rule_count(),
        styled_elements,
    })
}

fn collect_stylesheets(
    document: &NodeRef,
    options: &InlineOptions,
    debug: Option<&DebugLogger>,
) -> Result<Vec<String>, PageGradeError> {
    let mut sheets = Vec::new();
    if let Ok(links) = document.select("link[rel][href]") {
        for link in links {
            let (rel, href) = {
                let attrs = link.attributes.borrow();
                (
                    attrs.get("rel").unwrap_or("").to_ascii_lowercase(),
                    attrs.get("href").unwrap_or("").trim().to_string(),
                )
            };
            if !rel.split_ascii_whitespace().any(|token| token == "stylesheet") {
                continue;
            }
            let Some(path) = local_stylesheet_path(&options.base_dir, &href) else {
                tracing::debug!(href = %href, "skipping remote stylesheet");
                if let Some(logger) = debug {
                    logger.log_event(
                        "inline.stylesheet",
                        json!({ "href": href, "status": "skipped" }),
                    );
                }
                continue;
            };
            let css = std::fs::read_to_string(&path).map_err(|err| PageGradeError::Stylesheet {
                href: href.clone(),
                message: err.to_string(),
            })?;
            if let Some(logger) = debug {
                logger.log_event(
                    "inline.stylesheet",
                    json!({ "href": href, "status": "loaded", "bytes": css.len() }),
                );
            }
            sheets.push(css);
        }
    }
    if let Ok(styles) = document.select("style") {
        for style in styles {
            let text = style.as_node().text_contents();
            if let Some(logger) = debug {
                logger.log_event(
                    "inline.stylesheet",
                    json!({ "href": null, "status": "embedded", "bytes": text.len() }),
                );
            }
            sheets.push(text);
        }
    }
    Ok(sheets)
}

/// Maps an href onto the filesystem. Remote and data URLs yield `None`.
fn local_stylesheet_path(base_dir: &Path, href: &str) -> Option<PathBuf> {
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
    {
        return None;
    }
    let href = href.split(['?', '#']).next().unwrap_or(href);
    let relative = href.strip_prefix("file://").unwrap_or(href);
    let relative = relative.trim_start_matches("./");
    Some(base_dir.join(relative))
}

fn apply_styles(
    node: &NodeRef,
    resolver: &StyleResolver,
    parent: Option<&ComputedStyle>,
    root_font_px: f32,
    styled: &mut usize,
) {
    for child in node.children() {
        let Some(element) = child.clone().into_element_ref() else {
            apply_styles(&child, resolver, parent, root_font_px, styled);
            continue;
        };
        let style = resolver.compute_style(&element, parent, root_font_px);
        let root_font_px = if parent.is_none() {
            style.font_size_px().unwrap_or(root_font_px)
        } else {
            root_font_px
        };
        let rendered = !NON_RENDERED.contains(&&*element.name.local);
        let value = style.to_style_attribute();
        if rendered && !value.is_empty() {
            element.attributes.borrow_mut().insert("style", value);
            *styled += 1;
        }
        apply_styles(&child, resolver, Some(&style), root_font_px, styled);
    }
}

fn detach_all(document: &NodeRef, selector: &str) {
    let Ok(matches) = document.select(selector) else {
        return;
    };
    let nodes: Vec<NodeRef> = matches.map(|el| el.as_node().clone()).collect();
    for node in nodes {
        node.detach();
    }
}
