use crate::lint::LintReport;
use crate::tree::{self, DocumentTree, Element};
use pagegrade_rubric::{
    AUTHOR_PLACEHOLDER, BODY_FONT_FAMILY, BODY_FONT_SIZE, CSS_PATH, CheckDef, CheckId,
    IMAGE_DIR, IMAGE_MAX_HEIGHT, MIN_LIST_ITEMS, PARAGRAPH_LINE_HEIGHT, TITLE_PLACEHOLDER,
    check_def, checks_in, Category,
};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(Mismatch),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub def: &'static CheckDef,
    pub outcome: Outcome,
}

impl CheckResult {
    fn pass(id: CheckId) -> Self {
        Self {
            def: check_def(id),
            outcome: Outcome::Pass,
        }
    }

    fn fail(id: CheckId, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            def: check_def(id),
            outcome: Outcome::Fail(Mismatch {
                expected: expected.into(),
                actual: actual.into(),
            }),
        }
    }

    fn from_bool(id: CheckId, ok: bool, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        if ok {
            Self::pass(id)
        } else {
            Self::fail(id, expected, actual)
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Pass)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match &self.outcome {
            Outcome::Pass => None,
            Outcome::Fail(mismatch) => Some(mismatch),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Pass => write!(f, "PASS {} {}", self.def.key, self.def.description),
            Outcome::Fail(mismatch) => write!(
                f,
                "FAIL {} {}: expected {}, got {}",
                self.def.key, self.def.description, mismatch.expected, mismatch.actual
            ),
        }
    }
}

fn image_src_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(&format!("^{}/.+", regex::escape(IMAGE_DIR))).expect("image path pattern")
    })
}

fn absolute_url_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"^https?://").expect("absolute url pattern"))
}

/// Families in order, each optionally single-quoted, comma separated.
fn font_family_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| {
        let families: Vec<String> = BODY_FONT_FAMILY
            .iter()
            .map(|family| format!("'?{}'?", regex::escape(family)))
            .collect();
        Regex::new(&families.join(", *")).expect("font family pattern")
    })
}

fn count_text(found: usize, selector: &str) -> String {
    match found {
        0 => format!("no `{selector}`"),
        1 => format!("1 `{selector}`"),
        n => format!("{n} `{selector}` elements"),
    }
}

fn quoted(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{value:?}"),
        None => "nothing".to_string(),
    }
}

// ---- syntax ----

pub fn lint_check(id: CheckId, report: &LintReport) -> CheckResult {
    let errors: Vec<String> = report.errors().map(ToString::to_string).collect();
    CheckResult::from_bool(
        id,
        errors.is_empty(),
        "0 errors",
        format!("{} error(s): {}", errors.len(), errors.join("; ")),
    )
}

// ---- structure ----

pub fn structure_checks(tree: &DocumentTree) -> Vec<CheckResult> {
    vec![
        check_charset(tree),
        check_title(tree),
        check_author(tree),
        check_heading(tree),
        check_image(tree),
        check_paragraph(tree),
        check_paragraph_link(tree),
        check_list(tree),
        check_list_items(tree),
    ]
}

fn check_charset(tree: &DocumentTree) -> CheckResult {
    let selector = "head > meta[charset]";
    let found = tree.count(selector);
    CheckResult::from_bool(CheckId::Charset, found == 1, count_text(1, selector), count_text(found, selector))
}

fn check_title(tree: &DocumentTree) -> CheckResult {
    let selector = "head > title";
    let titles = tree.select(selector);
    if titles.len() != 1 {
        return CheckResult::fail(CheckId::Title, count_text(1, selector), count_text(titles.len(), selector));
    }
    let title = tree::text(&titles[0]);
    let title = title.trim();
    let expected = format!("a title other than {TITLE_PLACEHOLDER:?}");
    CheckResult::from_bool(
        CheckId::Title,
        !title.is_empty() && title != TITLE_PLACEHOLDER,
        expected,
        quoted(Some(title)),
    )
}

fn check_author(tree: &DocumentTree) -> CheckResult {
    let selector = "head > meta[name=\"author\"]";
    let metas = tree.select(selector);
    if metas.len() != 1 {
        return CheckResult::fail(CheckId::Author, count_text(1, selector), count_text(metas.len(), selector));
    }
    let content = tree::attr(&metas[0], "content");
    let trimmed = content.as_deref().map(str::trim);
    let ok = trimmed.is_some_and(|c| !c.is_empty() && c != AUTHOR_PLACEHOLDER);
    CheckResult::from_bool(
        CheckId::Author,
        ok,
        format!("author content other than {AUTHOR_PLACEHOLDER:?}"),
        quoted(trimmed),
    )
}

fn check_heading(tree: &DocumentTree) -> CheckResult {
    let headings = tree.select("h1");
    if headings.len() != 1 {
        return CheckResult::fail(CheckId::Heading, count_text(1, "h1"), count_text(headings.len(), "h1"));
    }
    let text = tree::text(&headings[0]);
    CheckResult::from_bool(CheckId::Heading, !text.trim().is_empty(), "non-empty h1 text", "empty h1")
}

fn check_image(tree: &DocumentTree) -> CheckResult {
    let Some(image) = tree.first("img") else {
        return CheckResult::fail(CheckId::Image, "an img", count_text(0, "img"));
    };
    let src = tree::attr(&image, "src");
    let ok = src.as_deref().is_some_and(|s| image_src_pattern().is_match(s));
    CheckResult::from_bool(CheckId::Image, ok, format!("src under {IMAGE_DIR}/"), quoted(src.as_deref()))
}

fn check_paragraph(tree: &DocumentTree) -> CheckResult {
    let paragraphs = tree.select("p");
    if paragraphs.is_empty() {
        return CheckResult::fail(CheckId::Paragraph, "a p", count_text(0, "p"));
    }
    let combined: String = paragraphs.iter().map(tree::text).collect();
    CheckResult::from_bool(CheckId::Paragraph, !combined.trim().is_empty(), "paragraph text", "empty paragraphs")
}

fn check_paragraph_link(tree: &DocumentTree) -> CheckResult {
    let Some(link) = tree.first("p a") else {
        return CheckResult::fail(CheckId::ParagraphLink, "a link inside a p", count_text(0, "p a"));
    };
    let href = tree::attr(&link, "href");
    let ok = href.as_deref().is_some_and(|h| absolute_url_pattern().is_match(h));
    CheckResult::from_bool(CheckId::ParagraphLink, ok, "an absolute http(s) href", quoted(href.as_deref()))
}

fn check_list(tree: &DocumentTree) -> CheckResult {
    let found = tree.count("ul, ol");
    CheckResult::from_bool(CheckId::List, found >= 1, "a ul or ol", count_text(found, "ul, ol"))
}

fn check_list_items(tree: &DocumentTree) -> CheckResult {
    let Some(list) = tree.first("ul, ol") else {
        return CheckResult::fail(CheckId::ListItems, "a list", count_text(0, "ul, ol"));
    };
    let items: Vec<Element> = tree::element_children(&list)
        .into_iter()
        .filter(|child| tree::local_name(child) == "li")
        .collect();
    let expected = format!("at least {MIN_LIST_ITEMS} non-empty li in the first list");
    if items.len() < MIN_LIST_ITEMS {
        return CheckResult::fail(CheckId::ListItems, expected, format!("{} li", items.len()));
    }
    let empty = items
        .iter()
        .filter(|item| tree::text(item).trim().is_empty())
        .count();
    CheckResult::from_bool(CheckId::ListItems, empty == 0, expected, format!("{empty} empty li"))
}

// ---- style ----

pub fn style_checks(tree: &DocumentTree) -> Vec<CheckResult> {
    vec![
        check_stylesheet_link(tree),
        check_body_font_size(tree),
        check_body_font_family(tree),
        check_paragraph_line_height(tree),
        check_image_max_height(tree),
        check_highlighted_item(tree),
    ]
}

/// Fails every style check with the same reason, used when no inlined tree
/// is available.
pub fn style_failures(reason: &str) -> Vec<CheckResult> {
    checks_in(Category::Style)
        .map(|def| CheckResult::fail(def.id, def.criterion, reason))
        .collect()
}

fn check_stylesheet_link(tree: &DocumentTree) -> CheckResult {
    let links = tree.select("head > link");
    if links.len() != 1 {
        return CheckResult::fail(
            CheckId::StylesheetLink,
            count_text(1, "head > link"),
            count_text(links.len(), "head > link"),
        );
    }
    let href = tree::attr(&links[0], "href");
    let ok = href.as_deref().is_some_and(|h| h.contains(CSS_PATH));
    CheckResult::from_bool(CheckId::StylesheetLink, ok, format!("href containing {CSS_PATH}"), quoted(href.as_deref()))
}

fn body_css(tree: &DocumentTree, property: &str) -> Option<String> {
    tree.first("body").and_then(|body| tree::css(&body, property))
}

fn check_body_font_size(tree: &DocumentTree) -> CheckResult {
    let size = body_css(tree, "font-size");
    CheckResult::from_bool(
        CheckId::BodyFontSize,
        size.as_deref() == Some(BODY_FONT_SIZE),
        BODY_FONT_SIZE,
        quoted(size.as_deref()),
    )
}

fn check_body_font_family(tree: &DocumentTree) -> CheckResult {
    let family = body_css(tree, "font-family");
    let ok = family
        .as_deref()
        .is_some_and(|f| font_family_pattern().is_match(&f.replace('"', "'")));
    CheckResult::from_bool(CheckId::BodyFontFamily, ok, BODY_FONT_FAMILY.join(", "), quoted(family.as_deref()))
}

fn check_paragraph_line_height(tree: &DocumentTree) -> CheckResult {
    let paragraphs = tree.select("p");
    let expected = format!("line-height {PARAGRAPH_LINE_HEIGHT} on every p, no id or class");
    if paragraphs.is_empty() {
        return CheckResult::fail(CheckId::ParagraphLineHeight, expected, count_text(0, "p"));
    }
    if let Some(tagged) = paragraphs
        .iter()
        .find(|p| tree::has_attr(p, "id") || tree::has_attr(p, "class"))
    {
        let attr = if tree::has_attr(tagged, "id") { "id" } else { "class" };
        return CheckResult::fail(CheckId::ParagraphLineHeight, expected, format!("a p with {attr}"));
    }
    for paragraph in &paragraphs {
        let value = tree::css(paragraph, "line-height");
        if value.as_deref() != Some(PARAGRAPH_LINE_HEIGHT) {
            return CheckResult::fail(CheckId::ParagraphLineHeight, expected, format!("line-height {}", quoted(value.as_deref())));
        }
    }
    CheckResult::pass(CheckId::ParagraphLineHeight)
}

fn check_image_max_height(tree: &DocumentTree) -> CheckResult {
    let images = tree.select("img");
    let expected = format!("max-height {IMAGE_MAX_HEIGHT} on every img");
    if images.is_empty() {
        return CheckResult::fail(CheckId::ImageMaxHeight, expected, count_text(0, "img"));
    }
    for image in &images {
        let value = tree::css(image, "max-height");
        if value.as_deref() != Some(IMAGE_MAX_HEIGHT) {
            return CheckResult::fail(CheckId::ImageMaxHeight, expected, format!("max-height {}", quoted(value.as_deref())));
        }
    }
    CheckResult::pass(CheckId::ImageMaxHeight)
}

fn check_highlighted_item(tree: &DocumentTree) -> CheckResult {
    let items = tree.select("li[class]");
    if items.len() != 1 {
        return CheckResult::fail(
            CheckId::HighlightedItem,
            count_text(1, "li[class]"),
            count_text(items.len(), "li[class]"),
        );
    }
    let color = tree::css(&items[0], "color");
    let ok = color.as_deref().is_some_and(|c| !c.trim().is_empty());
    CheckResult::from_bool(CheckId::HighlightedItem, ok, "a color", quoted(color.as_deref()))
}
