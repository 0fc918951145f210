use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

pub const RUBRIC_ID: &str = "pagegrade.rubric";
pub const RUBRIC_VERSION: &str = "1";

/// Default text shipped in the starter `<title>`; leaving it unchanged fails.
pub const TITLE_PLACEHOLDER: &str = "My Page Title";
/// Default `content` of the starter author `<meta>`; leaving it unchanged fails.
pub const AUTHOR_PLACEHOLDER: &str = "your name";

pub const HTML_PATH: &str = "index.html";
pub const CSS_PATH: &str = "css/style.css";
pub const IMAGE_DIR: &str = "img";

pub const MIN_LIST_ITEMS: usize = 3;
pub const BODY_FONT_SIZE: &str = "16px";
pub const BODY_FONT_FAMILY: [&str; 4] = ["Helvetica Neue", "Helvetica", "Arial", "sans-serif"];
pub const PARAGRAPH_LINE_HEIGHT: &str = "1.5";
pub const IMAGE_MAX_HEIGHT: &str = "400px";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Syntax,
    Structure,
    Style,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Syntax, Category::Structure, Category::Style];

    pub fn id(self) -> &'static str {
        match self {
            Category::Syntax => "syntax",
            Category::Structure => "structure",
            Category::Style => "style",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Syntax => "Source code is valid",
            Category::Structure => "Has required HTML",
            Category::Style => "Has required CSS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckId {
    HtmlValid,
    CssValid,
    Charset,
    Title,
    Author,
    Heading,
    Image,
    Paragraph,
    ParagraphLink,
    List,
    ListItems,
    StylesheetLink,
    BodyFontSize,
    BodyFontFamily,
    ParagraphLineHeight,
    ImageMaxHeight,
    HighlightedItem,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckDef {
    pub id: CheckId,
    pub key: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub criterion: &'static str,
}

pub const CHECKS_V1: [CheckDef; 17] = [
    CheckDef { id: CheckId::HtmlValid, key: "syntax.html_valid", category: Category::Syntax, description: "HTML validates without errors", criterion: "no html lint errors under the rubric rule set" },
    CheckDef { id: CheckId::CssValid, key: "syntax.css_valid", category: Category::Syntax, description: "CSS validates without errors", criterion: "no css lint errors under the default rule set" },
    CheckDef { id: CheckId::Charset, key: "structure.charset", category: Category::Structure, description: "Specifies charset", criterion: "exactly one head > meta[charset]" },
    CheckDef { id: CheckId::Title, key: "structure.title", category: Category::Structure, description: "Includes page title", criterion: "exactly one head > title with non-placeholder text" },
    CheckDef { id: CheckId::Author, key: "structure.author", category: Category::Structure, description: "Includes author metadata", criterion: "exactly one head > meta[name=author] with non-placeholder content" },
    CheckDef { id: CheckId::Heading, key: "structure.heading", category: Category::Structure, description: "Has a top-level heading", criterion: "exactly one h1 with text" },
    CheckDef { id: CheckId::Image, key: "structure.image", category: Category::Structure, description: "Has an image", criterion: "img present with src under img/" },
    CheckDef { id: CheckId::Paragraph, key: "structure.paragraph", category: Category::Structure, description: "Includes a paragraph", criterion: "p present with text" },
    CheckDef { id: CheckId::ParagraphLink, key: "structure.paragraph_link", category: Category::Structure, description: "Includes a hyperlink in the paragraph", criterion: "p a present with absolute http(s) href" },
    CheckDef { id: CheckId::List, key: "structure.list", category: Category::Structure, description: "Includes a list", criterion: "ul or ol present" },
    CheckDef { id: CheckId::ListItems, key: "structure.list_items", category: Category::Structure, description: "List has at least 3 items", criterion: "first list has 3+ li children, none empty" },
    CheckDef { id: CheckId::StylesheetLink, key: "style.stylesheet_link", category: Category::Style, description: "Links in local stylesheet", criterion: "exactly one head > link referencing css/style.css" },
    CheckDef { id: CheckId::BodyFontSize, key: "style.body_font_size", category: Category::Style, description: "Body has default font size", criterion: "body font-size is 16px" },
    CheckDef { id: CheckId::BodyFontFamily, key: "style.body_font_family", category: Category::Style, description: "Body has default font family", criterion: "body font-family is Helvetica Neue, Helvetica, Arial, sans-serif" },
    CheckDef { id: CheckId::ParagraphLineHeight, key: "style.paragraph_line_height", category: Category::Style, description: "Paragraphs have specified line height", criterion: "p line-height is 1.5 and p has no id or class" },
    CheckDef { id: CheckId::ImageMaxHeight, key: "style.image_max_height", category: Category::Style, description: "Images have constrained height", criterion: "img max-height is 400px" },
    CheckDef { id: CheckId::HighlightedItem, key: "style.highlighted_item", category: Category::Style, description: "Important list item is colored", criterion: "exactly one li[class] with a defined color" },
];

pub fn check_def(id: CheckId) -> &'static CheckDef {
    // CHECKS_V1 is laid out in CheckId declaration order.
    &CHECKS_V1[id as usize]
}

pub fn check_by_key(key: &str) -> Option<&'static CheckDef> {
    CHECKS_V1.iter().find(|def| def.key == key)
}

pub fn checks_in(category: Category) -> impl Iterator<Item = &'static CheckDef> {
    CHECKS_V1.iter().filter(move |def| def.category == category)
}

#[derive(Debug, Clone)]
pub struct RubricMetadata {
    pub rubric_id: &'static str,
    pub rubric_version: &'static str,
    pub rubric_fingerprint_sha256: String,
    pub check_count: usize,
}

pub fn hex_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

static RUBRIC_JSON_VALUE: OnceLock<Value> = OnceLock::new();
static RUBRIC_FINGERPRINT: OnceLock<String> = OnceLock::new();

/// Canonical JSON form of the catalogue and the expected values it grades against.
pub fn rubric_value() -> &'static Value {
    RUBRIC_JSON_VALUE.get_or_init(|| {
        let categories: Vec<Value> = Category::ALL
            .iter()
            .map(|cat| json!({ "id": cat.id(), "name": cat.name() }))
            .collect();
        let checks: Vec<Value> = CHECKS_V1
            .iter()
            .map(|def| {
                json!({
                    "id": def.key,
                    "category": def.category.id(),
                    "description": def.description,
                    "criterion": def.criterion,
                })
            })
            .collect();
        json!({
            "rubric_id": RUBRIC_ID,
            "rubric_version": RUBRIC_VERSION,
            "categories": categories,
            "checks": checks,
            "expected": {
                "title_placeholder": TITLE_PLACEHOLDER,
                "author_placeholder": AUTHOR_PLACEHOLDER,
                "stylesheet_href": CSS_PATH,
                "min_list_items": MIN_LIST_ITEMS,
                "body_font_size": BODY_FONT_SIZE,
                "body_font_family": BODY_FONT_FAMILY,
                "paragraph_line_height": PARAGRAPH_LINE_HEIGHT,
                "image_max_height": IMAGE_MAX_HEIGHT,
            },
        })
    })
}

pub fn rubric_fingerprint() -> String {
    RUBRIC_FINGERPRINT
        .get_or_init(|| hex_sha256(rubric_value().to_string().as_bytes()))
        .clone()
}

pub fn rubric_metadata() -> RubricMetadata {
    RubricMetadata {
        rubric_id: RUBRIC_ID,
        rubric_version: RUBRIC_VERSION,
        rubric_fingerprint_sha256: rubric_fingerprint(),
        check_count: CHECKS_V1.len(),
    }
}
