use crate::debug::DebugLogger;
use kuchiki::{ElementData, NodeDataRef, Selector, Selectors, Specificity};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::media_query::{
    MediaCondition, MediaFeature, MediaFeatureComparison, MediaFeatureId, MediaFeatureName,
    MediaFeatureValue, MediaList, MediaQuery, MediaType, Operator, Qualifier,
};
use lightningcss::properties::Property;
use lightningcss::properties::font::Font;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;
use serde_json::json;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

/// Font size of the root element when no rule sets one.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

const INHERITED_PROPERTIES: [&str; 22] = [
    "color",
    "cursor",
    "direction",
    "font-family",
    "font-size",
    "font-stretch",
    "font-style",
    "font-variant-caps",
    "font-weight",
    "letter-spacing",
    "line-height",
    "list-style-image",
    "list-style-position",
    "list-style-type",
    "quotes",
    "text-align",
    "text-indent",
    "text-transform",
    "visibility",
    "white-space",
    "word-break",
    "word-spacing",
];

fn is_inherited(name: &str) -> bool {
    name.starts_with("--") || INHERITED_PROPERTIES.contains(&name)
}

/// Screen size used to evaluate `@media` width/height features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    name: String,
    value: String,
}

struct RuleEntry {
    selector: Rc<Selector>,
    specificity: Specificity,
    order: usize,
    declarations: Vec<Declaration>,
}

/// Computed property values of one element, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    properties: BTreeMap<String, String>,
}

impl ComputedStyle {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn font_size_px(&self) -> Option<f32> {
        self.get("font-size").and_then(parse_px)
    }

    /// Serialises the style as a `style` attribute. Custom properties stay
    /// internal to the cascade.
    pub fn to_style_attribute(&self) -> String {
        self.properties
            .iter()
            .filter(|(name, _)| !name.starts_with("--"))
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub struct StyleResolver {
    normal_rules: Vec<RuleEntry>,
    important_rules: Vec<RuleEntry>,
    viewport: Viewport,
    debug: Option<Arc<DebugLogger>>,
}

impl StyleResolver {
    pub fn new(sheets: &[String], viewport: Viewport, debug: Option<Arc<DebugLogger>>) -> Self {
        let mut resolver = Self {
            normal_rules: Vec::new(),
            important_rules: Vec::new(),
            viewport,
            debug,
        };
        let mut order = 0usize;
        for css in sheets {
            if css.trim().is_empty() {
                continue;
            }
            let options = ParserOptions {
                error_recovery: true,
                ..ParserOptions::default()
            };
            match StyleSheet::parse(css, options) {
                Ok(sheet) => resolver.append_rule_list(&sheet.rules, &mut order),
                Err(err) => {
                    if let Some(logger) = resolver.debug.as_deref() {
                        logger.log_event("css.sheet_unparsed", json!({ "error": err.to_string() }));
                    }
                }
            }
        }
        resolver
    }

    #[cfg(test)]
    pub fn from_css(css: &str) -> Self {
        Self::new(&[css.to_string()], Viewport::default(), None)
    }

    pub fn rule_count(&self) -> usize {
        self.normal_rules.len() + self.important_rules.len()
    }

    fn append_rule_list(&mut self, rules: &CssRuleList, order: &mut usize) {
        for rule in &rules.0 {
            match rule {
                CssRule::Style(style) => {
                    let selector_text = style
                        .selectors
                        .to_css_string(PrinterOptions::default())
                        .unwrap_or_default();
                    let (normal, important) = declarations_from_block(&style.declarations);
                    for selector in self.compile_selectors(&selector_text) {
                        let specificity = selector.specificity();
                        if !normal.is_empty() {
                            self.normal_rules.push(RuleEntry {
                                selector: Rc::clone(&selector),
                                specificity,
                                order: *order,
                                declarations: normal.clone(),
                            });
                        }
                        if !important.is_empty() {
                            self.important_rules.push(RuleEntry {
                                selector,
                                specificity,
                                order: *order,
                                declarations: important.clone(),
                            });
                        }
                    }
                    *order += 1;
                }
                CssRule::Media(media) => {
                    let matched = media_list_matches(&media.query, self.viewport);
                    if let Some(logger) = self.debug.as_deref() {
                        logger.increment(
                            if matched {
                                "css.media.rules_matched"
                            } else {
                                "css.media.rules_skipped"
                            },
                            1,
                        );
                    }
                    if matched {
                        self.append_rule_list(&media.rules, order);
                    }
                }
                CssRule::Supports(supports) => self.append_rule_list(&supports.rules, order),
                _ => {}
            }
        }
    }

    fn compile_selectors(&self, text: &str) -> Vec<Rc<Selector>> {
        if let Ok(selectors) = Selectors::compile(text) {
            return selectors.0.into_iter().map(Rc::new).collect();
        }
        // One bad selector invalidates the whole list for the engine; keep the rest.
        let mut out = Vec::new();
        for part in text.split(',') {
            let part = part.trim();
            match Selectors::compile(part) {
                Ok(selectors) => out.extend(selectors.0.into_iter().map(Rc::new)),
                Err(()) => {
                    if let Some(logger) = self.debug.as_deref() {
                        logger.log_event("css.selector_unparsed", json!({ "selector": part }));
                        logger.increment("css.selector_unparsed", 1);
                    }
                }
            }
        }
        out
    }

    /// Resolves the cascade for `element` and inherits from `parent`.
    pub fn compute_style(
        &self,
        element: &NodeDataRef<ElementData>,
        parent: Option<&ComputedStyle>,
        root_font_px: f32,
    ) -> ComputedStyle {
        let inline = element
            .attributes
            .borrow()
            .get("style")
            .map(parse_inline_style)
            .unwrap_or_default();

        let mut declared: BTreeMap<String, String> = BTreeMap::new();
        for decl in matching_declarations(&self.normal_rules, element) {
            declared.insert(decl.name.clone(), decl.value.clone());
        }
        for decl in &inline.0 {
            declared.insert(decl.name.clone(), decl.value.clone());
        }
        for decl in matching_declarations(&self.important_rules, element) {
            declared.insert(decl.name.clone(), decl.value.clone());
        }
        for decl in &inline.1 {
            declared.insert(decl.name.clone(), decl.value.clone());
        }

        let mut computed = ComputedStyle::default();
        if let Some(parent) = parent {
            for (name, value) in &parent.properties {
                if is_inherited(name) {
                    computed.properties.insert(name.clone(), value.clone());
                }
            }
        }
        let parent_font_px = parent
            .and_then(ComputedStyle::font_size_px)
            .unwrap_or(root_font_px);

        // Custom properties first so var() in ordinary declarations sees them.
        let (custom, ordinary): (Vec<_>, Vec<_>) = declared
            .into_iter()
            .partition(|(name, _)| name.starts_with("--"));
        for (name, value) in custom.into_iter().chain(ordinary) {
            let keyword = value.trim().to_ascii_lowercase();
            let inherited_value = parent.and_then(|p| p.get(&name)).map(str::to_string);
            let resolved = match keyword.as_str() {
                "inherit" => inherited_value,
                "initial" => None,
                "unset" => {
                    if is_inherited(&name) {
                        inherited_value
                    } else {
                        None
                    }
                }
                _ => {
                    let value = substitute_vars(&value, &computed);
                    if name == "font-size" {
                        Some(
                            resolve_font_size(&value, parent_font_px, root_font_px)
                                .map(format_px)
                                .unwrap_or(value),
                        )
                    } else {
                        Some(value)
                    }
                }
            };
            match resolved {
                Some(value) => {
                    computed.properties.insert(name, value);
                }
                None => {
                    computed.properties.remove(&name);
                }
            }
        }
        computed
    }
}

fn matching_declarations<'a>(
    rules: &'a [RuleEntry],
    element: &NodeDataRef<ElementData>,
) -> impl Iterator<Item = &'a Declaration> {
    let mut matched: Vec<&RuleEntry> = rules
        .iter()
        .filter(|rule| rule.selector.matches(element))
        .collect();
    matched.sort_by(|a, b| (a.specificity, a.order).cmp(&(b.specificity, b.order)));
    matched.into_iter().flat_map(|rule| rule.declarations.iter())
}

fn declarations_from_block(block: &DeclarationBlock) -> (Vec<Declaration>, Vec<Declaration>) {
    let normal = block.declarations.iter().flat_map(expand_property).collect();
    let important = block
        .important_declarations
        .iter()
        .flat_map(expand_property)
        .collect();
    (normal, important)
}

fn css_string<T: ToCss>(value: &T) -> Option<String> {
    value.to_css_string(PrinterOptions::default()).ok()
}

/// Splits shorthands the checks read longhands of; everything else keeps its
/// declared name.
fn expand_property(property: &Property) -> Vec<Declaration> {
    if let Property::Font(font) = property {
        return expand_font(font);
    }
    let name = property.property_id().name().to_ascii_lowercase();
    match property.value_to_css_string(PrinterOptions::default()) {
        Ok(value) => vec![Declaration { name, value }],
        Err(_) => Vec::new(),
    }
}

fn expand_font(font: &Font) -> Vec<Declaration> {
    let family = font
        .family
        .iter()
        .filter_map(css_string)
        .collect::<Vec<_>>()
        .join(", ");
    [
        ("font-style", css_string(&font.style)),
        ("font-weight", css_string(&font.weight)),
        ("font-stretch", css_string(&font.stretch)),
        ("font-variant-caps", css_string(&font.variant_caps)),
        ("font-size", css_string(&font.size)),
        ("line-height", css_string(&font.line_height)),
        ("font-family", Some(family)),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .filter(|v| !v.is_empty())
            .map(|value| Declaration {
                name: name.to_string(),
                value,
            })
    })
    .collect()
}

fn parse_inline_style(raw: &str) -> (Vec<Declaration>, Vec<Declaration>) {
    match StyleAttribute::parse(raw, ParserOptions::default()) {
        Ok(attr) => declarations_from_block(&attr.declarations),
        Err(_) => (Vec::new(), Vec::new()),
    }
}

fn substitute_vars(value: &str, style: &ComputedStyle) -> String {
    let mut out = value.to_string();
    // Bounded so a self-referencing custom property cannot loop.
    for _ in 0..8 {
        let Some(start) = out.find("var(") else {
            break;
        };
        let Some(end) = matching_paren(&out, start + 3) else {
            break;
        };
        let inner = &out[start + 4..end];
        let (name, fallback) = match inner.split_once(',') {
            Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
            None => (inner.trim(), None),
        };
        let replacement = style
            .get(name)
            .map(str::to_string)
            .or_else(|| fallback.map(str::to_string))
            .unwrap_or_default();
        out.replace_range(start..=end, replacement.trim());
    }
    out
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices().skip_while(|(idx, _)| *idx < open) {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_px(raw: &str) -> Option<f32> {
    raw.trim().strip_suffix("px")?.trim().parse::<f32>().ok()
}

fn format_px(px: f32) -> String {
    let rounded = (px * 1000.0).round() / 1000.0;
    format!("{rounded}px")
}

/// Resolves a `font-size` value to pixels against the parent and root sizes.
fn resolve_font_size(raw: &str, parent_px: f32, root_px: f32) -> Option<f32> {
    let value = raw.trim().to_ascii_lowercase();
    let keyword = match value.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "xxx-large" => Some(48.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }
    let number = |suffix: &str| -> Option<f32> {
        value.strip_suffix(suffix)?.trim().parse::<f32>().ok()
    };
    if let Some(rem) = number("rem") {
        return Some(rem * root_px);
    }
    if let Some(em) = number("em") {
        return Some(em * parent_px);
    }
    if let Some(pct) = number("%") {
        return Some(pct / 100.0 * parent_px);
    }
    if let Some(px) = number("px") {
        return Some(px);
    }
    if let Some(pt) = number("pt") {
        return Some(pt * 96.0 / 72.0);
    }
    None
}

fn media_list_matches(list: &MediaList, viewport: Viewport) -> bool {
    if list.media_queries.is_empty() {
        return true;
    }
    list.media_queries
        .iter()
        .any(|query| media_query_matches(query, viewport).unwrap_or(false))
}

fn media_query_matches(query: &MediaQuery, viewport: Viewport) -> Option<bool> {
    if !matches!(query.media_type, MediaType::All | MediaType::Screen) {
        return Some(matches!(query.qualifier, Some(Qualifier::Not)));
    }
    let condition_matches = match &query.condition {
        Some(condition) => media_condition_matches(condition, viewport)?,
        None => true,
    };
    Some(match query.qualifier {
        Some(Qualifier::Not) => !condition_matches,
        _ => condition_matches,
    })
}

fn media_condition_matches(condition: &MediaCondition, viewport: Viewport) -> Option<bool> {
    match condition {
        MediaCondition::Feature(feature) => media_feature_matches(feature, viewport),
        MediaCondition::Not(inner) => media_condition_matches(inner, viewport).map(|v| !v),
        MediaCondition::Operation {
            operator,
            conditions,
        } => {
            let mut results = Vec::with_capacity(conditions.len());
            for cond in conditions {
                results.push(media_condition_matches(cond, viewport)?);
            }
            Some(match operator {
                Operator::And => results.iter().all(|v| *v),
                Operator::Or => results.iter().any(|v| *v),
            })
        }
        MediaCondition::Unknown(_) => None,
    }
}

fn media_feature_matches(feature: &MediaFeature, viewport: Viewport) -> Option<bool> {
    match feature {
        MediaFeature::Plain { name, value } => {
            media_feature_compare(name, MediaFeatureComparison::Equal, value, viewport)
        }
        MediaFeature::Range {
            name,
            operator,
            value,
        } => media_feature_compare(name, *operator, value, viewport),
        MediaFeature::Interval {
            name,
            start,
            start_operator,
            end,
            end_operator,
        } => {
            let left = media_feature_compare(name, *start_operator, start, viewport)?;
            let right = media_feature_compare(name, *end_operator, end, viewport)?;
            Some(left && right)
        }
        MediaFeature::Boolean { .. } => None,
    }
}

fn media_feature_compare(
    name: &MediaFeatureName<MediaFeatureId>,
    operator: MediaFeatureComparison,
    value: &MediaFeatureValue,
    viewport: Viewport,
) -> Option<bool> {
    let target = match name {
        MediaFeatureName::Standard(id) => match id {
            MediaFeatureId::Width | MediaFeatureId::DeviceWidth => viewport.width,
            MediaFeatureId::Height | MediaFeatureId::DeviceHeight => viewport.height,
            _ => return None,
        },
        _ => return None,
    };
    let rhs = match value {
        MediaFeatureValue::Length(length) => length.to_px(),
        _ => None,
    }?;
    Some(match operator {
        MediaFeatureComparison::GreaterThan => target > rhs,
        MediaFeatureComparison::GreaterThanEqual => target >= rhs,
        MediaFeatureComparison::LessThan => target < rhs,
        MediaFeatureComparison::LessThanEqual => target <= rhs,
        MediaFeatureComparison::Equal => target == rhs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchiki::traits::TendrilSink;

    fn style_of(html: &str, css: &str, selector: &str) -> ComputedStyle {
        let doc = kuchiki::parse_html().one(html);
        let resolver = StyleResolver::from_css(css);
        let target = doc.select_first(selector).expect("target element");
        let mut chain: Vec<NodeDataRef<ElementData>> = target
            .as_node()
            .ancestors()
            .filter_map(|node| node.into_element_ref())
            .collect();
        chain.reverse();
        chain.push(target);
        let mut style: Option<ComputedStyle> = None;
        for element in &chain {
            style = Some(resolver.compute_style(element, style.as_ref(), DEFAULT_FONT_SIZE_PX));
        }
        style.expect("computed style")
    }

    #[test]
    fn later_rule_wins_at_equal_specificity() {
        let style = style_of("<p>x</p>", "p { color: blue; } p { color: red; }", "p");
        assert_eq!(style.get("color"), Some("red"));
    }

    #[test]
    fn class_beats_type_and_id_beats_class() {
        let css = "#only { color: green; } .note { color: #123456; } p { color: red; }";
        let by_class = style_of("<p class=\"note\">x</p>", css, "p");
        assert_eq!(by_class.get("color"), Some("#123456"));
        let by_id = style_of("<p class=\"note\" id=\"only\">x</p>", css, "p");
        assert_eq!(by_id.get("color"), Some("green"));
    }

    #[test]
    fn important_overrides_specificity() {
        let css = "p.note { color: #123456; } p { color: red !important; }";
        let style = style_of("<p class=\"note\">x</p>", css, "p");
        assert_eq!(style.get("color"), Some("red"));
    }

    #[test]
    fn inline_style_beats_rules_but_not_important() {
        let css = "p { color: #123456; line-height: 2 !important; }";
        let style = style_of(
            "<p style=\"color: red; line-height: 1\">x</p>",
            css,
            "p",
        );
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("line-height"), Some("2"));
    }

    #[test]
    fn inherited_properties_flow_to_descendants() {
        let css = "body { font-size: 16px; line-height: 1.5; max-height: 10px; }";
        let style = style_of("<body><p><a href=\"#\">x</a></p></body>", css, "a");
        assert_eq!(style.get("font-size"), Some("16px"));
        assert_eq!(style.get("line-height"), Some("1.5"));
        assert_eq!(style.get("max-height"), None, "max-height is not inherited");
    }

    #[test]
    fn inherit_initial_and_unset_keywords() {
        let css = "div { color: red; } p { color: #123456; } p.i { color: inherit; } p.u { color: unset; } p.n { color: initial; }";
        let html = "<div><p class=\"i\">1</p><p class=\"u\">2</p><p class=\"n\">3</p></div>";
        assert_eq!(style_of(html, css, "p.i").get("color"), Some("red"));
        assert_eq!(style_of(html, css, "p.u").get("color"), Some("red"));
        assert_eq!(style_of(html, css, "p.n").get("color"), None);
    }

    #[test]
    fn relative_font_sizes_resolve_to_px() {
        let css = "html { font-size: 100%; } body { font-size: 1em; } p { font-size: 1.5rem; } small { font-size: 50%; }";
        let html = "<body><p>x <small>y</small></p></body>";
        assert_eq!(style_of(html, css, "body").get("font-size"), Some("16px"));
        assert_eq!(style_of(html, css, "p").get("font-size"), Some("24px"));
        assert_eq!(style_of(html, css, "small").get("font-size"), Some("12px"));
    }

    #[test]
    fn font_shorthand_expands_to_longhands() {
        let css = "body { font: 16px/1.5 Arial, sans-serif; }";
        let style = style_of("<body>x</body>", css, "body");
        assert_eq!(style.get("font-size"), Some("16px"));
        assert_eq!(style.get("line-height"), Some("1.5"));
        assert_eq!(style.get("font-family"), Some("Arial, sans-serif"));
    }

    #[test]
    fn custom_properties_substitute_through_var() {
        let css = ":root { --accent: #c00; } li { color: var(--accent); } p { color: var(--missing, red); }";
        let html = "<body><ul><li>x</li></ul><p>y</p></body>";
        let li = style_of(html, css, "li");
        assert!(li.get("color").is_some_and(|c| !c.contains("var(")), "{li:?}");
        assert_eq!(style_of(html, css, "p").get("color"), Some("red"));
    }

    #[test]
    fn media_queries_follow_the_screen_viewport() {
        let css = "p { line-height: 1.5; } @media print { p { line-height: 3; } } @media (max-width: 600px) { p { line-height: 2; } } @media screen and (min-width: 1000px) { p { color: red; } }";
        let style = style_of("<p>x</p>", css, "p");
        assert_eq!(style.get("line-height"), Some("1.5"));
        assert_eq!(style.get("color"), Some("red"));
    }

    #[test]
    fn unsupported_selectors_do_not_drop_the_rest_of_the_list() {
        let resolver = StyleResolver::from_css("p::before, li { color: red; }");
        assert_eq!(resolver.rule_count(), 1);
        let style = style_of("<ul><li>x</li></ul>", "p::before, li { color: red; }", "li");
        assert_eq!(style.get("color"), Some("red"));
    }

    #[test]
    fn style_attribute_omits_custom_properties() {
        let style = style_of(
            "<p>x</p>",
            "p { --gap: 4px; max-height: 400px; color: red; }",
            "p",
        );
        assert_eq!(style.to_style_attribute(), "color: red; max-height: 400px");
    }
}
