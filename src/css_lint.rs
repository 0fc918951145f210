use crate::lint::{LintReport, LintViolation};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::error::{Error, ParserError};
use lightningcss::properties::custom::CustomPropertyName;
use lightningcss::properties::Property;
use lightningcss::rules::{CssRule, CssRuleList, Location};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Lints a stylesheet with the default rule set.
///
/// Errors: syntax errors, unknown properties, invalid values for known
/// properties. Warnings: empty rules, duplicate declarations, `!important`.
pub fn lint_css(css: &str) -> LintReport {
    let warnings: Arc<RwLock<Vec<Error<ParserError>>>> = Arc::new(RwLock::new(Vec::new()));
    let options = ParserOptions {
        error_recovery: true,
        warnings: Some(warnings.clone()),
        ..ParserOptions::default()
    };
    let mut violations = Vec::new();
    match StyleSheet::parse(css, options) {
        Ok(sheet) => lint_rules(&sheet.rules, &mut violations),
        Err(err) => violations.push(violation_from_error(&err)),
    }
    if let Ok(collected) = warnings.read() {
        for warning in collected.iter() {
            violations.push(violation_from_error(warning));
        }
    }
    let mut report = LintReport { violations };
    report.sort();
    report
}

fn violation_from_error(err: &Error<ParserError>) -> LintViolation {
    let message = err.kind.to_string();
    match &err.loc {
        Some(loc) => LintViolation::error("errors", u64::from(loc.line) + 1, message)
            .at_column(loc.column),
        None => LintViolation::error("errors", 1, message),
    }
}

fn lint_rules(rules: &CssRuleList, out: &mut Vec<LintViolation>) {
    for rule in &rules.0 {
        match rule {
            CssRule::Style(style) => lint_declarations(&style.declarations, &style.loc, out),
            CssRule::Media(media) => lint_rules(&media.rules, out),
            CssRule::Supports(supports) => lint_rules(&supports.rules, out),
            _ => {}
        }
    }
}

fn lint_declarations(block: &DeclarationBlock, loc: &Location, out: &mut Vec<LintViolation>) {
    let line = u64::from(loc.line) + 1;
    let column = loc.column;
    if block.declarations.is_empty() && block.important_declarations.is_empty() {
        out.push(LintViolation::warning("empty-rules", line, "rule is empty").at_column(column));
        return;
    }

    let mut seen: HashSet<String> = HashSet::new();
    for property in block.declarations.iter() {
        lint_property(property, line, column, &mut seen, out);
    }
    for property in block.important_declarations.iter() {
        let name = property.property_id().name().to_string();
        out.push(
            LintViolation::warning(
                "important",
                line,
                format!("`{name}` uses !important"),
            )
            .at_column(column),
        );
        lint_property(property, line, column, &mut seen, out);
    }
}

fn lint_property(
    property: &Property,
    line: u64,
    column: u32,
    seen: &mut HashSet<String>,
    out: &mut Vec<LintViolation>,
) {
    let name = property.property_id().name().to_string();
    if !seen.insert(name.clone()) {
        out.push(
            LintViolation::warning(
                "duplicate-properties",
                line,
                format!("`{name}` is declared more than once in this rule"),
            )
            .at_column(column),
        );
    }

    match property {
        Property::Custom(custom) => {
            let CustomPropertyName::Unknown(raw) = &custom.name else {
                return;
            };
            let raw: &str = raw;
            let lower = raw.to_ascii_lowercase();
            if lower.starts_with('-') || is_standard_property(&lower) {
                return;
            }
            out.push(
                LintViolation::error(
                    "known-properties",
                    line,
                    format!("unknown property `{lower}`"),
                )
                .at_column(column),
            );
        }
        Property::Unparsed(_) => {
            let value = property
                .value_to_css_string(PrinterOptions::default())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if value.contains("var(") || value.contains("env(") || is_wide_keyword(&value) {
                return;
            }
            out.push(
                LintViolation::error(
                    "known-properties",
                    line,
                    format!("invalid value `{value}` for `{name}`"),
                )
                .at_column(column),
            );
        }
        _ => {}
    }
}

fn is_wide_keyword(value: &str) -> bool {
    matches!(
        value.trim(),
        "inherit" | "initial" | "unset" | "revert" | "revert-layer"
    )
}

/// Whether `name` is a real CSS property, whether or not the parser models it.
fn is_standard_property(name: &str) -> bool {
    STANDARD_PROPERTIES.binary_search(&name).is_ok()
}

/// Standard CSS property names, sorted for binary search.
const STANDARD_PROPERTIES: [&str; 480] = [
    "accent-color", "align-content", "align-items", "align-self", "alignment-baseline", "all",
    "anchor-name", "anchor-scope", "animation", "animation-composition", "animation-delay",
    "animation-direction", "animation-duration", "animation-fill-mode",
    "animation-iteration-count", "animation-name", "animation-play-state", "animation-range",
    "animation-range-end", "animation-range-start", "animation-timeline",
    "animation-timing-function", "appearance", "aspect-ratio", "backdrop-filter",
    "backface-visibility", "background", "background-attachment", "background-blend-mode",
    "background-clip", "background-color", "background-image", "background-origin",
    "background-position", "background-position-x", "background-position-y",
    "background-repeat", "background-size", "baseline-shift", "baseline-source", "block-size",
    "border", "border-block", "border-block-color", "border-block-end",
    "border-block-end-color", "border-block-end-style", "border-block-end-width",
    "border-block-start", "border-block-start-color", "border-block-start-style",
    "border-block-start-width", "border-block-style", "border-block-width", "border-bottom",
    "border-bottom-color", "border-bottom-left-radius", "border-bottom-right-radius",
    "border-bottom-style", "border-bottom-width", "border-collapse", "border-color",
    "border-end-end-radius", "border-end-start-radius", "border-image", "border-image-outset",
    "border-image-repeat", "border-image-slice", "border-image-source", "border-image-width",
    "border-inline", "border-inline-color", "border-inline-end", "border-inline-end-color",
    "border-inline-end-style", "border-inline-end-width", "border-inline-start",
    "border-inline-start-color", "border-inline-start-style", "border-inline-start-width",
    "border-inline-style", "border-inline-width", "border-left", "border-left-color",
    "border-left-style", "border-left-width", "border-radius", "border-right",
    "border-right-color", "border-right-style", "border-right-width", "border-spacing",
    "border-start-end-radius", "border-start-start-radius", "border-style", "border-top",
    "border-top-color", "border-top-left-radius", "border-top-right-radius", "border-top-style",
    "border-top-width", "border-width", "bottom", "box-decoration-break", "box-shadow",
    "box-sizing", "break-after", "break-before", "break-inside", "caption-side", "caret-color",
    "clear", "clip", "clip-path", "clip-rule", "color", "color-interpolation",
    "color-interpolation-filters", "color-scheme", "column-count", "column-fill", "column-gap",
    "column-rule", "column-rule-color", "column-rule-style", "column-rule-width", "column-span",
    "column-width", "columns", "contain", "contain-intrinsic-block-size",
    "contain-intrinsic-height", "contain-intrinsic-inline-size", "contain-intrinsic-size",
    "contain-intrinsic-width", "container", "container-name", "container-type", "content",
    "content-visibility", "counter-increment", "counter-reset", "counter-set", "cursor", "cx",
    "cy", "d", "direction", "display", "dominant-baseline", "empty-cells", "field-sizing",
    "fill", "fill-opacity", "fill-rule", "filter", "flex", "flex-basis", "flex-direction",
    "flex-flow", "flex-grow", "flex-shrink", "flex-wrap", "float", "flood-color",
    "flood-opacity", "font", "font-family", "font-feature-settings", "font-kerning",
    "font-language-override", "font-optical-sizing", "font-palette", "font-size",
    "font-size-adjust", "font-stretch", "font-style", "font-synthesis",
    "font-synthesis-small-caps", "font-synthesis-style", "font-synthesis-weight",
    "font-variant", "font-variant-alternates", "font-variant-caps", "font-variant-east-asian",
    "font-variant-emoji", "font-variant-ligatures", "font-variant-numeric",
    "font-variant-position", "font-variation-settings", "font-weight", "font-width",
    "forced-color-adjust", "gap", "grid", "grid-area", "grid-auto-columns", "grid-auto-flow",
    "grid-auto-rows", "grid-column", "grid-column-end", "grid-column-gap", "grid-column-start",
    "grid-gap", "grid-row", "grid-row-end", "grid-row-gap", "grid-row-start", "grid-template",
    "grid-template-areas", "grid-template-columns", "grid-template-rows", "hanging-punctuation",
    "height", "hyphenate-character", "hyphenate-limit-chars", "hyphens", "image-orientation",
    "image-rendering", "ime-mode", "initial-letter", "inline-size", "inset", "inset-block",
    "inset-block-end", "inset-block-start", "inset-inline", "inset-inline-end",
    "inset-inline-start", "interpolate-size", "isolation", "justify-content", "justify-items",
    "justify-self", "left", "letter-spacing", "lighting-color", "line-break", "line-clamp",
    "line-height", "line-height-step", "list-style", "list-style-image", "list-style-position",
    "list-style-type", "margin", "margin-block", "margin-block-end", "margin-block-start",
    "margin-bottom", "margin-inline", "margin-inline-end", "margin-inline-start", "margin-left",
    "margin-right", "margin-top", "margin-trim", "marker", "marker-end", "marker-mid",
    "marker-start", "mask", "mask-border", "mask-border-mode", "mask-border-outset",
    "mask-border-repeat", "mask-border-slice", "mask-border-source", "mask-border-width",
    "mask-clip", "mask-composite", "mask-image", "mask-mode", "mask-origin", "mask-position",
    "mask-repeat", "mask-size", "mask-type", "math-depth", "math-shift", "math-style",
    "max-block-size", "max-height", "max-inline-size", "max-width", "min-block-size",
    "min-height", "min-inline-size", "min-width", "mix-blend-mode", "object-fit",
    "object-position", "offset", "offset-anchor", "offset-distance", "offset-path",
    "offset-position", "offset-rotate", "opacity", "order", "orphans", "outline",
    "outline-color", "outline-offset", "outline-style", "outline-width", "overflow",
    "overflow-anchor", "overflow-block", "overflow-clip-margin", "overflow-inline",
    "overflow-wrap", "overflow-x", "overflow-y", "overscroll-behavior",
    "overscroll-behavior-block", "overscroll-behavior-inline", "overscroll-behavior-x",
    "overscroll-behavior-y", "padding", "padding-block", "padding-block-end",
    "padding-block-start", "padding-bottom", "padding-inline", "padding-inline-end",
    "padding-inline-start", "padding-left", "padding-right", "padding-top", "page",
    "page-break-after", "page-break-before", "page-break-inside", "paint-order", "perspective",
    "perspective-origin", "place-content", "place-items", "place-self", "pointer-events",
    "position", "position-anchor", "position-area", "position-try", "position-try-fallbacks",
    "position-try-order", "position-visibility", "print-color-adjust", "quotes", "r", "resize",
    "right", "rotate", "row-gap", "ruby-align", "ruby-position", "rx", "ry", "scale",
    "scroll-behavior", "scroll-margin", "scroll-margin-block", "scroll-margin-block-end",
    "scroll-margin-block-start", "scroll-margin-bottom", "scroll-margin-inline",
    "scroll-margin-inline-end", "scroll-margin-inline-start", "scroll-margin-left",
    "scroll-margin-right", "scroll-margin-top", "scroll-padding", "scroll-padding-block",
    "scroll-padding-block-end", "scroll-padding-block-start", "scroll-padding-bottom",
    "scroll-padding-inline", "scroll-padding-inline-end", "scroll-padding-inline-start",
    "scroll-padding-left", "scroll-padding-right", "scroll-padding-top", "scroll-snap-align",
    "scroll-snap-stop", "scroll-snap-type", "scroll-timeline", "scroll-timeline-axis",
    "scroll-timeline-name", "scrollbar-color", "scrollbar-gutter", "scrollbar-width",
    "shape-image-threshold", "shape-margin", "shape-outside", "shape-rendering", "speak",
    "speak-as", "stop-color", "stop-opacity", "stroke", "stroke-dasharray", "stroke-dashoffset",
    "stroke-linecap", "stroke-linejoin", "stroke-miterlimit", "stroke-opacity", "stroke-width",
    "tab-size", "table-layout", "text-align", "text-align-last", "text-anchor", "text-box",
    "text-box-edge", "text-box-trim", "text-combine-upright", "text-decoration",
    "text-decoration-color", "text-decoration-line", "text-decoration-skip",
    "text-decoration-skip-ink", "text-decoration-style", "text-decoration-thickness",
    "text-emphasis", "text-emphasis-color", "text-emphasis-position", "text-emphasis-style",
    "text-indent", "text-justify", "text-orientation", "text-overflow", "text-rendering",
    "text-shadow", "text-size-adjust", "text-spacing-trim", "text-transform",
    "text-underline-offset", "text-underline-position", "text-wrap", "text-wrap-mode",
    "text-wrap-style", "timeline-scope", "top", "touch-action", "transform", "transform-box",
    "transform-origin", "transform-style", "transition", "transition-behavior",
    "transition-delay", "transition-duration", "transition-property",
    "transition-timing-function", "translate", "unicode-bidi", "user-select", "vector-effect",
    "vertical-align", "view-timeline", "view-timeline-axis", "view-timeline-inset",
    "view-timeline-name", "view-transition-class", "view-transition-name", "visibility",
    "white-space", "white-space-collapse", "widows", "width", "will-change", "word-break",
    "word-spacing", "word-wrap", "writing-mode", "x", "y", "z-index", "zoom",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::Severity;

    const VALID: &str = "body {\n  font-size: 16px;\n  font-family: \"Helvetica Neue\", Helvetica, Arial, sans-serif;\n}\n\np {\n  line-height: 1.5;\n}\n\nimg {\n  max-height: 400px;\n}\n\n.hot {\n  color: #c00;\n}\n";

    #[test]
    fn valid_stylesheet_is_clean() {
        let report = lint_css(VALID);
        assert!(report.violations.is_empty(), "{:?}", report.violations);
    }

    #[test]
    fn unknown_property_is_an_error() {
        let report = lint_css("p {\n  colr: red;\n}\n");
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1, "{:?}", report.violations);
        assert_eq!(errors[0].rule, "known-properties");
        assert!(errors[0].message.contains("colr"));
    }

    #[test]
    fn unmodelled_but_valid_properties_are_accepted() {
        let css = "table { border-collapse: collapse; }\n\
                   article {\n  column-count: 2;\n  column-gap: 2em;\n  column-rule: 1px solid #ccc;\n}\n\
                   h2 {\n  font-variant: small-caps;\n  text-decoration-skip-ink: none;\n  hyphens: auto;\n}\n\
                   li { list-style-position: inside; }\n";
        let report = lint_css(css);
        assert_eq!(report.error_count(), 0, "{:?}", report.violations);
    }

    #[test]
    fn property_index_is_sorted_and_unique() {
        assert!(STANDARD_PROPERTIES.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(is_standard_property("font-variant"));
        assert!(!is_standard_property("colr"));
    }

    #[test]
    fn typical_student_stylesheet_is_clean_of_errors() {
        let css = r#"/* reset */
html, body {
  margin: 0;
  padding: 0;
}

* {
  box-sizing: border-box;
}

body {
  font-size: 16px;
  font-family: "Helvetica Neue", Helvetica, Arial, sans-serif;
  background-color: #fafafa;
  color: #333;
}

nav ul {
  display: flex;
  justify-content: space-between;
  list-style-type: none;
}

nav a:hover,
nav a:focus {
  text-decoration: underline;
  font-variant: small-caps;
}

p {
  line-height: 1.5;
  margin: 0 auto 1em;
  max-width: 40em;
}

img {
  max-height: 400px;
  border-radius: 4px;
}

.highlight {
  color: #c00;
  font-weight: bold;
}

@media (max-width: 600px) {
  main {
    column-count: 1;
    padding: 0 1rem;
  }
}
"#;
        let report = lint_css(css);
        assert_eq!(report.error_count(), 0, "{:?}", report.violations);
        assert_eq!(report.warnings().count(), 0, "{:?}", report.violations);
    }

    #[test]
    fn malformed_declaration_is_an_error() {
        let report = lint_css("p { color red; }\n");
        assert!(report.error_count() >= 1, "{:?}", report.violations);
    }

    #[test]
    fn empty_rule_is_only_a_warning() {
        let report = lint_css("p { color: red; }\n\nh2 {}\n");
        assert_eq!(report.error_count(), 0);
        let warning = report.warnings().next().expect("empty rule warning");
        assert_eq!(warning.rule, "empty-rules");
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.line, 3);
    }

    #[test]
    fn duplicates_and_important_are_warnings() {
        let report = lint_css("p { color: red; color: blue; }\nh1 { margin: 0 !important; }");
        assert_eq!(report.error_count(), 0, "{:?}", report.violations);
        assert!(report.has_rule("duplicate-properties"));
        assert!(report.has_rule("important"));
    }

    #[test]
    fn custom_properties_and_var_values_are_accepted() {
        let report = lint_css(":root { --accent: #c00; }\n.hot { color: var(--accent); }");
        assert_eq!(report.error_count(), 0, "{:?}", report.violations);
    }

    #[test]
    fn wide_keywords_are_valid_values() {
        let report = lint_css("a { color: inherit; }\nli { line-height: unset; }");
        assert_eq!(report.error_count(), 0, "{:?}", report.violations);
    }

    #[test]
    fn rules_inside_media_queries_are_linted() {
        let report = lint_css("@media screen and (min-width: 600px) {\n  p { colr: red; }\n}\n");
        assert!(report.has_rule("known-properties"));
    }
}
