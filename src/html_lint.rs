use crate::lint::{LintReport, LintViolation};
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Doctype, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Naming conventions accepted by `attr-name-style` and `id-class-style`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    Lowercase,
    Dash,
    Underscore,
    Camel,
}

impl NameStyle {
    fn pattern(self) -> &'static Regex {
        static LOWERCASE: OnceLock<Regex> = OnceLock::new();
        static DASH: OnceLock<Regex> = OnceLock::new();
        static UNDERSCORE: OnceLock<Regex> = OnceLock::new();
        static CAMEL: OnceLock<Regex> = OnceLock::new();
        let (cell, raw) = match self {
            NameStyle::Lowercase => (&LOWERCASE, r"^[a-z][a-z\d]*$"),
            NameStyle::Dash => (&DASH, r"^[a-z][a-z\d]*(-[a-z\d]+)*$"),
            NameStyle::Underscore => (&UNDERSCORE, r"^[a-z][a-z\d]*(_[a-z\d]+)*$"),
            NameStyle::Camel => (&CAMEL, r"^[a-zA-Z][a-zA-Z\d]*$"),
        };
        cell.get_or_init(|| Regex::new(raw).expect("static name style pattern"))
    }

    pub fn matches(self, name: &str) -> bool {
        self.pattern().is_match(name)
    }

    fn as_str(self) -> &'static str {
        match self {
            NameStyle::Lowercase => "lowercase",
            NameStyle::Dash => "dash",
            NameStyle::Underscore => "underscore",
            NameStyle::Camel => "camel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces,
    Tabs,
    /// Either, as long as one line does not mix both.
    NonMixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEndStyle {
    Lf,
    CrLf,
    Cr,
}

impl LineEndStyle {
    fn terminator(self) -> &'static str {
        match self {
            LineEndStyle::Lf => "\n",
            LineEndStyle::CrLf => "\r\n",
            LineEndStyle::Cr => "\r",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LineEndStyle::Lf => "lf",
            LineEndStyle::CrLf => "crlf",
            LineEndStyle::Cr => "cr",
        }
    }
}

/// HTML lint rule configuration. A `None`/`false` rule is off.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlLintOptions {
    pub attr_bans: Vec<String>,
    pub tag_bans: Vec<String>,
    pub attr_name_style: Option<NameStyle>,
    pub id_class_style: Option<NameStyle>,
    pub indent_style: Option<IndentStyle>,
    pub indent_width: Option<usize>,
    pub line_end_style: Option<LineEndStyle>,
    pub line_no_trailing_whitespace: bool,
    pub doctype_first: bool,
    pub doctype_html5: bool,
    pub html_req_lang: bool,
    pub img_req_alt: bool,
    pub img_req_src: bool,
    pub id_no_dup: bool,
    pub tag_close: bool,
    pub title_no_dup: bool,
}

impl Default for HtmlLintOptions {
    fn default() -> Self {
        Self {
            attr_bans: [
                "align",
                "background",
                "bgcolor",
                "border",
                "frameborder",
                "longdesc",
                "marginwidth",
                "marginheight",
                "scrolling",
                "style",
                "width",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tag_bans: ["style", "b", "i"].iter().map(|s| s.to_string()).collect(),
            attr_name_style: Some(NameStyle::Dash),
            id_class_style: Some(NameStyle::Underscore),
            indent_style: Some(IndentStyle::NonMixed),
            indent_width: Some(4),
            line_end_style: Some(LineEndStyle::Lf),
            line_no_trailing_whitespace: true,
            doctype_first: false,
            doctype_html5: false,
            html_req_lang: false,
            img_req_alt: true,
            img_req_src: true,
            id_no_dup: true,
            tag_close: false,
            title_no_dup: true,
        }
    }
}

impl HtmlLintOptions {
    /// The grading configuration: presentational attributes banned, html5
    /// doctype and `lang` required, formatting rules off, `alt` left to the
    /// structural checks.
    pub fn rubric() -> Self {
        Self {
            attr_bans: [
                "align",
                "background",
                "bgcolor",
                "border",
                "frameborder",
                "marginwidth",
                "marginheight",
                "scrolling",
                "style",
                "width",
                "height",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            attr_name_style: None,
            id_class_style: None,
            indent_style: None,
            indent_width: None,
            line_end_style: None,
            line_no_trailing_whitespace: false,
            doctype_first: true,
            doctype_html5: true,
            html_req_lang: true,
            img_req_alt: false,
            ..Self::default()
        }
    }
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Elements whose end tag HTML lets the author leave out.
const OPTIONAL_END: [&str; 17] = [
    "html", "head", "body", "p", "li", "dt", "dd", "option", "optgroup", "tr", "td", "th",
    "thead", "tbody", "tfoot", "colgroup", "caption",
];

/// Start tags that close an open `<p>`.
const CLOSES_PARAGRAPH: [&str; 32] = [
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "search", "section", "table", "ul",
];

fn has_optional_end(name: &str) -> bool {
    OPTIONAL_END.contains(&name)
}

/// Whether a `next` start tag implicitly ends the open `open` element.
fn implicitly_closed_by(open: &str, next: &str) -> bool {
    match open {
        "p" => CLOSES_PARAGRAPH.contains(&next),
        "li" => next == "li",
        "dt" | "dd" => matches!(next, "dt" | "dd"),
        "option" => matches!(next, "option" | "optgroup"),
        "optgroup" => next == "optgroup",
        "td" | "th" => matches!(next, "td" | "th" | "tr" | "tbody" | "thead" | "tfoot"),
        "tr" => matches!(next, "tr" | "tbody" | "thead" | "tfoot"),
        "thead" | "tbody" | "tfoot" => matches!(next, "tbody" | "tfoot"),
        "colgroup" | "caption" => matches!(next, "colgroup" | "caption" | "thead" | "tbody" | "tfoot" | "tr"),
        "head" => next == "body",
        _ => false,
    }
}

pub fn lint_html(html: &str, options: &HtmlLintOptions) -> LintReport {
    let sink = LintSink::new(options);
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(html));
    let mut tokenizer = Tokenizer::new(
        sink,
        TokenizerOpts {
            exact_errors: true,
            ..TokenizerOpts::default()
        },
    );
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    let mut report = LintReport {
        violations: tokenizer.sink.violations,
    };
    lint_lines(html, options, &mut report.violations);
    report.sort();
    report
}

struct LintSink<'a> {
    options: &'a HtmlLintOptions,
    violations: Vec<LintViolation>,
    seen_content: bool,
    doctype_seen: bool,
    doctype_reported: bool,
    open: Vec<(String, u64)>,
    ids: HashMap<String, u64>,
    titles: usize,
}

impl<'a> LintSink<'a> {
    fn new(options: &'a HtmlLintOptions) -> Self {
        Self {
            options,
            violations: Vec::new(),
            seen_content: false,
            doctype_seen: false,
            doctype_reported: false,
            open: Vec::new(),
            ids: HashMap::new(),
            titles: 0,
        }
    }

    fn error(&mut self, rule: &'static str, line: u64, message: String) {
        self.violations.push(LintViolation::error(rule, line, message));
    }

    fn missing_doctype(&mut self, line: u64) {
        if self.options.doctype_first && !self.doctype_seen && !self.doctype_reported {
            self.doctype_reported = true;
            self.error(
                "doctype-first",
                line,
                "the document must start with a doctype".to_string(),
            );
        }
    }

    fn doctype(&mut self, doctype: &Doctype, line: u64) {
        if self.options.doctype_first && self.seen_content && !self.doctype_reported {
            self.doctype_reported = true;
            self.error(
                "doctype-first",
                line,
                "the doctype must come before any content".to_string(),
            );
        }
        self.doctype_seen = true;
        if self.options.doctype_html5 {
            let is_html = doctype
                .name
                .as_ref()
                .map(|name| name.eq_ignore_ascii_case("html"))
                .unwrap_or(false);
            let legacy_compat = doctype
                .system_id
                .as_ref()
                .map(|id| id.eq_ignore_ascii_case("about:legacy-compat"))
                .unwrap_or(true);
            if !is_html || doctype.public_id.is_some() || !legacy_compat {
                self.error(
                    "doctype-html5",
                    line,
                    "the doctype must be <!DOCTYPE html>".to_string(),
                );
            }
        }
    }

    fn start_tag(&mut self, tag: &Tag, line: u64) -> Option<RawKind> {
        self.missing_doctype(line);
        self.seen_content = true;
        let name = tag.name.to_string();

        if self.options.tag_bans.iter().any(|banned| banned == &name) {
            self.error("tag-bans", line, format!("tag <{name}> is banned"));
        }

        for attr in &tag.attrs {
            let attr_name: &str = &attr.name.local;
            if self.options.attr_bans.iter().any(|banned| banned == attr_name) {
                self.error(
                    "attr-bans",
                    line,
                    format!("attribute `{attr_name}` on <{name}> is banned"),
                );
            }
            if let Some(style) = self.options.attr_name_style {
                if !style.matches(attr_name) {
                    self.error(
                        "attr-name-style",
                        line,
                        format!("attribute `{attr_name}` is not {} style", style.as_str()),
                    );
                }
            }
            match attr_name {
                "id" => {
                    let id = attr.value.trim().to_string();
                    self.check_id_class_name(&id, line);
                    if self.options.id_no_dup {
                        if let Some(first) = self.ids.get(&id).copied() {
                            self.error(
                                "id-no-dup",
                                line,
                                format!("id `{id}` is already used on line {first}"),
                            );
                        } else {
                            self.ids.insert(id, line);
                        }
                    }
                }
                "class" => {
                    let classes: Vec<String> =
                        attr.value.split_whitespace().map(str::to_string).collect();
                    for class in classes {
                        self.check_id_class_name(&class, line);
                    }
                }
                _ => {}
            }
        }

        let attr_value = |wanted: &str| {
            tag.attrs
                .iter()
                .find(|attr| &*attr.name.local == wanted)
                .map(|attr| attr.value.trim().to_string())
        };
        match name.as_str() {
            "html" if self.options.html_req_lang => {
                if attr_value("lang").map(|lang| lang.is_empty()).unwrap_or(true) {
                    self.error(
                        "html-req-lang",
                        line,
                        "<html> must declare a lang attribute".to_string(),
                    );
                }
            }
            "img" => {
                if self.options.img_req_src && attr_value("src").map(|s| s.is_empty()).unwrap_or(true) {
                    self.error("img-req-src", line, "<img> must have a src".to_string());
                }
                if self.options.img_req_alt && attr_value("alt").is_none() {
                    self.error("img-req-alt", line, "<img> must have an alt".to_string());
                }
            }
            "title" => {
                self.titles += 1;
                if self.options.title_no_dup && self.titles > 1 {
                    self.error(
                        "title-no-dup",
                        line,
                        "the document has more than one <title>".to_string(),
                    );
                }
            }
            _ => {}
        }

        if self.options.tag_close {
            while self
                .open
                .last()
                .is_some_and(|(open, _)| implicitly_closed_by(open, &name))
            {
                self.open.pop();
            }
            if !is_void(&name) && !tag.self_closing {
                self.open.push((name.clone(), line));
            }
        }

        match name.as_str() {
            "title" | "textarea" => Some(RawKind::Rcdata),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
            "script" => Some(RawKind::ScriptData),
            _ => None,
        }
    }

    fn check_id_class_name(&mut self, value: &str, line: u64) {
        if let Some(style) = self.options.id_class_style {
            if !value.is_empty() && !style.matches(value) {
                self.error(
                    "id-class-style",
                    line,
                    format!("`{value}` is not {} style", style.as_str()),
                );
            }
        }
    }

    fn end_tag(&mut self, tag: &Tag, line: u64) {
        self.seen_content = true;
        if !self.options.tag_close {
            return;
        }
        let name: &str = &tag.name;
        let Some(pos) = self.open.iter().rposition(|(open, _)| open == name) else {
            if !is_void(name) {
                self.error(
                    "tag-close",
                    line,
                    format!("</{name}> has no matching start tag"),
                );
            }
            return;
        };
        let unclosed: Vec<(String, u64)> = self
            .open
            .drain(pos..)
            .skip(1)
            .filter(|(open, _)| !has_optional_end(open))
            .collect();
        for (open, opened_at) in unclosed.into_iter().rev() {
            self.error(
                "tag-close",
                opened_at,
                format!("<{open}> is not closed before </{name}>"),
            );
        }
    }

    fn end_of_input(&mut self, line: u64) {
        self.missing_doctype(line);
        if !self.options.tag_close {
            return;
        }
        let unclosed = std::mem::take(&mut self.open);
        for (open, opened_at) in unclosed
            .into_iter()
            .filter(|(open, _)| !has_optional_end(open))
        {
            self.error("tag-close", opened_at, format!("<{open}> is never closed"));
        }
    }
}

impl TokenSink for LintSink<'_> {
    type Handle = ();

    fn process_token(&mut self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::DoctypeToken(doctype) => self.doctype(&doctype, line_number),
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => {
                    if let Some(kind) = self.start_tag(&tag, line_number) {
                        return TokenSinkResult::RawData(kind);
                    }
                }
                TagKind::EndTag => self.end_tag(&tag, line_number),
            },
            Token::CharacterTokens(text) => {
                if !text.trim().is_empty() {
                    self.seen_content = true;
                }
            }
            Token::NullCharacterToken => self.seen_content = true,
            Token::CommentToken(_) => {}
            Token::EOFToken => self.end_of_input(line_number),
            Token::ParseError(message) => {
                self.error("parse-error", line_number, message.into_owned());
            }
        }
        TokenSinkResult::Continue
    }
}

fn lint_lines(html: &str, options: &HtmlLintOptions, out: &mut Vec<LintViolation>) {
    let mut rest = html;
    let mut line_no: u64 = 0;
    while !rest.is_empty() {
        line_no += 1;
        let (line, terminator, tail) = split_line(rest);
        rest = tail;

        if let Some(style) = options.line_end_style {
            if !terminator.is_empty() && terminator != style.terminator() {
                out.push(LintViolation::error(
                    "line-end-style",
                    line_no,
                    format!("line ending is not {}", style.as_str()),
                ));
            }
        }

        if options.line_no_trailing_whitespace && line.ends_with([' ', '\t']) {
            out.push(LintViolation::error(
                "line-no-trailing-whitespace",
                line_no,
                "line has trailing whitespace".to_string(),
            ));
        }

        let indent: &str = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];
        if indent.is_empty() || indent.len() == line.len() {
            continue;
        }
        let has_tabs = indent.contains('\t');
        let has_spaces = indent.contains(' ');
        if let Some(style) = options.indent_style {
            let bad = match style {
                IndentStyle::Spaces => has_tabs,
                IndentStyle::Tabs => has_spaces,
                IndentStyle::NonMixed => has_tabs && has_spaces,
            };
            if bad {
                out.push(LintViolation::error(
                    "indent-style",
                    line_no,
                    "indentation mixes or uses the wrong whitespace".to_string(),
                ));
            }
        }
        if let Some(width) = options.indent_width {
            if width > 0 && !has_tabs && indent.len() % width != 0 {
                out.push(LintViolation::error(
                    "indent-width",
                    line_no,
                    format!("indentation of {} is not a multiple of {width}", indent.len()),
                ));
            }
        }
    }
}

fn split_line(input: &str) -> (&str, &str, &str) {
    match input.find(['\r', '\n']) {
        Some(idx) => {
            let term_len = if input[idx..].starts_with("\r\n") { 2 } else { 1 };
            (
                &input[..idx],
                &input[idx..idx + term_len],
                &input[idx + term_len..],
            )
        }
        None => (input, "", ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>About me</title>\n<link rel=\"stylesheet\" href=\"css/style.css\">\n</head>\n<body>\n<h1>Hi</h1>\n<img src=\"img/me.jpg\">\n<p>Text with <a href=\"https://example.com\">a link</a>.</p>\n<ul>\n<li>one</li>\n<li>two</li>\n<li class=\"hot\">three</li>\n</ul>\n</body>\n</html>\n";

    fn rubric_lint(html: &str) -> LintReport {
        lint_html(html, &HtmlLintOptions::rubric())
    }

    fn strict_lint(html: &str) -> LintReport {
        let options = HtmlLintOptions {
            tag_close: true,
            ..HtmlLintOptions::rubric()
        };
        lint_html(html, &options)
    }

    const OMITTED_END_TAGS: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Lists</title>\n<body>\n<h1>Lists</h1>\n<p>para\n<ul>\n<li>one\n<li>two\n<li>three\n</ul>\n<dl><dt>term<dd>meaning<dt>other<dd>more</dl>\n<table><tr><td>a<td>b<tr><td>c<td>d</table>\n<p>last\n";

    #[test]
    fn valid_page_has_no_errors_under_rubric() {
        let report = rubric_lint(VALID);
        assert_eq!(
            report.error_count(),
            0,
            "unexpected violations: {:?}",
            report.violations
        );
    }

    #[test]
    fn missing_doctype_is_reported() {
        let html = VALID.replacen("<!DOCTYPE html>\n", "", 1);
        let report = rubric_lint(&html);
        assert!(report.has_rule("doctype-first"), "{:?}", report.violations);
    }

    #[test]
    fn legacy_doctype_fails_html5_rule() {
        let html = VALID.replacen(
            "<!DOCTYPE html>",
            "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">",
            1,
        );
        let report = rubric_lint(&html);
        assert!(report.has_rule("doctype-html5"), "{:?}", report.violations);
    }

    #[test]
    fn missing_lang_is_reported() {
        let html = VALID.replacen("<html lang=\"en\">", "<html>", 1);
        assert!(rubric_lint(&html).has_rule("html-req-lang"));
    }

    #[test]
    fn inline_style_and_presentational_attributes_are_banned() {
        let html = VALID.replacen(
            "<img src=\"img/me.jpg\">",
            "<img src=\"img/me.jpg\" style=\"border: 0\" height=\"20\">",
            1,
        );
        let report = rubric_lint(&html);
        let bans: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.rule == "attr-bans")
            .collect();
        assert_eq!(bans.len(), 2, "{:?}", report.violations);
        assert_eq!(bans[0].line, 10);
    }

    #[test]
    fn missing_alt_is_ignored_by_rubric_but_not_by_default() {
        assert!(!rubric_lint(VALID).has_rule("img-req-alt"));
        let report = lint_html(VALID, &HtmlLintOptions::default());
        assert!(report.has_rule("img-req-alt"));
    }

    #[test]
    fn tag_close_is_off_unless_enabled() {
        assert!(!HtmlLintOptions::default().tag_close);
        assert!(!HtmlLintOptions::rubric().tag_close);
        let html = VALID.replacen("</h1>", "</h1></h2>", 1);
        assert!(!rubric_lint(&html).has_rule("tag-close"));
    }

    #[test]
    fn omitted_optional_end_tags_are_valid() {
        assert_eq!(rubric_lint(OMITTED_END_TAGS).error_count(), 0);
        let report = strict_lint(OMITTED_END_TAGS);
        assert_eq!(report.error_count(), 0, "{:?}", report.violations);
    }

    #[test]
    fn unclosed_element_is_reported_at_its_start_line() {
        let html = VALID.replacen("a link</a>", "a link", 1);
        let report = strict_lint(&html);
        let unclosed: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.rule == "tag-close")
            .collect();
        assert_eq!(unclosed.len(), 1, "{:?}", report.violations);
        assert_eq!(unclosed[0].line, 11);
    }

    #[test]
    fn stray_end_tag_is_reported() {
        let html = VALID.replacen("</h1>", "</h1></h2>", 1);
        assert!(strict_lint(&html).has_rule("tag-close"));
    }

    #[test]
    fn unclosed_div_is_reported_even_at_end_of_input() {
        let html = OMITTED_END_TAGS.replacen("<h1>", "<div><h1>", 1);
        let report = strict_lint(&html);
        let unclosed: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.rule == "tag-close")
            .collect();
        assert_eq!(unclosed.len(), 1, "{:?}", report.violations);
        assert!(unclosed[0].message.contains("<div>"));
    }

    #[test]
    fn script_content_is_not_tokenized_as_markup() {
        let html = VALID.replacen(
            "</body>",
            "<script>if (a <b && c) { x(); }</script>\n</body>",
            1,
        );
        let report = rubric_lint(&html);
        assert_eq!(report.error_count(), 0, "{:?}", report.violations);
    }

    #[test]
    fn duplicate_ids_and_titles_are_reported() {
        let html = VALID
            .replacen("<h1>", "<h1 id=\"top\">", 1)
            .replacen("<p>", "<p id=\"top\">", 1)
            .replacen("</title>", "</title><title>Again</title>", 1);
        let report = rubric_lint(&html);
        assert!(report.has_rule("id-no-dup"));
        assert!(report.has_rule("title-no-dup"));
    }

    #[test]
    fn duplicate_attribute_surfaces_as_parse_error() {
        let html = VALID.replacen("<h1>", "<h1 title=\"a\" title=\"b\">", 1);
        assert!(rubric_lint(&html).has_rule("parse-error"));
    }

    #[test]
    fn banned_tags_are_reported() {
        let html = VALID.replacen("<h1>Hi</h1>", "<h1><b>Hi</b></h1>", 1);
        assert!(rubric_lint(&html).has_rule("tag-bans"));
    }

    #[test]
    fn formatting_rules_apply_only_when_enabled() {
        let html = "<!DOCTYPE html>\r\n<html lang=\"en\">  \n\t  <body class=\"MainBody\"></body>\n</html>\n";
        let rubric = rubric_lint(html);
        assert_eq!(rubric.error_count(), 0, "{:?}", rubric.violations);

        let options = HtmlLintOptions {
            img_req_alt: false,
            ..HtmlLintOptions::default()
        };
        let report = lint_html(html, &options);
        assert!(report.has_rule("line-end-style"));
        assert!(report.has_rule("line-no-trailing-whitespace"));
        assert!(report.has_rule("indent-style"));
        assert!(report.has_rule("id-class-style"));
    }

    #[test]
    fn indent_width_counts_spaces() {
        let options = HtmlLintOptions {
            indent_width: Some(2),
            ..HtmlLintOptions::rubric()
        };
        let html = "<!DOCTYPE html>\n<html lang=\"en\">\n   <body></body>\n</html>\n";
        let report = lint_html(html, &options);
        let widths: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.rule == "indent-width")
            .collect();
        assert_eq!(widths.len(), 1);
        assert_eq!(widths[0].line, 3);
    }

    #[test]
    fn name_styles_follow_conventions() {
        assert!(NameStyle::Dash.matches("data-role"));
        assert!(!NameStyle::Dash.matches("data_role"));
        assert!(NameStyle::Underscore.matches("main_nav"));
        assert!(NameStyle::Camel.matches("mainNav"));
        assert!(!NameStyle::Lowercase.matches("main-nav"));
    }
}
