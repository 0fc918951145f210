mod checks;
mod css_lint;
mod debug;
mod error;
mod html_lint;
mod inline;
mod lint;
mod perf;
mod source;
mod style;
mod tree;

pub use checks::{CheckResult, Mismatch, Outcome};
pub use css_lint::lint_css;
use debug::DebugLogger;
pub use error::PageGradeError;
pub use html_lint::{HtmlLintOptions, IndentStyle, LineEndStyle, NameStyle, lint_html};
pub use inline::{InlineOptions, InlineOutput, inline_styles};
pub use lint::{LintReport, LintViolation, Severity};
pub use pagegrade_rubric::{Category, CheckDef, CheckId, RubricMetadata};
use perf::PerfLogger;
pub use source::SourceSnapshot;
pub use style::{ComputedStyle, Viewport};
pub use tree::DocumentTree;

use pagegrade_rubric::{CHECKS_V1, CSS_PATH, HTML_PATH, rubric_metadata};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

pub struct RubricRunner {
    root: PathBuf,
    html_path: PathBuf,
    css_path: PathBuf,
    html_lint_options: HtmlLintOptions,
    keep_link_tags: bool,
    viewport: Viewport,
    debug: Option<Arc<DebugLogger>>,
    perf: Option<Arc<PerfLogger>>,
}

pub struct RubricRunnerBuilder {
    root: PathBuf,
    html_path: PathBuf,
    css_path: PathBuf,
    html_lint_options: HtmlLintOptions,
    keep_link_tags: bool,
    viewport: Viewport,
    debug_path: Option<PathBuf>,
    perf_path: Option<PathBuf>,
}

/// Outcome of one run: every check in catalogue order.
#[derive(Debug, Clone)]
pub struct RubricReport {
    results: Vec<CheckResult>,
    source_fingerprint: String,
    rubric: RubricMetadata,
    html_lint: LintReport,
    css_lint: LintReport,
}

impl RubricReport {
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn passed(&self) -> bool {
        self.results.iter().all(CheckResult::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(move |r| r.def.category == category)
    }

    pub fn result(&self, id: CheckId) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.def.id == id)
    }

    pub fn source_fingerprint(&self) -> &str {
        &self.source_fingerprint
    }

    pub fn rubric(&self) -> &RubricMetadata {
        &self.rubric
    }

    pub fn html_lint(&self) -> &LintReport {
        &self.html_lint
    }

    pub fn css_lint(&self) -> &LintReport {
        &self.css_lint
    }

    pub fn summary(&self) -> String {
        let failed = self.failures().count();
        format!(
            "{} checks, {} passed, {} failed",
            self.results.len(),
            self.results.len() - failed,
            failed
        )
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

impl RubricRunner {
    pub fn builder() -> RubricRunnerBuilder {
        RubricRunnerBuilder::new()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn log_span(&self, name: &str, ms: f64) {
        if let Some(perf) = self.perf.as_deref() {
            perf.log_span_ms(name, ms);
        }
    }

    fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary(context);
            logger.flush();
        }
    }

    /// Loads the sources and evaluates every check. Only load failures are
    /// returned as errors; everything else becomes a failed check.
    pub fn run(&self) -> Result<RubricReport, PageGradeError> {
        let start = Instant::now();
        let snapshot = SourceSnapshot::load(
            self.root.join(&self.html_path),
            self.root.join(&self.css_path),
        )?;
        self.log_span("load", elapsed_ms(start));
        tracing::info!(
            html = %snapshot.html_path().display(),
            css = %snapshot.css_path().display(),
            fingerprint = snapshot.fingerprint(),
            "sources loaded"
        );

        let inline_options = InlineOptions {
            base_dir: snapshot.base_dir(),
            keep_link_tags: self.keep_link_tags,
            remove_style_tags: true,
            viewport: self.viewport,
        };
        let ((html_lint, css_lint), inlined) = rayon::join(
            || {
                rayon::join(
                    || {
                        let start = Instant::now();
                        let report = lint_html(snapshot.html(), &self.html_lint_options);
                        (report, elapsed_ms(start))
                    },
                    || {
                        let start = Instant::now();
                        let report = lint_css(snapshot.css());
                        (report, elapsed_ms(start))
                    },
                )
            },
            || {
                let start = Instant::now();
                let output =
                    inline::inline_styles_logged(snapshot.html(), &inline_options, self.debug.clone());
                (output, elapsed_ms(start))
            },
        );
        let (html_lint, html_ms) = html_lint;
        let (css_lint, css_ms) = css_lint;
        let (inlined, inline_ms) = inlined;
        self.log_span("lint.html", html_ms);
        self.log_span("lint.css", css_ms);
        self.log_span("inline", inline_ms);
        self.log_lint("html", &html_lint);
        self.log_lint("css", &css_lint);

        let mut results = Vec::with_capacity(CHECKS_V1.len());
        results.push(checks::lint_check(CheckId::HtmlValid, &html_lint));
        results.push(checks::lint_check(CheckId::CssValid, &css_lint));

        let start = Instant::now();
        let parsed = DocumentTree::parse(snapshot.html(), snapshot.fingerprint());
        self.log_span("parse", elapsed_ms(start));
        if let Some(perf) = self.perf.as_deref() {
            perf.log_counts("parse", &[("elements", parsed.element_count() as u64)]);
        }
        let start = Instant::now();
        results.extend(checks::structure_checks(&parsed));
        self.log_span("checks.structure", elapsed_ms(start));

        let start = Instant::now();
        match inlined {
            Ok(output) => {
                if let Some(perf) = self.perf.as_deref() {
                    perf.log_counts(
                        "inline",
                        &[
                            ("stylesheets", output.stylesheets as u64),
                            ("rules", output.rules as u64),
                            ("styled_elements", output.styled_elements as u64),
                        ],
                    );
                }
                let inlined_tree =
                    DocumentTree::parse(&output.html, output.source_fingerprint.clone());
                if inlined_tree.fingerprint() == parsed.fingerprint() {
                    results.extend(checks::style_checks(&inlined_tree));
                } else {
                    tracing::warn!(
                        parsed = parsed.fingerprint(),
                        inlined = inlined_tree.fingerprint(),
                        "inlined tree comes from a different source"
                    );
                    results.extend(checks::style_failures(
                        "inlined tree does not match the parsed document",
                    ));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "inlining failed");
                if let Some(logger) = self.debug.as_deref() {
                    logger.log_event("inline.error", json!({ "error": err.to_string() }));
                }
                results.extend(checks::style_failures(&err.to_string()));
            }
        }
        self.log_span("checks.style", elapsed_ms(start));

        self.log_results(&results);
        self.emit_debug_summary("run");
        if let Some(perf) = self.perf.as_deref() {
            perf.flush();
        }

        let report = RubricReport {
            results,
            source_fingerprint: snapshot.fingerprint().to_string(),
            rubric: rubric_metadata(),
            html_lint,
            css_lint,
        };
        tracing::info!(summary = %report.summary(), "rubric evaluated");
        Ok(report)
    }

    fn log_lint(&self, file: &str, report: &LintReport) {
        tracing::debug!(
            file,
            errors = report.error_count(),
            warnings = report.warnings().count(),
            "lint finished"
        );
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        for violation in &report.violations {
            logger.log_event(
                "lint.violation",
                json!({
                    "file": file,
                    "rule": violation.rule,
                    "severity": violation.severity.as_str(),
                    "line": violation.line,
                    "column": violation.column,
                    "message": violation.message,
                }),
            );
            logger.increment(&format!("lint.{file}.{}", violation.severity.as_str()), 1);
        }
    }

    fn log_results(&self, results: &[CheckResult]) {
        for result in results {
            tracing::debug!(check = result.def.key, passed = result.passed(), "check evaluated");
        }
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        for result in results {
            let mismatch = result.mismatch();
            logger.log_event(
                "check.result",
                json!({
                    "id": result.def.key,
                    "category": result.def.category.id(),
                    "pass": result.passed(),
                    "expected": mismatch.map(|m| m.expected.as_str()),
                    "actual": mismatch.map(|m| m.actual.as_str()),
                }),
            );
            logger.increment(if result.passed() { "checks.pass" } else { "checks.fail" }, 1);
        }
    }
}

impl RubricRunnerBuilder {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            html_path: PathBuf::from(HTML_PATH),
            css_path: PathBuf::from(CSS_PATH),
            html_lint_options: HtmlLintOptions::rubric(),
            keep_link_tags: true,
            viewport: Viewport::default(),
            debug_path: None,
            perf_path: None,
        }
    }

    /// Assignment directory; check files are resolved against it.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn html_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.html_path = path.into();
        self
    }

    pub fn css_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.css_path = path.into();
        self
    }

    pub fn html_lint_options(mut self, options: HtmlLintOptions) -> Self {
        self.html_lint_options = options;
        self
    }

    pub fn keep_link_tags(mut self, keep: bool) -> Self {
        self.keep_link_tags = keep;
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    // JSONL event log of lint violations, check results and cascade counters.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    // JSONL stage timings; a `<stem>_hot.log` summary is written on drop.
    pub fn perf_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.perf_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<RubricRunner, PageGradeError> {
        for (label, path) in [("html_path", &self.html_path), ("css_path", &self.css_path)] {
            if path.as_os_str().is_empty() {
                return Err(PageGradeError::InvalidConfiguration(format!(
                    "{label} must not be empty"
                )));
            }
            if path.is_absolute() {
                return Err(PageGradeError::InvalidConfiguration(format!(
                    "{label} must be relative to the root, got {}",
                    path.display()
                )));
            }
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(PageGradeError::InvalidConfiguration(
                "viewport must have a positive size".to_string(),
            ));
        }
        let debug = match self.debug_path {
            Some(path) => Some(Arc::new(
                DebugLogger::new(&path).map_err(|err| PageGradeError::io(&path, err))?,
            )),
            None => None,
        };
        let perf = match self.perf_path {
            Some(path) => Some(Arc::new(
                PerfLogger::new(&path).map_err(|err| PageGradeError::io(&path, err))?,
            )),
            None => None,
        };
        Ok(RubricRunner {
            root: self.root,
            html_path: self.html_path,
            css_path: self.css_path,
            html_lint_options: self.html_lint_options,
            keep_link_tags: self.keep_link_tags,
            viewport: self.viewport,
            debug,
            perf,
        })
    }
}

impl Default for RubricRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagegrade_rubric::hex_sha256;
    use serde_json::Value;

    const PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>About me</title>\n<meta name=\"author\" content=\"Ada Lovelace\">\n<link rel=\"stylesheet\" href=\"css/style.css\">\n</head>\n<body>\n<h1>Hi</h1>\n<img src=\"img/me.jpg\" alt=\"me\">\n<p>Text with <a href=\"https://example.com\">a link</a>.</p>\n<ul>\n<li>one</li>\n<li>two</li>\n<li class=\"hot\">three</li>\n</ul>\n</body>\n</html>\n";

    const SHEET: &str = "body {\n  font-size: 16px;\n  font-family: \"Helvetica Neue\", Helvetica, Arial, sans-serif;\n}\n\np {\n  line-height: 1.5;\n}\n\nimg {\n  max-height: 400px;\n}\n\n.hot {\n  color: #c00;\n}\n";

    fn assignment(html: &str, css: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("css")).expect("css dir");
        std::fs::create_dir_all(dir.path().join("img")).expect("img dir");
        std::fs::write(dir.path().join("index.html"), html).expect("write html");
        std::fs::write(dir.path().join("css/style.css"), css).expect("write css");
        dir
    }

    fn run(dir: &Path) -> RubricReport {
        RubricRunner::builder()
            .root(dir)
            .build()
            .expect("runner")
            .run()
            .expect("report")
    }

    #[test]
    fn a_complete_assignment_passes_every_check() {
        let dir = assignment(PAGE, SHEET);
        let report = run(dir.path());
        let failures: Vec<String> = report.failures().map(ToString::to_string).collect();
        assert!(report.passed(), "failures: {failures:#?}");
        assert_eq!(report.results().len(), CHECKS_V1.len());
        assert_eq!(report.summary(), "17 checks, 17 passed, 0 failed");
        assert_eq!(report.source_fingerprint(), hex_sha256(PAGE.as_bytes()));
        assert_eq!(report.rubric().check_count, 17);
    }

    #[test]
    fn omitted_optional_end_tags_still_pass() {
        let html = PAGE
            .replace("</li>", "")
            .replace("</p>", "")
            .replace("</body>\n</html>\n", "");
        let dir = assignment(&html, SHEET);
        let report = run(dir.path());
        let failures: Vec<String> = report.failures().map(ToString::to_string).collect();
        assert!(report.passed(), "failures: {failures:#?}");
        assert!(report.html_lint().violations.is_empty(), "{:?}", report.html_lint().violations);
    }

    #[test]
    fn results_follow_catalogue_order() {
        let dir = assignment(PAGE, SHEET);
        let report = run(dir.path());
        let ids: Vec<CheckId> = report.results().iter().map(|r| r.def.id).collect();
        let expected: Vec<CheckId> = CHECKS_V1.iter().map(|d| d.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(report.in_category(Category::Structure).count(), 9);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let dir = assignment(PAGE, SHEET);
        let first = run(dir.path());
        let second = run(dir.path());
        assert_eq!(first.results(), second.results());
        assert_eq!(first.source_fingerprint(), second.source_fingerprint());
    }

    #[test]
    fn failures_stay_within_their_check() {
        let html = PAGE.replace("<title>About me</title>", "<title>My Page Title</title>");
        let css = SHEET.replace("line-height: 1.5", "line-height: 2");
        let dir = assignment(&html, &css);
        let report = run(dir.path());
        let failed: Vec<&str> = report.failures().map(|r| r.def.key).collect();
        assert_eq!(failed, ["structure.title", "style.paragraph_line_height"]);
    }

    #[test]
    fn lint_errors_fail_only_the_syntax_group() {
        let html = PAGE.replace("<html lang=\"en\">", "<html>");
        let css = format!("{SHEET}\nh1 {{\n  colr: red;\n}}\n");
        let dir = assignment(&html, &css);
        let report = run(dir.path());
        let failed: Vec<&str> = report.failures().map(|r| r.def.key).collect();
        assert_eq!(failed, ["syntax.html_valid", "syntax.css_valid"]);
        assert!(report.html_lint().has_rule("html-req-lang"));
        assert!(report.css_lint().has_rule("known-properties"));
    }

    #[test]
    fn unreadable_linked_stylesheet_fails_every_style_check() {
        let html = PAGE.replace("css/style.css", "css/missing.css");
        let dir = assignment(&html, SHEET);
        let report = run(dir.path());
        let style: Vec<&CheckResult> = report.in_category(Category::Style).collect();
        assert_eq!(style.len(), 6);
        assert!(style.iter().all(|r| !r.passed()));
        assert!(report.in_category(Category::Structure).all(CheckResult::passed));
        let actual = style[1].mismatch().map(|m| m.actual.clone()).unwrap_or_default();
        assert!(actual.contains("css/missing.css"), "{actual}");
    }

    #[test]
    fn missing_sources_are_load_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), PAGE).expect("write html");
        let runner = RubricRunner::builder().root(dir.path()).build().expect("runner");
        match runner.run() {
            Err(PageGradeError::Io { path, .. }) => assert!(path.ends_with("css/style.css")),
            other => panic!("expected io error, got {:?}", other.map(|r| r.summary())),
        }
    }

    #[test]
    fn builder_rejects_unusable_paths() {
        let empty = RubricRunner::builder().html_path("").build();
        assert!(matches!(empty, Err(PageGradeError::InvalidConfiguration(_))));
        let absolute = RubricRunner::builder().css_path("/etc/style.css").build();
        assert!(matches!(absolute, Err(PageGradeError::InvalidConfiguration(_))));
        let viewport = RubricRunner::builder()
            .viewport(Viewport { width: 0.0, height: 600.0 })
            .build();
        assert!(matches!(viewport, Err(PageGradeError::InvalidConfiguration(_))));
    }

    #[test]
    fn debug_and_perf_logs_record_the_run() {
        let dir = assignment(PAGE, SHEET);
        let logs = tempfile::tempdir().expect("log dir");
        let debug_path = logs.path().join("debug.jsonl");
        let perf_path = logs.path().join("perf.jsonl");
        {
            let runner = RubricRunner::builder()
                .root(dir.path())
                .debug_log(&debug_path)
                .perf_log(&perf_path)
                .build()
                .expect("runner");
            assert!(runner.run().expect("report").passed());
        }

        let events: Vec<Value> = std::fs::read_to_string(&debug_path)
            .expect("debug log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        let results = events.iter().filter(|e| e["type"] == "check.result").count();
        assert_eq!(results, 17);
        let summary = events.last().expect("summary");
        assert_eq!(summary["type"], "debug.summary");
        assert_eq!(summary["counts"]["checks.pass"], 17);

        let spans = std::fs::read_to_string(&perf_path).expect("perf log");
        assert!(spans.contains("\"name\":\"inline\""), "{spans}");
        assert!(logs.path().join("perf_hot.log").exists());
    }
}
