use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintViolation {
    pub rule: &'static str,
    pub severity: Severity,
    /// 1-based line of the offending token.
    pub line: u64,
    pub column: Option<u32>,
    pub message: String,
}

impl LintViolation {
    pub fn error(rule: &'static str, line: u64, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Error,
            line,
            column: None,
            message: message.into(),
        }
    }

    pub fn warning(rule: &'static str, line: u64, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Warning,
            line,
            column: None,
            message: message.into(),
        }
    }

    pub fn at_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }
}

impl fmt::Display for LintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "line {}:{}", self.line, column)?,
            None => write!(f, "line {}", self.line)?,
        }
        write!(
            f,
            " {} [{}] {}",
            self.severity.as_str(),
            self.rule,
            self.message
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub violations: Vec<LintViolation>,
}

impl LintReport {
    pub fn errors(&self) -> impl Iterator<Item = &LintViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LintViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_rule(&self, rule: &str) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }

    pub(crate) fn sort(&mut self) {
        self.violations
            .sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));
    }
}
