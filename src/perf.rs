use serde_json::json;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct PerfLogger {
    inner: Arc<Mutex<PerfState>>,
}

struct PerfState {
    writer: BufWriter<File>,
    path: PathBuf,
    span_totals: HashMap<String, f64>,
    span_counts: HashMap<String, u64>,
}

impl PerfLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(PerfState {
                writer: BufWriter::new(file),
                path,
                span_totals: HashMap::new(),
                span_counts: HashMap::new(),
            })),
        })
    }

    pub fn log_span_ms(&self, name: &str, ms: f64) {
        let json = json!({
            "type": "perf.span",
            "name": name,
            "unit": "ms",
            "ms": (ms * 1000.0).round() / 1000.0,
        });
        if let Ok(mut state) = self.inner.lock() {
            *state.span_totals.entry(name.to_string()).or_insert(0.0) += ms;
            let entry = state.span_counts.entry(name.to_string()).or_insert(0);
            *entry = entry.saturating_add(1);
            let _ = writeln!(state.writer, "{json}");
        }
    }

    pub fn log_counts(&self, name: &str, counts: &[(&str, u64)]) {
        let counts: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(key, value)| (key.to_string(), json!(value)))
            .collect();
        let json = json!({ "type": "perf.counts", "name": name, "counts": counts });
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.writer, "{json}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

impl Drop for PerfState {
    fn drop(&mut self) {
        let _ = self.writer.flush();
        let hot_path = hot_path_for(&self.path);
        let Ok(file) = File::create(&hot_path) else {
            return;
        };
        let mut writer = BufWriter::new(file);

        let mut spans: Vec<(&String, &f64)> = self.span_totals.iter().collect();
        spans.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (rank, (name, ms)) in spans.into_iter().enumerate() {
            let count = *self.span_counts.get(name).unwrap_or(&1);
            let avg = if count == 0 { 0.0 } else { ms / count as f64 };
            let line = json!({
                "type": "perf.hot.span",
                "rank": rank + 1,
                "name": name,
                "unit": "ms",
                "ms": ms,
                "count": count,
                "avg_ms": avg,
            });
            let _ = writeln!(writer, "{line}");
        }
    }
}

fn hot_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("pagegrade_perf.log");
    let stem = file_name
        .rsplit_once('.')
        .map(|(s, _)| s)
        .unwrap_or(file_name);
    path.with_file_name(format!("{stem}_hot.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_path_keeps_directory_and_replaces_extension() {
        let hot = hot_path_for(Path::new("/tmp/logs/run.jsonl"));
        assert_eq!(hot, PathBuf::from("/tmp/logs/run_hot.log"));
        let bare = hot_path_for(Path::new("perf"));
        assert_eq!(bare, PathBuf::from("perf_hot.log"));
    }

    #[test]
    fn dropping_logger_writes_hot_summary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("perf.jsonl");
        {
            let perf = PerfLogger::new(&path).expect("perf");
            perf.log_span_ms("lint", 2.0);
            perf.log_span_ms("lint", 4.0);
            perf.log_span_ms("inline", 1.0);
            perf.log_counts("tree", &[("elements", 12)]);
            perf.flush();
        }
        let spans = std::fs::read_to_string(&path).expect("perf log");
        assert_eq!(spans.lines().count(), 4);
        let hot = std::fs::read_to_string(dir.path().join("perf_hot.log")).expect("hot log");
        let first: serde_json::Value =
            serde_json::from_str(hot.lines().next().expect("hot line")).expect("json");
        assert_eq!(first["name"], "lint");
        assert_eq!(first["count"], 2);
        assert_eq!(first["avg_ms"], 3.0);
    }
}
