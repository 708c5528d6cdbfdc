use std::path::PathBuf;

/// Operator target input, sampled once per tick. An empty string disarms.
pub trait TargetSource: Send {
    fn sample(&mut self) -> String;
}

/// A target fixed for the whole session (possibly empty).
pub struct FixedTarget(String);

impl FixedTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn none() -> Self {
        Self(String::new())
    }
}

impl TargetSource for FixedTarget {
    fn sample(&mut self) -> String {
        self.0.clone()
    }
}

/// Reads the target from a file on every tick so it can be changed while
/// a session runs. A missing or unreadable file samples as empty.
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TargetSource for FileTarget {
    fn sample(&mut self) -> String {
        std::fs::read_to_string(&self.path)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}
