// src/progress.rs
/// Sanity-check reporting for batch steps (extract/flag/append/verify).
/// Frontends implement this to show operators what happened; the library
/// never prints on its own.
pub trait Progress {
    /// A step starts; `title` names it ("extract", "flag air_transport", …).
    fn begin(&mut self, _title: &str) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A table was loaded or produced: (data rows, columns).
    fn shape(&mut self, _label: &str, _shape: (usize, usize)) {}

    /// Called at the end of the step, successful or not.
    fn finish(&mut self) {}
}

/// Collects everything into lines. Handy in tests and for log files.
#[derive(Debug, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
}

impl Progress for Transcript {
    fn begin(&mut self, title: &str) { self.lines.push(format!("begin {title}")); }
    fn log(&mut self, msg: &str) { self.lines.push(s!(msg)); }
    fn shape(&mut self, label: &str, shape: (usize, usize)) {
        self.lines.push(format!("{label}: ({}, {})", shape.0, shape.1));
    }
    fn finish(&mut self) { self.lines.push(s!("finish")); }
}
