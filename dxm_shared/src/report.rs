// dxm_shared::report.rs
// Per-location simulation results

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("Operation name cannot be empty or whitespace")]
    EmptyName,
    #[error("Duration must be a non-negative finite number, got {0}")]
    InvalidDuration(f64),
}

/// Name and simulated duration of one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    name: String,
    duration: f64,
}

impl OperationResult {
    pub fn new(name: impl Into<String>, duration: f64) -> Result<Self, ReportError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ReportError::EmptyName);
        }
        if duration < 0.0 || !duration.is_finite() {
            return Err(ReportError::InvalidDuration(duration));
        }
        Ok(Self { name, duration })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(3);
        write!(f, "{}: {:.*}s", self.name, precision, self.duration)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationResultCollection {
    operations: Vec<OperationResult>,
}

impl OperationResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: OperationResult) {
        self.operations.push(result);
    }

    pub fn add(&mut self, name: impl Into<String>, duration: f64) -> Result<(), ReportError> {
        self.operations.push(OperationResult::new(name, duration)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OperationResult> {
        self.operations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OperationResult> {
        self.operations.iter()
    }

    pub fn total_duration(&self) -> f64 {
        self.operations.iter().map(|op| op.duration).sum()
    }

    /// First operation with the longest duration.
    pub fn longest(&self) -> Option<&OperationResult> {
        self.operations
            .iter()
            .reduce(|best, op| if op.duration > best.duration { op } else { best })
    }

    /// First operation with the shortest duration.
    pub fn shortest(&self) -> Option<&OperationResult> {
        self.operations
            .iter()
            .reduce(|best, op| if op.duration < best.duration { op } else { best })
    }

    /// Operations whose duration lies in `[min, max]`.
    pub fn filter_by_duration(&self, min: f64, max: f64) -> Self {
        self.operations
            .iter()
            .filter(|op| op.duration >= min && op.duration <= max)
            .cloned()
            .collect()
    }

    /// Operations whose name contains `pattern`, ignoring case.
    pub fn filter_by_name(&self, pattern: &str) -> Self {
        let pattern = pattern.to_lowercase();
        self.operations
            .iter()
            .filter(|op| op.name.to_lowercase().contains(&pattern))
            .cloned()
            .collect()
    }
}

impl FromIterator<OperationResult> for OperationResultCollection {
    fn from_iter<I: IntoIterator<Item = OperationResult>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a OperationResultCollection {
    type Item = &'a OperationResult;
    type IntoIter = std::slice::Iter<'a, OperationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl fmt::Display for OperationResultCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "Operation Results Collection (Empty)");
        }
        let separator = "-".repeat(50);
        writeln!(f, "Operation Results Collection ({} operations):", self.operations.len())?;
        writeln!(f, "{}", separator)?;
        for (i, op) in self.operations.iter().enumerate() {
            writeln!(f, "{:>3}. {}", i + 1, op)?;
        }
        writeln!(f, "{}", separator)?;
        if let Some(longest) = self.longest() {
            writeln!(f, "Longest: {}", longest)?;
        }
        if let Some(shortest) = self.shortest() {
            writeln!(f, "Shortest: {}", shortest)?;
        }
        Ok(())
    }
}

/// Outcome of playing one program in the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub total_duration: f64,
    pub leaves: OperationResultCollection,
}
