//! Paths through a value tree, for error reporting.
//!
//! A [`Path`] records the steps taken from the root of a decode to the place
//! where something went wrong.

use core::fmt;

/// A single step in a path through a value tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Navigate to a named struct field.
    Field(&'static str),
    /// Navigate to a list or array element.
    Index(usize),
    /// Navigate to the key of the n-th map entry.
    MapKey(usize),
    /// Navigate to the value of the n-th map entry.
    MapValue(usize),
    /// Dereference a pointer.
    Deref,
}

/// A path through a value tree, as a stack of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    /// Create an empty path pointing at the root.
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Push a step onto the path.
    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    /// Pop the last step.
    pub fn pop(&mut self) -> Option<PathStep> {
        self.steps.pop()
    }

    /// Insert a step at the front, used while an error bubbles up.
    pub fn prepend(&mut self, step: PathStep) {
        self.steps.insert(0, step);
    }

    /// The steps, root first.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether this path points at the root.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// A copy of this path with one more step.
    pub fn with(&self, step: PathStep) -> Self {
        let mut path = self.clone();
        path.push(step);
        path
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<root>");
        }

        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathStep::Index(idx) => write!(f, "[{idx}]")?,
                PathStep::MapKey(idx) => write!(f, "[key#{idx}]")?,
                PathStep::MapValue(idx) => write!(f, "[value#{idx}]")?,
                PathStep::Deref => f.write_str("*")?,
            }
        }
        Ok(())
    }
}
