//! Execution phase enums for statements with more than one micro-step

/// Execution phase for If statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfPhase {
    /// Evaluate the test and push the chosen branch
    Eval,
    /// Branch finished, pop the frame
    Done,
}

/// Execution phase for For loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForPhase {
    /// Evaluate the iterable
    Eval,
    /// Push the body for the next item
    Iterate,
}
