use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NestingError {
    #[error("#else without corresponding #if")]
    StrayElse,
    #[error("#endif without corresponding #if")]
    StrayEndif,
}

/// Symbols considered defined for `#ifdef` evaluation.
///
/// Append-only; membership is an exact string match. Seeded from `--def`
/// arguments and grown by `#define` directives.
#[derive(Debug, Default)]
pub struct DefineSet {
    symbols: Vec<String>,
}

impl DefineSet {
    pub fn new() -> DefineSet {
        DefineSet::default()
    }

    pub fn define(&mut self, symbol: &str) {
        self.symbols.push(symbol.to_string());
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

/// Nested conditional inclusion state.
///
/// One suppression flag per open frame. A line is suppressed when any open
/// frame is in its false branch, so content inside `#if 0 ... #if 1` stays
/// suppressed until the outer frame closes.
#[derive(Debug, Default)]
pub struct ConditionalStack {
    suppressed: Vec<bool>,
}

impl ConditionalStack {
    pub fn new() -> ConditionalStack {
        ConditionalStack::default()
    }

    /// Open a frame; `active` is the truth of the condition just evaluated.
    pub fn push(&mut self, active: bool) {
        self.suppressed.push(!active);
    }

    /// Flip the innermost frame for `#else`.
    pub fn toggle_else(&mut self) -> Result<(), NestingError> {
        match self.suppressed.last_mut() {
            Some(flag) => {
                *flag = !*flag;
                Ok(())
            }
            None => Err(NestingError::StrayElse),
        }
    }

    /// Close the innermost frame for `#endif`.
    pub fn pop(&mut self) -> Result<(), NestingError> {
        match self.suppressed.pop() {
            Some(_) => Ok(()),
            None => Err(NestingError::StrayEndif),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.iter().any(|&flag| flag)
    }

    pub fn depth(&self) -> usize {
        self.suppressed.len()
    }
}
