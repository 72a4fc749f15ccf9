use std::ops::AddAssign;

/// The order in which the compiler drives every unit of work.
/// A handler never sees a later phase before an earlier one for the same unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Construction,
    Filling,
    Finalizing,
}

/// What a handler reports back for one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessingResult {
    Success,
    Ignored,
    Failure,
}

impl ProcessingResult {
    pub fn is_failure(self) -> bool {
        self == ProcessingResult::Failure
    }

    // Failure > Success > Ignored
    fn weight(self) -> u8 {
        match self {
            ProcessingResult::Ignored => 0,
            ProcessingResult::Success => 1,
            ProcessingResult::Failure => 2,
        }
    }
}

/// Folds several results into one.
///
/// Any `Failure` dominates, `Success` dominates `Ignored`, and folding
/// nothing at all yields `Ignored`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessingResultCombiner {
    value: ProcessingResult,
}

impl Default for ProcessingResultCombiner {
    fn default() -> Self {
        Self {
            value: ProcessingResult::Ignored,
        }
    }
}

impl ProcessingResultCombiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: ProcessingResult) {
        if result.weight() > self.value.weight() {
            self.value = result;
        }
    }

    pub fn result(&self) -> ProcessingResult {
        self.value
    }
}

impl AddAssign<ProcessingResult> for ProcessingResultCombiner {
    fn add_assign(&mut self, result: ProcessingResult) {
        self.add(result);
    }
}

impl FromIterator<ProcessingResult> for ProcessingResultCombiner {
    fn from_iter<I: IntoIterator<Item = ProcessingResult>>(iter: I) -> Self {
        let mut combiner = Self::new();
        for result in iter {
            combiner += result;
        }
        combiner
    }
}
