// Progress reporting for rebuilds.
//
// A rebuild reports `(stage, fraction)` pairs to a `ProgressSink` as it
// moves through its components. Fractions run from 0.0 to 1.0 over the
// whole rebuild. `Monotonic` wraps the caller's sink and clamps every
// report to the highest fraction seen so far, so a sink never sees
// progress go backwards even when a partial rebuild re-enters an earlier
// stage. Reports are write-only: nothing in a rebuild reads them back.
//
// See also: `building.rs`, which drives the stages.

use crate::types::ComponentKind;

/// Rebuild stages, in the order a full rebuild runs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    Validate,
    Platform,
    Walls,
    Tiles,
    Done,
}

impl From<ComponentKind> for BuildStage {
    fn from(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Platform => BuildStage::Platform,
            ComponentKind::Walls => BuildStage::Walls,
            ComponentKind::Tiles => BuildStage::Tiles,
        }
    }
}

pub trait ProgressSink {
    fn report(&mut self, stage: BuildStage, fraction: f32);
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _stage: BuildStage, _fraction: f32) {}
}

/// Records every report in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressLog {
    pub entries: Vec<(BuildStage, f32)>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<(BuildStage, f32)> {
        self.entries.last().copied()
    }
}

impl ProgressSink for ProgressLog {
    fn report(&mut self, stage: BuildStage, fraction: f32) {
        self.entries.push((stage, fraction));
    }
}

/// Clamps reports to `[0, 1]` and to never fall below the previous one.
pub struct Monotonic<'a> {
    inner: &'a mut dyn ProgressSink,
    high: f32,
}

impl<'a> Monotonic<'a> {
    pub fn new(inner: &'a mut dyn ProgressSink) -> Self {
        Self { inner, high: 0.0 }
    }
}

impl ProgressSink for Monotonic<'_> {
    fn report(&mut self, stage: BuildStage, fraction: f32) {
        let f = if fraction.is_nan() { self.high } else { fraction.clamp(0.0, 1.0) };
        self.high = self.high.max(f);
        self.inner.report(stage, self.high);
    }
}
