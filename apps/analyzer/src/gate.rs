use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single in-flight analysis flag. Not a queue: a second caller is turned
/// away while the first holds the permit.
#[derive(Clone, Default)]
pub struct AnalysisGate {
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when dropped, including on early return or panic.
pub struct GatePermit {
    busy: Arc<AtomicBool>,
}

impl AnalysisGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<GatePermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GatePermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
