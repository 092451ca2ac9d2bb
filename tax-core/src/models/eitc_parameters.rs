use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::FilingStatus;

/// Earned income tax credit schedule for one dependent count.
///
/// The credit ramps up from zero to `cap` at `phase_in_complete`, holds at
/// `cap` until the phase-out start, then tapers linearly to zero at the
/// phase-out completion. Joint filers get their own, higher phase-out range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcParameters {
    pub cap: Decimal,
    pub phase_in_complete: Decimal,
    pub phase_out_start_joint: Decimal,
    pub phase_out_complete_joint: Decimal,
    pub phase_out_start_single: Decimal,
    pub phase_out_complete_single: Decimal,
}

impl EitcParameters {
    /// A schedule that never pays a credit. Used when no row exists for a
    /// year and dependent count.
    pub const NONE: Self = Self {
        cap: Decimal::ZERO,
        phase_in_complete: Decimal::ZERO,
        phase_out_start_joint: Decimal::ZERO,
        phase_out_complete_joint: Decimal::ZERO,
        phase_out_start_single: Decimal::ZERO,
        phase_out_complete_single: Decimal::ZERO,
    };

    /// Returns `(phase_out_start, phase_out_complete)` for the filing status.
    ///
    /// Only [`FilingStatus::Married`] uses the joint range. Head of household
    /// filers are routed through the single range.
    pub fn phase_out(
        &self,
        filing_status: FilingStatus,
    ) -> (Decimal, Decimal) {
        if filing_status.is_joint() {
            (self.phase_out_start_joint, self.phase_out_complete_joint)
        } else {
            (self.phase_out_start_single, self.phase_out_complete_single)
        }
    }

    /// Checks `complete >= start >= phase_in_complete >= 0` for both ranges
    /// and that the cap is non-negative.
    pub fn is_well_ordered(&self) -> bool {
        let ordered = |start: Decimal, complete: Decimal| {
            complete >= start && start >= self.phase_in_complete
        };

        self.cap >= Decimal::ZERO
            && self.phase_in_complete >= Decimal::ZERO
            && ordered(self.phase_out_start_joint, self.phase_out_complete_joint)
            && ordered(self.phase_out_start_single, self.phase_out_complete_single)
    }
}
