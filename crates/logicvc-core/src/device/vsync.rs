//! Vertical sync interrupt handling.

use std::time::Duration;

use logicvc_hal::{DelayNs, RegisterIo, VideoMemory};
use logicvc_registers::map::common as common_regs;
use logicvc_registers::reg::Register;
use logicvc_registers::IntStatReg;

use super::{lock, Device};
use crate::error::{LogicvcError, Result};

impl<R: RegisterIo, M: VideoMemory, D: DelayNs> Device<R, M, D> {
    /// Service the compositor interrupt line.
    ///
    /// Acknowledges a pending vsync, bumps the counter and wakes waiters.
    /// Returns whether the interrupt was ours. Only the interrupt lock and the
    /// register window are taken, never the common lock.
    pub fn handle_interrupt(&self) -> bool {
        let mut irq = lock(&self.irq);
        let pending = {
            let mut regs = lock(&irq.regs);
            let stat = IntStatReg::from_raw(regs.read32(common_regs::INT_STAT));
            if stat.vsync() {
                let mut ack = IntStatReg::default();
                ack.set_vsync(true);
                regs.write32(common_regs::INT_STAT, ack.to_raw());
            }
            stat.vsync()
        };
        if pending {
            irq.vsync_count += 1;
            self.vsync_wait.notify_all();
        }
        pending
    }

    /// Number of vsync interrupts handled so far.
    #[must_use]
    pub fn vsync_count(&self) -> u64 {
        lock(&self.irq).vsync_count
    }

    /// Block until the next vsync and return the new count.
    ///
    /// # Errors
    /// [`LogicvcError::Timeout`] when no vsync arrives in time.
    pub fn wait_for_vsync(&self, timeout: Duration) -> Result<u64> {
        let irq = lock(&self.irq);
        let start = irq.vsync_count;
        let (irq, result) = self
            .vsync_wait
            .wait_timeout_while(irq, timeout, |irq| irq.vsync_count == start)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if result.timed_out() {
            return Err(LogicvcError::Timeout("vsync"));
        }
        Ok(irq.vsync_count)
    }
}
