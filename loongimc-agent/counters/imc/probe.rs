// Channel walk: expose each controller window in turn and stop at the first
// one that answers.

use loongimc_raw::current_arch::chip::{self, CHIP_CONF_ADDRESS};
use loongimc_raw::current_arch::imc::{self, MC_CONF_ADDRESS};

use crate::common::arch::Topology;
use crate::common::mmio::RegisterAccess;
use crate::counters::imc::decode::{self, ImcTimings};
use crate::error::Result;

/// The first channel that answered, with its decoded timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeHit {
    pub channel: u8,
    pub timings: ImcTimings,
}

/// Keeps one channel's enable/route bit cleared; restores the original
/// function-setting value on drop.
struct ChannelWindow<'a, A: RegisterAccess> {
    access: &'a A,
    channel: u8,
    ctrl: u64,
    original: u64,
}

impl<'a, A: RegisterAccess> ChannelWindow<'a, A> {
    fn open(access: &'a A, topology: Topology, channel: u8) -> Result<Self> {
        let ctrl = chip::channel_address(CHIP_CONF_ADDRESS, topology.mode, channel);
        let original = access.read64(ctrl)?;
        access.write64(ctrl, original & !chip::enable_mask(topology.mode, channel))?;

        Ok(Self {
            access,
            channel,
            ctrl,
            original,
        })
    }

    fn responds(&self) -> Result<bool> {
        let presence = self.access.read8(MC_CONF_ADDRESS + imc::offset::PRESENCE)?;
        Ok(!imc::is_absent(presence))
    }
}

impl<A: RegisterAccess> Drop for ChannelWindow<'_, A> {
    fn drop(&mut self) {
        if let Err(e) = self.access.write64(self.ctrl, self.original) {
            tracing::error!(
                "Failed to restore function setting 0x{:016X} for channel {}: {}",
                self.original,
                self.channel,
                e
            );
        }
    }
}

/// Walk `0..topology.max_channels` and decode the first responding channel
///
/// Every channel touched has its function-setting register restored before
/// the next one is tried, and before this returns.
pub fn probe_channels<A: RegisterAccess>(
    access: &A,
    topology: Topology,
) -> Result<Option<ProbeHit>> {
    for channel in 0..topology.max_channels {
        let window = ChannelWindow::open(access, topology, channel)?;

        if !window.responds()? {
            tracing::debug!("Memory controller channel {} absent", channel);
            continue;
        }

        let timings = decode::read_timings(access)?;
        drop(window);

        tracing::info!("Memory controller channel {} responded", channel);
        return Ok(Some(ProbeHit { channel, timings }));
    }

    tracing::warn!(
        "No memory controller responded on {} channel(s)",
        topology.max_channels
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::sim::{Access, SimRegisters};
    use crate::error::LoongImcError;
    use loongimc_raw::current_arch::chip::ChannelMode;
    use loongimc_raw::current_arch::imc::{offset, BusWidth};

    fn topology(mode: ChannelMode, max_channels: u8) -> Topology {
        Topology { mode, max_channels }
    }

    fn ctrl(mode: ChannelMode, channel: u8) -> u64 {
        chip::channel_address(CHIP_CONF_ADDRESS, mode, channel)
    }

    /// Passes through to the simulator but fails byte reads at one address
    struct FaultyWindow<'a> {
        sim: &'a SimRegisters,
        fail_at: u64,
    }

    impl RegisterAccess for FaultyWindow<'_> {
        fn read8(&self, addr: u64) -> Result<u8> {
            if addr == self.fail_at {
                return Err(LoongImcError::MemError(format!("Read of 0x{addr:X} failed")));
            }
            self.sim.read8(addr)
        }

        fn read64(&self, addr: u64) -> Result<u64> {
            self.sim.read64(addr)
        }

        fn write64(&self, addr: u64, value: u64) -> Result<()> {
            self.sim.write64(addr, value)
        }
    }

    fn populate(sim: &SimRegisters, channel: u8) {
        sim.set_window_byte(channel, offset::PRESENCE, 0x3C);
        sim.set_window_byte(channel, offset::TCL, 16 + channel);
        sim.set_window_byte(channel, offset::TRP, 18);
        sim.set_window_byte(channel, offset::TRCD, 18);
        sim.set_window_byte(channel, offset::TRAS, 39);
        sim.set_window_byte(channel, offset::DATA_WIDTH, 0);
    }

    #[test]
    fn test_no_channel_responds() {
        for (mode, max) in [(ChannelMode::Routed, 8), (ChannelMode::Direct, 2)] {
            let sim = SimRegisters::new(mode, max);
            let before: Vec<u64> = (0..max).map(|ch| sim.word(ctrl(mode, ch))).collect();

            assert_eq!(probe_channels(&sim, topology(mode, max)).unwrap(), None);

            let log = sim.log();
            let presence_reads = log
                .iter()
                .filter(|a| matches!(a, Access::Read8(addr) if *addr == MC_CONF_ADDRESS))
                .count();
            assert_eq!(presence_reads, max as usize);

            // Only presence checks touch the controller window
            assert!(log
                .iter()
                .all(|a| !matches!(a, Access::Read8(addr) if *addr != MC_CONF_ADDRESS)));

            let after: Vec<u64> = (0..max).map(|ch| sim.word(ctrl(mode, ch))).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_presence_zero_is_absent() {
        let sim = SimRegisters::new(ChannelMode::Direct, 2);
        sim.set_window_byte(0, offset::PRESENCE, 0x00);
        sim.set_window_byte(1, offset::PRESENCE, 0x00);
        assert_eq!(
            probe_channels(&sim, topology(ChannelMode::Direct, 2)).unwrap(),
            None
        );
    }

    #[test]
    fn test_stops_at_first_responding_channel() {
        let mode = ChannelMode::Routed;
        let sim = SimRegisters::new(mode, 4);
        populate(&sim, 2);
        populate(&sim, 3);

        let hit = probe_channels(&sim, topology(mode, 4)).unwrap().unwrap();
        assert_eq!(hit.channel, 2);
        assert_eq!(hit.timings.tcl, 18);
        assert_eq!(hit.timings.tras, 39);
        assert_eq!(hit.timings.width, BusWidth::X64);

        let log = sim.log();
        for channel in 0..=2u8 {
            let addr = ctrl(mode, channel);
            assert!(log.contains(&Access::Write64(addr, 0)));
            assert!(log.contains(&Access::Write64(addr, 1 << 4)));
            assert_eq!(sim.word(addr), 1 << 4);
        }
        assert!(!log.contains(&Access::Read64(ctrl(mode, 3))));
    }

    #[test]
    fn test_direct_mode_clears_per_channel_bit() {
        let mode = ChannelMode::Direct;
        let sim = SimRegisters::new(mode, 2);
        let shared = ctrl(mode, 0);
        sim.set_word(shared, 0xDEAD_0000 | (1 << 4) | (1 << 9));
        populate(&sim, 1);

        let hit = probe_channels(&sim, topology(mode, 2)).unwrap().unwrap();
        assert_eq!(hit.channel, 1);

        let writes: Vec<Access> = sim
            .log()
            .into_iter()
            .filter(|a| matches!(a, Access::Write64(..)))
            .collect();
        let original = 0xDEAD_0000 | (1 << 4) | (1 << 9);
        assert_eq!(
            writes,
            vec![
                Access::Write64(shared, original & !(1 << 4)),
                Access::Write64(shared, original),
                Access::Write64(shared, original & !(1 << 9)),
                Access::Write64(shared, original),
            ]
        );
        assert_eq!(sim.word(shared), original);
    }

    #[test]
    fn test_zero_channels_probes_nothing() {
        let sim = SimRegisters::new(ChannelMode::Direct, 0);
        assert_eq!(
            probe_channels(&sim, topology(ChannelMode::Direct, 0)).unwrap(),
            None
        );
        assert!(sim.log().is_empty());
    }

    #[test]
    fn test_restores_on_presence_read_error() {
        let mode = ChannelMode::Routed;
        let sim = SimRegisters::new(mode, 4);
        let before = sim.word(ctrl(mode, 0));
        let access = FaultyWindow {
            sim: &sim,
            fail_at: MC_CONF_ADDRESS + offset::PRESENCE,
        };

        assert!(probe_channels(&access, topology(mode, 4)).is_err());
        assert_eq!(sim.word(ctrl(mode, 0)), before);
        assert_eq!(sim.log().last(), Some(&Access::Write64(ctrl(mode, 0), before)));
        assert!(!sim.log().contains(&Access::Read64(ctrl(mode, 1))));
    }

    #[test]
    fn test_restores_on_timing_read_error() {
        let mode = ChannelMode::Direct;
        let sim = SimRegisters::new(mode, 2);
        let shared = ctrl(mode, 0);
        populate(&sim, 1);
        let before = sim.word(shared);
        let access = FaultyWindow {
            sim: &sim,
            fail_at: MC_CONF_ADDRESS + offset::TCL,
        };

        let err = probe_channels(&access, topology(mode, 2)).unwrap_err();
        assert!(matches!(err, LoongImcError::MemError(_)));
        assert_eq!(sim.word(shared), before);
        assert_eq!(sim.log().last(), Some(&Access::Write64(shared, before)));
    }
}
