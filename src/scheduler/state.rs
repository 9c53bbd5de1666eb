//! Scheduler lifecycle states (§4.8, §5: "stopped → running → draining →
//! stopped"). `Draining` means the cycle loop has stopped admitting new
//! work but the Trade Queue may still be finishing in-flight trades.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Draining,
}
