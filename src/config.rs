/// instructions executed per 60Hz frame unless configured otherwise
pub const DEFAULT_CYCLES_PER_FRAME: u32 = 10;

/// Which register 8XY6 / 8XYE read before shifting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftQuirk {
    /// COSMAC VIP behaviour: Vx := Vy shifted
    #[default]
    FromVy,
    /// CHIP-48 and most later interpreters: Vx shifted in place, Vy ignored
    InPlace,
}

/// Machine configuration. Timers always run at 60Hz; `cycles_per_frame`
/// sets how many instructions run between two timer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub shift: ShiftQuirk,
    pub cycles_per_frame: u32,
    /// fixed seed for CXNN; entropy when None
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shift: ShiftQuirk::default(),
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            seed: None,
        }
    }
}
