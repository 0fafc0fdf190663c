//! Units used in requests and readings

use core::fmt::Display;

/// Power in watt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watt(pub u32);
impl Display for Watt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} W", self.0)
    }
}

/// Energy in watt hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WattHours(pub u32);
impl Display for WattHours {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} Wh", self.0)
    }
}

/// Physical unit of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Watt,
    WattHours,
    Volt,
    Ampere,
    Percent,
    Celsius,
    Seconds,
}
impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Watt => "W",
            Unit::WattHours => "Wh",
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Percent => "%",
            Unit::Celsius => "°C",
            Unit::Seconds => "s",
        }
    }
}
impl Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Direction of energy flow derived from a signed power reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Idle,
    Inbound,
    Outbound,
}
impl Flow {
    /// Positive values flow in, negative values flow out
    pub fn from_signed(value: i64) -> Flow {
        match value {
            0 => Flow::Idle,
            v if v > 0 => Flow::Inbound,
            _ => Flow::Outbound,
        }
    }
}
