//! Names, units and interpretations of tags

use alloc::string::String;
use alloc::string::ToString;

use crate::tags::{self, Tag};
use crate::types::{Flow, Unit};
use crate::value::Payload;

/// Maps between tag names and numbers and explains values
///
/// Lookups that find nothing are not errors, callers fall back to the
/// numeric tag and the raw value.
pub trait TagDictionary {
    /// Tag with the given name
    fn tag(&self, name: &str) -> Option<Tag>;
    /// Name of `tag`
    fn name(&self, tag: Tag) -> Option<&str>;
    /// Human readable meaning of a value of `tag`
    fn interpret(&self, tag: Tag, payload: &Payload) -> Option<String>;
    /// Unit readings of `tag` are measured in
    fn unit(&self, _tag: Tag) -> Option<Unit> {
        None
    }
}

impl<D: TagDictionary + ?Sized> TagDictionary for &D {
    fn tag(&self, name: &str) -> Option<Tag> {
        (**self).tag(name)
    }
    fn name(&self, tag: Tag) -> Option<&str> {
        (**self).name(tag)
    }
    fn interpret(&self, tag: Tag, payload: &Payload) -> Option<String> {
        (**self).interpret(tag, payload)
    }
    fn unit(&self, tag: Tag) -> Option<Unit> {
        (**self).unit(tag)
    }
}

/// Dictionary of the tags this library knows about
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinDictionary;

impl TagDictionary for BuiltinDictionary {
    fn tag(&self, name: &str) -> Option<Tag> {
        tags::by_name(name)
    }

    fn name(&self, tag: Tag) -> Option<&str> {
        tags::name_of(tag)
    }

    fn interpret(&self, tag: Tag, payload: &Payload) -> Option<String> {
        let value = payload.integer()?;
        let text = match tag.request() {
            tags::EMS_REQ_COUPLING_MODE => match value {
                0 => "DC",
                1 => "DC multi inverter",
                2 => "AC",
                3 => "hybrid",
                4 => "island",
                _ => return None,
            },
            tags::EMS_REQ_POWER_BAT => match Flow::from_signed(value) {
                Flow::Idle => "idle",
                Flow::Inbound => "charging",
                Flow::Outbound => "discharging",
            },
            tags::EMS_REQ_POWER_GRID => match Flow::from_signed(value) {
                Flow::Idle => "balanced",
                Flow::Inbound => "import",
                Flow::Outbound => "export",
            },
            _ => return None,
        };
        Some(text.to_string())
    }

    fn unit(&self, tag: Tag) -> Option<Unit> {
        let unit = match tag.request() {
            tags::EMS_REQ_POWER_PV
            | tags::EMS_REQ_POWER_BAT
            | tags::EMS_REQ_POWER_HOME
            | tags::EMS_REQ_POWER_GRID
            | tags::EMS_REQ_POWER_ADD
            | tags::EMS_MAX_CHARGE_POWER
            | tags::EMS_MAX_DISCHARGE_POWER
            | tags::EMS_DISCHARGE_START_POWER
            | tags::DB_BAT_POWER_IN
            | tags::DB_BAT_POWER_OUT
            | tags::DB_DC_POWER
            | tags::DB_GRID_POWER_IN
            | tags::DB_GRID_POWER_OUT
            | tags::DB_CONSUMPTION
            | tags::DB_PM_0_POWER
            | tags::DB_PM_1_POWER => Unit::Watt,
            tags::EMS_REQ_START_MANUAL_CHARGE => Unit::WattHours,
            tags::EMS_REQ_AUTARKY
            | tags::EMS_REQ_SELF_CONSUMPTION
            | tags::EMS_REQ_BAT_SOC
            | tags::BAT_REQ_RSOC
            | tags::BAT_DCB_SOC
            | tags::DB_BAT_CHARGE_LEVEL
            | tags::DB_CONSUMED_PRODUCTION
            | tags::DB_AUTARKY => Unit::Percent,
            tags::BAT_REQ_MODULE_VOLTAGE
            | tags::BAT_REQ_MAX_BAT_VOLTAGE
            | tags::BAT_DCB_VOLTAGE
            | tags::BAT_REQ_DCB_ALL_CELL_VOLTAGES => Unit::Volt,
            tags::BAT_REQ_CURRENT | tags::BAT_DCB_CURRENT => Unit::Ampere,
            tags::BAT_REQ_MAX_DCB_CELL_TEMPERATURE
            | tags::BAT_REQ_MIN_DCB_CELL_TEMPERATURE
            | tags::BAT_REQ_DCB_ALL_CELL_TEMPERATURES => Unit::Celsius,
            tags::DB_REQ_HISTORY_TIME_INTERVAL | tags::DB_REQ_HISTORY_TIME_SPAN => Unit::Seconds,
            _ => return None,
        };
        Some(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let dict = BuiltinDictionary;
        assert_eq!(dict.tag("BAT_REQ_RSOC"), Some(tags::BAT_REQ_RSOC));
        assert_eq!(dict.name(tags::EMS_POWER_GRID), Some("EMS_POWER_GRID"));
        assert_eq!(dict.name(Tag(0x7F00_0000)), None);
    }
    #[test]
    fn test_interpretations() {
        let dict = BuiltinDictionary;
        assert_eq!(
            dict.interpret(tags::EMS_COUPLING_MODE, &Payload::UChar8(3))
                .as_deref(),
            Some("hybrid")
        );
        assert_eq!(
            dict.interpret(tags::EMS_POWER_BAT, &Payload::Int32(-800))
                .as_deref(),
            Some("discharging")
        );
        assert_eq!(
            dict.interpret(tags::EMS_POWER_GRID, &Payload::Int32(1500))
                .as_deref(),
            Some("import")
        );
        assert_eq!(dict.interpret(tags::EMS_COUPLING_MODE, &Payload::UChar8(9)), None);
        assert_eq!(dict.interpret(tags::EMS_POWER_PV, &Payload::Int32(900)), None);
    }
    #[test]
    fn test_units() {
        let dict = BuiltinDictionary;
        assert_eq!(dict.unit(tags::EMS_POWER_PV), Some(Unit::Watt));
        assert_eq!(dict.unit(tags::BAT_RSOC), Some(Unit::Percent));
        assert_eq!(dict.unit(tags::INFO_SERIAL_NUMBER), None);
    }
}
