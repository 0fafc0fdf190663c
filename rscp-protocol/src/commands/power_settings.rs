use crate::InputError;
use crate::tags;
use crate::types::{Watt, WattHours};
use crate::value::{ContainerBuilder, Value};

/// How the storage limits its charge and discharge power
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// Let the device pick the limits
    Automatic,
    /// Fixed limits
    Manual { charge: Watt, discharge: Watt },
}

/// Accepted ranges of user supplied power settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerBounds {
    pub max_power: Watt,
    pub min_charge_energy: WattHours,
    pub max_charge_energy: WattHours,
}

impl Default for PowerBounds {
    fn default() -> Self {
        PowerBounds {
            max_power: Watt(3000),
            min_charge_energy: WattHours(100),
            max_charge_energy: WattHours(8000),
        }
    }
}

impl PowerBounds {
    /// Both limits must lie in `1..=max_power`
    pub fn check_mode(&self, mode: PowerMode) -> Result<PowerMode, InputError> {
        if let PowerMode::Manual { charge, discharge } = mode {
            self.check_power("charge limit", charge)?;
            self.check_power("discharge limit", discharge)?;
        }
        Ok(mode)
    }

    fn check_power(&self, what: &'static str, power: Watt) -> Result<(), InputError> {
        if power.0 < 1 || power > self.max_power {
            return Err(InputError::PowerOutOfRange {
                what,
                value: power.0,
                max: self.max_power.0,
            });
        }
        Ok(())
    }

    pub fn check_charge_energy(&self, energy: WattHours) -> Result<WattHours, InputError> {
        if energy < self.min_charge_energy || energy > self.max_charge_energy {
            return Err(InputError::ChargeEnergyOutOfRange {
                value: energy.0,
                min: self.min_charge_energy.0,
                max: self.max_charge_energy.0,
            });
        }
        Ok(energy)
    }
}

impl PowerMode {
    /// `EMS_REQ_SET_POWER_SETTINGS`
    ///
    /// Automatic mode only clears `POWER_LIMITS_USED`, the device keeps its
    /// stored limits.
    pub fn request(&self) -> Value {
        let mut settings = ContainerBuilder::new(tags::EMS_REQ_SET_POWER_SETTINGS);
        match *self {
            PowerMode::Automatic => {
                settings.append(tags::EMS_POWER_LIMITS_USED, false);
            }
            PowerMode::Manual { charge, discharge } => {
                settings
                    .append(tags::EMS_POWER_LIMITS_USED, true)
                    .append(tags::EMS_MAX_DISCHARGE_POWER, discharge.0)
                    .append(tags::EMS_MAX_CHARGE_POWER, charge.0);
            }
        }
        settings.build()
    }
}

/// `EMS_REQ_START_MANUAL_CHARGE` with the energy to charge
pub fn manual_charge_request(energy: WattHours) -> Value {
    Value::new(tags::EMS_REQ_START_MANUAL_CHARGE, energy.0)
}

/// `EMS_REQ_GET_POWER_SETTINGS`
pub fn get_power_settings_request() -> Value {
    Value::request(tags::EMS_REQ_GET_POWER_SETTINGS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_request() {
        let mode = PowerMode::Manual {
            charge: Watt(2000),
            discharge: Watt(1500),
        };
        let request = mode.request();
        assert_eq!(request.tag, tags::EMS_REQ_SET_POWER_SETTINGS);
        assert_eq!(
            request.children().unwrap(),
            &[
                Value::new(tags::EMS_POWER_LIMITS_USED, true),
                Value::new(tags::EMS_MAX_DISCHARGE_POWER, 1500u32),
                Value::new(tags::EMS_MAX_CHARGE_POWER, 2000u32),
            ]
        );
    }
    #[test]
    fn test_automatic_request() {
        let request = PowerMode::Automatic.request();
        assert_eq!(
            request.children().unwrap(),
            &[Value::new(tags::EMS_POWER_LIMITS_USED, false)]
        );
    }
    #[test]
    fn test_manual_charge_request() {
        let request = manual_charge_request(WattHours(500));
        assert_eq!(request.as_u64(), Ok(500));
        assert_eq!(request.data_type(), crate::value::DataType::UInt32 as u8);
    }
    #[test]
    fn test_bounds() {
        let bounds = PowerBounds::default();
        let ok = PowerMode::Manual {
            charge: Watt(3000),
            discharge: Watt(1),
        };
        assert_eq!(bounds.check_mode(ok), Ok(ok));
        assert_eq!(bounds.check_mode(PowerMode::Automatic), Ok(PowerMode::Automatic));
        assert_eq!(
            bounds.check_mode(PowerMode::Manual {
                charge: Watt(3001),
                discharge: Watt(100),
            }),
            Err(InputError::PowerOutOfRange {
                what: "charge limit",
                value: 3001,
                max: 3000
            })
        );
        assert!(bounds
            .check_mode(PowerMode::Manual {
                charge: Watt(100),
                discharge: Watt(0),
            })
            .is_err());
        assert_eq!(bounds.check_charge_energy(WattHours(100)), Ok(WattHours(100)));
        assert!(bounds.check_charge_energy(WattHours(99)).is_err());
        assert!(bounds.check_charge_energy(WattHours(8001)).is_err());
    }
}
