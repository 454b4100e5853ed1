//! Descriptor fingerprint used to tell the relay board apart from other
//! CH341A gadgets.
//!
//! The vendor/product pair belongs to the bridge chip maker, not the board,
//! so it is not unique for this hardware family.  A board qualifies when its
//! descriptors match all of:
//!
//! | field                                  | value      |
//! |----------------------------------------|------------|
//! | `bNumConfigurations`                   | 1          |
//! | `bMaxPower` (2 mA units)               | 48 (96 mA) |
//! | `bNumInterfaces`                       | 1          |
//! | `bNumEndpoints` on active alt setting  | 3          |

/// Required `bMaxPower`; 96 mA is an unusual value.
pub const MAX_POWER_UNITS: u8 = 48;

/// Descriptor fields sampled at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFingerprint {
    pub num_configurations: u8,
    pub max_power: u8,
    pub num_interfaces: u8,
    pub num_endpoints: u8,
}

impl DeviceFingerprint {
    /// The fingerprint of a genuine relay board.
    pub const RELAY_BOARD: Self = Self {
        num_configurations: 1,
        max_power: MAX_POWER_UNITS,
        num_interfaces: 1,
        num_endpoints: 3,
    };

    pub fn matches_relay_board(&self) -> bool {
        *self == Self::RELAY_BOARD
    }

    /// Declared maximum current in milliamps.
    pub fn max_power_ma(&self) -> u16 {
        u16::from(self.max_power) * 2
    }
}
