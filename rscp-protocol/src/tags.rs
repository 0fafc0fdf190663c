//! Tag identifiers and the built-in tag table
//!
//! A tag is a 32 bit identifier. The most significant byte selects the
//! namespace (`RSCP`, `EMS`, `BAT`, `DB`, ...). Setting [Tag::RESPONSE_BIT]
//! (the high bit of the second byte) turns a request tag into the tag the
//! device answers with, e.g. `EMS_REQ_POWER_PV` (`0x01000001`) is answered
//! with `EMS_POWER_PV` (`0x01800001`).
//!
//! Tags are listed here in their request form. Field tags that appear both in
//! requests and in responses (like [BAT_INDEX]) are matched on
//! [Tag::request], so either form resolves to the same constant.

use core::fmt::{Debug, Display};

/// A 32 bit RSCP tag
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    /// Synthetic root container tag, never sent as a real tag
    pub const ROOT: Tag = Tag(0);
    /// Marks a response tag
    pub const RESPONSE_BIT: u32 = 0x0080_0000;

    pub const fn is_response(self) -> bool {
        self.0 & Self::RESPONSE_BIT != 0
    }
    /// The response form of this tag
    pub const fn response(self) -> Tag {
        Tag(self.0 | Self::RESPONSE_BIT)
    }
    /// The request form of this tag
    pub const fn request(self) -> Tag {
        Tag(self.0 & !Self::RESPONSE_BIT)
    }
    pub const fn namespace(self) -> Namespace {
        Namespace((self.0 >> 24) as u8)
    }
}
impl From<u32> for Tag {
    fn from(value: u32) -> Self {
        Tag(value)
    }
}
impl Display for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
impl Debug for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Tag(0x{:08X})", self.0)
    }
}

/// Tag namespace (most significant byte of the tag)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace(pub u8);

impl Namespace {
    pub const RSCP: Namespace = Namespace(0x00);
    pub const EMS: Namespace = Namespace(0x01);
    pub const PVI: Namespace = Namespace(0x02);
    pub const BAT: Namespace = Namespace(0x03);
    pub const DCDC: Namespace = Namespace(0x04);
    pub const PM: Namespace = Namespace(0x05);
    pub const DB: Namespace = Namespace(0x06);
    pub const INFO: Namespace = Namespace(0x0A);
}

macro_rules! tag_table {
    (
        pairs { $($(#[$pdoc:meta])* $req:ident / $resp:ident = $pvalue:expr;)* }
        fields { $($(#[$fdoc:meta])* $field:ident = $fvalue:expr;)* }
    ) => {
        $(
            $(#[$pdoc])*
            pub const $req: Tag = Tag($pvalue);
            #[doc = concat!("Response to [", stringify!($req), "]")]
            pub const $resp: Tag = Tag($pvalue | Tag::RESPONSE_BIT);
        )*
        $(
            $(#[$fdoc])*
            pub const $field: Tag = Tag($fvalue);
        )*

        /// Names of all built-in tags
        pub(crate) const TABLE: &[(&str, Tag)] = &[
            $((stringify!($req), $req), (stringify!($resp), $resp),)*
            $((stringify!($field), $field),)*
        ];
    };
}

tag_table! {
    pairs {
        /// Authentication request container (user + password)
        RSCP_REQ_AUTHENTICATION / RSCP_AUTHENTICATION = 0x0000_0001;

        /// PV power in W (`i32`)
        EMS_REQ_POWER_PV / EMS_POWER_PV = 0x0100_0001;
        /// Battery power in W (`i32`), positive while charging
        EMS_REQ_POWER_BAT / EMS_POWER_BAT = 0x0100_0002;
        /// House consumption in W (`i32`)
        EMS_REQ_POWER_HOME / EMS_POWER_HOME = 0x0100_0003;
        /// Grid power in W (`i32`), positive while drawing from the grid
        EMS_REQ_POWER_GRID / EMS_POWER_GRID = 0x0100_0004;
        /// Additional power meter in W (`i32`)
        EMS_REQ_POWER_ADD / EMS_POWER_ADD = 0x0100_0005;
        /// Autarky in % (`f32`)
        EMS_REQ_AUTARKY / EMS_AUTARKY = 0x0100_0006;
        /// Self consumption in % (`f32`)
        EMS_REQ_SELF_CONSUMPTION / EMS_SELF_CONSUMPTION = 0x0100_0007;
        /// Battery state of charge in % (`u8`)
        EMS_REQ_BAT_SOC / EMS_BAT_SOC = 0x0100_0008;
        /// Coupling mode (`u8`)
        EMS_REQ_COUPLING_MODE / EMS_COUPLING_MODE = 0x0100_0009;
        EMS_REQ_GET_POWER_SETTINGS / EMS_GET_POWER_SETTINGS = 0x0100_008B;
        EMS_REQ_SET_POWER_SETTINGS / EMS_SET_POWER_SETTINGS = 0x0100_008C;
        /// Start a manual charge of the given energy in Wh (`u32`)
        EMS_REQ_START_MANUAL_CHARGE / EMS_START_MANUAL_CHARGE = 0x0100_008F;

        /// Battery data container
        BAT_REQ_DATA / BAT_DATA = 0x0304_0000;
        /// Relative state of charge in % (`f32`)
        BAT_REQ_RSOC / BAT_RSOC = 0x0300_0001;
        /// Module voltage in V (`f32`)
        BAT_REQ_MODULE_VOLTAGE / BAT_MODULE_VOLTAGE = 0x0300_0002;
        /// Battery current in A (`f32`)
        BAT_REQ_CURRENT / BAT_CURRENT = 0x0300_0003;
        BAT_REQ_MAX_BAT_VOLTAGE / BAT_MAX_BAT_VOLTAGE = 0x0300_0004;
        BAT_REQ_CHARGE_CYCLES / BAT_CHARGE_CYCLES = 0x0300_0008;
        BAT_REQ_MAX_DCB_CELL_TEMPERATURE / BAT_MAX_DCB_CELL_TEMPERATURE = 0x0300_000C;
        BAT_REQ_MIN_DCB_CELL_TEMPERATURE / BAT_MIN_DCB_CELL_TEMPERATURE = 0x0300_000D;
        /// Number of DCBs (`u8`)
        BAT_REQ_DCB_COUNT / BAT_DCB_COUNT = 0x0300_0013;
        /// All cell temperatures of one DCB, request value is the DCB index (`u16`)
        BAT_REQ_DCB_ALL_CELL_TEMPERATURES / BAT_DCB_ALL_CELL_TEMPERATURES = 0x0300_0018;
        /// All cell voltages of one DCB, request value is the DCB index (`u16`)
        BAT_REQ_DCB_ALL_CELL_VOLTAGES / BAT_DCB_ALL_CELL_VOLTAGES = 0x0300_0019;
        /// Info block of one DCB, request value is the DCB index (`u16`)
        BAT_REQ_DCB_INFO / BAT_DCB_INFO = 0x0300_0042;
        BAT_REQ_STATUS_CODE / BAT_STATUS_CODE = 0x0300_0102;
        BAT_REQ_ERROR_CODE / BAT_ERROR_CODE = 0x0300_0103;

        DB_REQ_HISTORY_DATA_DAY / DB_HISTORY_DATA_DAY = 0x0600_0100;
        DB_REQ_HISTORY_DATA_WEEK / DB_HISTORY_DATA_WEEK = 0x0600_0200;
        DB_REQ_HISTORY_DATA_MONTH / DB_HISTORY_DATA_MONTH = 0x0600_0300;
        DB_REQ_HISTORY_DATA_YEAR / DB_HISTORY_DATA_YEAR = 0x0600_0400;

        INFO_REQ_SERIAL_NUMBER / INFO_SERIAL_NUMBER = 0x0A00_0001;
        INFO_REQ_PRODUCTION_DATE / INFO_PRODUCTION_DATE = 0x0A00_0002;
        INFO_REQ_SW_RELEASE / INFO_SW_RELEASE = 0x0A00_000D;
        INFO_REQ_TIME / INFO_TIME = 0x0A00_000F;
    }
    fields {
        RSCP_AUTHENTICATION_USER = 0x0000_0002;
        RSCP_AUTHENTICATION_PASSWORD = 0x0000_0003;

        EMS_POWER_LIMITS_USED = 0x0100_0100;
        EMS_MAX_CHARGE_POWER = 0x0100_0101;
        EMS_MAX_DISCHARGE_POWER = 0x0100_0102;
        EMS_DISCHARGE_START_POWER = 0x0100_0103;
        EMS_POWERSAVE_ENABLED = 0x0100_0104;
        EMS_WEATHER_REGULATED_CHARGE_ENABLED = 0x0100_0105;

        /// Battery index inside a [BAT_REQ_DATA] container
        BAT_INDEX = 0x0304_0001;
        /// DCB index marker inside DCB containers
        BAT_DCB_INDEX = 0x0300_0100;
        BAT_DCB_SOC = 0x0300_0109;
        BAT_DCB_VOLTAGE = 0x0300_010B;
        BAT_DCB_CURRENT = 0x0300_010C;
        BAT_DCB_CYCLE_COUNT = 0x0300_010D;

        DB_REQ_HISTORY_TIME_START = 0x0600_0101;
        DB_REQ_HISTORY_TIME_INTERVAL = 0x0600_0102;
        DB_REQ_HISTORY_TIME_SPAN = 0x0600_0103;
        /// Graph slot marker inside a [DB_VALUE_CONTAINER]
        DB_GRAPH_INDEX = 0x0600_0001;
        DB_BAT_POWER_IN = 0x0600_0002;
        DB_BAT_POWER_OUT = 0x0600_0003;
        DB_DC_POWER = 0x0600_0004;
        DB_GRID_POWER_IN = 0x0600_0005;
        DB_GRID_POWER_OUT = 0x0600_0006;
        DB_CONSUMPTION = 0x0600_0007;
        DB_PM_0_POWER = 0x0600_0008;
        DB_PM_1_POWER = 0x0600_0009;
        DB_BAT_CHARGE_LEVEL = 0x0600_000A;
        DB_BAT_CYCLE_COUNT = 0x0600_000B;
        DB_CONSUMED_PRODUCTION = 0x0600_000C;
        DB_AUTARKY = 0x0600_000D;
        /// Totals over the whole history span
        DB_SUM_CONTAINER = 0x0600_0020;
        /// One slot of a history span
        DB_VALUE_CONTAINER = 0x0600_0040;
    }
}

/// Look up a built-in tag by name
pub fn by_name(name: &str) -> Option<Tag> {
    TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, tag)| *tag)
}

/// Look up the built-in name of a tag
///
/// Falls back to the request form for field tags that are only listed once.
pub fn name_of(tag: Tag) -> Option<&'static str> {
    let exact = |tag: Tag| TABLE.iter().find(|(_, known)| *known == tag);
    exact(tag)
        .or_else(|| exact(tag.request()))
        .map(|(name, _)| *name)
}
