//! # Autonomous configuration
//!
//! Values picked by the drive team before a match. They are normally selected
//! on a menu and are loaded here from a parameter file.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest start delay that can be selected.
///
/// Units: seconds
pub const MAX_DELAY_START_S: u32 = 15;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alliance {
    Red,
    Blue,
}

/// Where the robot starts. Back is towards the warehouse, front towards the
/// audience.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartPosition {
    None,
    Back,
    Front,
}

/// Where the robot parks at the end of the routine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParkLocation {
    None,
    WarehouseFront,
    WarehouseBack,
    StorageUnit,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoConfig {
    pub alliance: Alliance,
    pub start_position: StartPosition,
    pub park_location: ParkLocation,
    pub deliver_duck: bool,
    pub deliver_freight: bool,

    /// Delay before the first leg, kept within `0..=MAX_DELAY_START_S`.
    ///
    /// Units: seconds
    pub delay_start_s: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StartPosition {
    /// The next option, wrapping round.
    pub fn next(self) -> Self {
        match self {
            StartPosition::None => StartPosition::Back,
            StartPosition::Back => StartPosition::Front,
            StartPosition::Front => StartPosition::None,
        }
    }
}

impl ParkLocation {
    /// The next option, wrapping round.
    pub fn next(self) -> Self {
        match self {
            ParkLocation::None => ParkLocation::WarehouseFront,
            ParkLocation::WarehouseFront => ParkLocation::WarehouseBack,
            ParkLocation::WarehouseBack => ParkLocation::StorageUnit,
            ParkLocation::StorageUnit => ParkLocation::None,
        }
    }

    fn script_suffix(self) -> Option<&'static str> {
        match self {
            ParkLocation::None => None,
            ParkLocation::WarehouseFront => Some("warehouse_front"),
            ParkLocation::WarehouseBack => Some("warehouse_back"),
            ParkLocation::StorageUnit => Some("storage_unit"),
        }
    }
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            alliance: Alliance::Red,
            start_position: StartPosition::None,
            park_location: ParkLocation::None,
            deliver_duck: false,
            deliver_freight: false,
            delay_start_s: 0,
        }
    }
}

impl AutoConfig {
    /// Load the configuration from a file relative to the parameters
    /// directory.
    pub fn load(param_file_path: &str) -> Result<Self, util::params::LoadError> {
        util::params::load(param_file_path)
    }

    /// Start delay, limited to the selectable range.
    ///
    /// Units: seconds
    pub fn delay_start_s(&self) -> f64 {
        self.delay_start_s.min(MAX_DELAY_START_S) as f64
    }

    /// Step the start delay up or down by one second, wrapping past either end
    /// of the range.
    pub fn increment_delay(&mut self) {
        self.delay_start_s = match self.delay_start_s {
            d if d >= MAX_DELAY_START_S => 0,
            d => d + 1,
        };
    }

    pub fn decrement_delay(&mut self) {
        self.delay_start_s = match self.delay_start_s {
            0 => MAX_DELAY_START_S,
            d => d.min(MAX_DELAY_START_S + 1) - 1,
        };
    }

    /// Candidate leg script names for this configuration, most specific
    /// first. A script for the chosen park location is preferred over the
    /// plain alliance and start position script. Empty if no start position
    /// was selected.
    pub fn script_names(&self) -> Vec<String> {
        let alliance = match self.alliance {
            Alliance::Red => "red",
            Alliance::Blue => "blue",
        };

        let start = match self.start_position {
            StartPosition::None => return Vec::new(),
            StartPosition::Back => "back",
            StartPosition::Front => "front",
        };

        let base = format!("{}_{}", alliance, start);
        let mut names = Vec::with_capacity(2);

        if let Some(park) = self.park_location.script_suffix() {
            names.push(format!("{}_{}.auto", base, park));
        }
        names.push(format!("{}.auto", base));

        names
    }

    /// One line description of what the routine should do.
    pub fn objectives(&self) -> String {
        let mut objectives = Vec::new();

        if self.deliver_duck {
            objectives.push("deliver duck".to_string());
        }
        if self.deliver_freight {
            objectives.push("deliver freight".to_string());
        }
        match self.park_location {
            ParkLocation::None => (),
            p => objectives.push(format!("park in {:?}", p)),
        }

        if objectives.is_empty() {
            "none".to_string()
        }
        else {
            objectives.join(", ")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let c: AutoConfig = util::params::from_str("").unwrap();
        assert_eq!(c, AutoConfig::default());
        assert!(c.script_names().is_empty());
        assert_eq!(c.objectives(), "none");
        assert_eq!(c.delay_start_s(), 0.0);
    }

    #[test]
    fn test_load_from_toml() {
        let c: AutoConfig = util::params::from_str(
            "alliance = \"Blue\"\n\
             start_position = \"Front\"\n\
             park_location = \"StorageUnit\"\n\
             deliver_duck = true\n\
             delay_start_s = 40\n",
        )
        .unwrap();

        assert_eq!(c.alliance, Alliance::Blue);
        assert_eq!(c.park_location, ParkLocation::StorageUnit);
        assert!(c.deliver_duck);
        assert!(!c.deliver_freight);
        assert_eq!(c.delay_start_s(), 15.0);
        assert_eq!(
            c.script_names(),
            vec!["blue_front_storage_unit.auto".to_string(), "blue_front.auto".to_string()]
        );
        assert_eq!(c.objectives(), "deliver duck, park in StorageUnit");
    }

    #[test]
    fn test_delay_wraps() {
        let mut c = AutoConfig::default();
        c.decrement_delay();
        assert_eq!(c.delay_start_s, 15);
        c.increment_delay();
        assert_eq!(c.delay_start_s, 0);
        c.increment_delay();
        assert_eq!(c.delay_start_s, 1);

        c.delay_start_s = 40;
        c.decrement_delay();
        assert_eq!(c.delay_start_s, 15);
    }

    #[test]
    fn test_options_cycle() {
        assert_eq!(StartPosition::Front.next(), StartPosition::None);
        let mut p = ParkLocation::None;
        for _ in 0..4 {
            p = p.next();
        }
        assert_eq!(p, ParkLocation::None);
    }

    #[test]
    fn test_script_without_park() {
        let c = AutoConfig {
            alliance: Alliance::Red,
            start_position: StartPosition::Back,
            deliver_freight: true,
            ..AutoConfig::default()
        };

        assert_eq!(c.script_names(), vec!["red_back.auto".to_string()]);
        assert_eq!(c.objectives(), "deliver freight");
    }
}
