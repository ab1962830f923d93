// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SI/IP unit conversion for field quantities
//!
//! Schema fields store SI values. Each conversion is `ip = si * factor + offset`.

/// One SI to IP conversion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conversion {
    pub si: &'static str,
    pub ip: &'static str,
    pub factor: f64,
    pub offset: f64,
}

const fn linear(si: &'static str, ip: &'static str, factor: f64) -> Conversion {
    Conversion {
        si,
        ip,
        factor,
        offset: 0.0,
    }
}

/// Conversion table, first entry per SI unit is its default IP unit
pub const CONVERSIONS: &[Conversion] = &[
    linear("m", "ft", 3.280_839_895),
    linear("m", "in", 39.370_078_74),
    linear("m2", "ft2", 10.763_910_42),
    linear("m3", "ft3", 35.314_666_72),
    linear("m3", "gal", 264.172_052_4),
    linear("m3/s", "ft3/min", 2118.880_003),
    linear("m3/s", "gal/min", 15_850.323_14),
    linear("m/s", "ft/min", 196.850_393_7),
    linear("W", "Btu/h", 3.412_141_633),
    linear("W/m2", "Btu/h-ft2", 0.316_998_331),
    linear("W/person", "Btu/h-person", 3.412_141_633),
    linear("W/m2-K", "Btu/h-ft2-F", 0.176_110_2),
    linear("J", "Btu", 0.000_947_817_1),
    linear("kg", "lb", 2.204_622_622),
    linear("kg/s", "lb/s", 2.204_622_622),
    linear("Pa", "psi", 0.000_145_037_7),
    linear("deltaC", "deltaF", 1.8),
    linear("deg", "deg", 1.0),
    Conversion {
        si: "C",
        ip: "F",
        factor: 1.8,
        offset: 32.0,
    },
];

fn find(si: &str, ip: &str) -> Option<&'static Conversion> {
    CONVERSIONS.iter().find(|c| c.si == si && c.ip == ip)
}

/// Default IP display unit for an SI unit
pub fn default_ip_unit(si: &str) -> Option<&'static str> {
    CONVERSIONS.iter().find(|c| c.si == si).map(|c| c.ip)
}

/// Convert a value between two units of the table, in either direction
///
/// Returns `None` when no conversion between the units is known.
pub fn convert(value: f64, from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(value);
    }
    if let Some(c) = find(from, to) {
        return Some(value * c.factor + c.offset);
    }
    find(to, from).map(|c| (value - c.offset) / c.factor)
}
