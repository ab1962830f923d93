// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CONTAM project (PRJ) writer
//!
//! Renders the airflow part of a collection: a single level, one airflow
//! zone per `Zone` record and one envelope flow path from each zone to the
//! ambient. Every section is a count line, a column header, one
//! whitespace-separated row per entry and the `-999` terminator:
//!
//! ```text
//! 1 ! zones:
//! ! Z#  f  s#  c#  k#  l#  relHt  Vol  T0  P0  name  clr  uH  uV  uT  uP  rX  cfd
//! 1 3 0 0 0 1 0.0 300.0 293.15 0.0 Core_East -1 0 0 0 0 0 0
//! -999
//! ```
//!
//! Zone numbers follow the order of the `Zone` records.

use idf_lite_model::{format_double, RecordCollection, RecordInstance, RecordWriter};

const ZONE_TYPE: &str = "Zone";

/// Variable pressure and variable contaminants
const ZONE_FLAGS: u32 = 0x0003;

/// Zone number standing for the outdoors
const AMBIENT: i64 = -1;

/// Path icon for an envelope opening
const PATH_ICON: u32 = 23;

const SECTION_END: &str = "-999\n";

/// Building level holding every zone
#[derive(Clone, Debug, PartialEq)]
pub struct PrjLevel {
    pub nr: usize,
    pub reference_height: f64,
    pub delta_height: f64,
    pub name: String,
}

impl PrjLevel {
    fn row(&self) -> String {
        format!(
            "{} {} {} 0 0 0 {}\n",
            self.nr,
            format_double(self.reference_height),
            format_double(self.delta_height),
            self.name
        )
    }
}

/// Airflow zone built from a `Zone` record
#[derive(Clone, Debug, PartialEq)]
pub struct PrjZone {
    pub nr: usize,
    /// Record name with whitespace replaced, or `Zone_<nr>`
    pub name: String,
    /// m3; zero when neither the volume nor area and height are known
    pub volume: f64,
    /// Initial temperature in K
    pub temperature: f64,
    pub level: usize,
    /// m2, when known
    pub floor_area: Option<f64>,
}

impl PrjZone {
    fn row(&self) -> String {
        format!(
            "{} {} 0 0 0 {} 0.0 {} {} 0.0 {} -1 0 0 0 0 0 0\n",
            self.nr,
            ZONE_FLAGS,
            self.level,
            format_double(self.volume),
            format_double(self.temperature),
            self.name
        )
    }
}

/// Flow path between a zone and the ambient
#[derive(Clone, Debug, PartialEq)]
pub struct PrjPath {
    pub nr: usize,
    /// Zone on the `m` side
    pub zone: usize,
    pub level: usize,
    /// Height above the level, m
    pub relative_height: f64,
    pub multiplier: f64,
}

impl PrjPath {
    fn row(&self) -> String {
        format!(
            "{} 0 {} {} 0 0 0 0 0 0 {} 0.0 0.0 {} {} 0.0 0.0 0.0 0.0 0.0 0.0 {} 0 0 0 0 0 0\n",
            self.nr,
            AMBIENT,
            self.zone,
            self.level,
            format_double(self.relative_height),
            format_double(self.multiplier),
            PATH_ICON
        )
    }
}

/// Airflow network derived from a collection
#[derive(Clone, Debug, PartialEq)]
pub struct PrjNetwork {
    pub levels: Vec<PrjLevel>,
    pub zones: Vec<PrjZone>,
    pub paths: Vec<PrjPath>,
}

/// Serializes the airflow subset of a collection as a CONTAM project
#[derive(Clone, Debug)]
pub struct PrjWriter {
    temperature: f64,
    level_height: f64,
}

impl Default for PrjWriter {
    fn default() -> Self {
        Self {
            temperature: 293.15,
            level_height: 3.0,
        }
    }
}

impl PrjWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial zone temperature in K
    pub fn with_zone_temperature(mut self, kelvin: f64) -> Self {
        self.temperature = kelvin;
        self
    }

    /// Level height used when no zone gives a ceiling height
    pub fn with_level_height(mut self, meters: f64) -> Self {
        self.level_height = meters;
        self
    }

    /// Build levels, zones and envelope paths
    pub fn network(&self, collection: &RecordCollection) -> PrjNetwork {
        let records: Vec<&RecordInstance> = collection
            .iter()
            .filter(|record| record.type_name().eq_ignore_ascii_case(ZONE_TYPE))
            .collect();

        let height = records
            .iter()
            .filter_map(|record| number(record, "Ceiling Height"))
            .fold(None, |max: Option<f64>, h| Some(max.map_or(h, |m| m.max(h))))
            .unwrap_or(self.level_height);
        let level = PrjLevel {
            nr: 1,
            reference_height: 0.0,
            delta_height: height,
            name: "Level_1".to_string(),
        };

        let zones: Vec<PrjZone> = records
            .iter()
            .enumerate()
            .map(|(i, record)| self.zone(i + 1, record, level.nr))
            .collect();

        let paths = zones
            .iter()
            .enumerate()
            .map(|(i, zone)| PrjPath {
                nr: i + 1,
                zone: zone.nr,
                level: zone.level,
                relative_height: 0.5 * height,
                multiplier: zone.floor_area.unwrap_or(1.0),
            })
            .collect();

        PrjNetwork {
            levels: vec![level],
            zones,
            paths,
        }
    }

    fn zone(&self, nr: usize, record: &RecordInstance, level: usize) -> PrjZone {
        let name = match record.name() {
            Some(name) => name.split_whitespace().collect::<Vec<_>>().join("_"),
            None => format!("Zone_{}", nr),
        };
        let floor_area = number(record, "Floor Area");
        let volume = number(record, "Volume")
            .or_else(|| Some(floor_area? * number(record, "Ceiling Height")?))
            .unwrap_or_else(|| {
                log::warn!("Zone '{}' has no volume, writing 0", record.reference_text());
                0.0
            });
        PrjZone {
            nr,
            name,
            volume,
            temperature: self.temperature,
            level,
            floor_area,
        }
    }

    /// Render a collection as project text
    pub fn write_collection(&self, collection: &RecordCollection) -> String {
        let network = self.network(collection);
        let mut out = String::new();

        section(
            &mut out,
            "levels plus icon data:",
            "! #  refHt  delHt  ni  u  name",
            network.levels.iter().map(PrjLevel::row),
        );
        section(
            &mut out,
            "zones:",
            "! Z#  f  s#  c#  k#  l#  relHt  Vol  T0  P0  name  clr  uH  uV  uT  uP  rX  cfd",
            network.zones.iter().map(PrjZone::row),
        );
        section(
            &mut out,
            "flow paths:",
            "! P#  f  n#  m#  e#  f#  w#  a#  s#  c#  l#  X  Y  relHt  mult  wPset  wPmod  wazm  \
             Fahs  Xmax  Xmin  icn  dir  u..  cfd",
            network.paths.iter().map(PrjPath::row),
        );
        out.push_str("* end project file.\n");
        out
    }
}

impl RecordWriter for PrjWriter {
    fn write(&self, collection: &RecordCollection) -> String {
        self.write_collection(collection)
    }
}

/// Known positive number in a named field; absent, sentinel or foreign schemas give `None`
fn number(record: &RecordInstance, field: &str) -> Option<f64> {
    record
        .get_double(field)
        .ok()
        .flatten()
        .filter(|v| *v > 0.0)
}

fn section(
    out: &mut String,
    title: &str,
    header: &str,
    rows: impl ExactSizeIterator<Item = String>,
) {
    out.push_str(&format!("{} ! {}\n", rows.len(), title));
    out.push_str(header);
    out.push('\n');
    for row in rows {
        out.push_str(&row);
    }
    out.push_str(SECTION_END);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundled_schema;

    fn zone(collection: &mut RecordCollection, name: &str, fields: &[(&str, f64)]) {
        let mut record = collection.new_record("Zone").unwrap();
        record.set_name(name).unwrap();
        for (field, value) in fields {
            record.set_double(field, *value).unwrap();
        }
        collection.add(record).unwrap();
    }

    fn collection() -> RecordCollection {
        let mut collection = RecordCollection::new(bundled_schema().unwrap());
        zone(
            &mut collection,
            "Core East",
            &[("Ceiling Height", 2.8), ("Volume", 300.0), ("Floor Area", 100.0)],
        );
        zone(&mut collection, "Attic", &[("Floor Area", 50.0), ("Ceiling Height", 4.0)]);
        zone(&mut collection, "Plenum", &[]);
        collection.create("ScheduleTypeLimits").unwrap();
        collection
    }

    #[test]
    fn test_network_from_zone_records() {
        let network = PrjWriter::new().network(&collection());
        assert_eq!(network.levels.len(), 1);
        assert_eq!(network.levels[0].delta_height, 4.0);

        let names: Vec<&str> = network.zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, ["Core_East", "Attic", "Plenum"]);
        assert_eq!(network.zones[0].volume, 300.0);
        assert_eq!(network.zones[1].volume, 200.0);
        assert_eq!(network.zones[2].volume, 0.0);

        assert_eq!(network.paths.len(), 3);
        assert_eq!(network.paths[1].zone, 2);
        assert_eq!(network.paths[1].multiplier, 50.0);
        assert_eq!(network.paths[2].multiplier, 1.0);
        assert_eq!(network.paths[0].relative_height, 2.0);
    }

    #[test]
    fn test_project_text_layout() {
        let text = PrjWriter::new().write_collection(&collection());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "1 ! levels plus icon data:");
        assert_eq!(lines[2], "1 0.0 4.0 0 0 0 Level_1");
        assert_eq!(lines[3], "-999");
        assert_eq!(lines[4], "3 ! zones:");
        assert_eq!(lines[6], "1 3 0 0 0 1 0.0 300.0 293.15 0.0 Core_East -1 0 0 0 0 0 0");
        assert_eq!(lines[9], "-999");
        assert_eq!(lines[10], "3 ! flow paths:");
        assert_eq!(
            lines[12],
            "1 0 -1 1 0 0 0 0 0 0 1 0.0 0.0 2.0 100.0 0.0 0.0 0.0 0.0 0.0 0.0 23 0 0 0 0 0 0"
        );
        assert_eq!(lines.last(), Some(&"* end project file."));

        // Every row of a section has the same number of columns
        let zone_columns: Vec<usize> = lines[6..9]
            .iter()
            .map(|line| line.split_whitespace().count())
            .collect();
        assert_eq!(zone_columns, [18, 18, 18]);
        assert_eq!(lines[12].split_whitespace().count(), 28);
    }

    #[test]
    fn test_empty_collection_and_options() {
        let empty = RecordCollection::new(bundled_schema().unwrap());
        let writer = PrjWriter::new()
            .with_level_height(2.5)
            .with_zone_temperature(295.0);
        let text = writer.write(&empty);
        assert!(text.contains("1 0.0 2.5 0 0 0 Level_1\n"));
        assert!(text.contains("0 ! zones:\n"));
        assert!(text.contains("0 ! flow paths:\n"));

        let network = writer.network(&collection());
        assert_eq!(network.zones[0].temperature, 295.0);
    }
}
