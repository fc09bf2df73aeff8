//! Record shapes decoded from each database. Every field is optional; a
//! missing key in the database decodes to its default.

use std::collections::BTreeMap;

use serde::Deserialize;

/// GeoLite2-ASN entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AsnRecord {
    pub autonomous_system_number: Option<u32>,
    pub autonomous_system_organization: Option<String>,
}

/// GeoCN entry: tiered administrative names with numeric division codes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionalRecord {
    pub province: String,
    pub province_code: u64,
    pub city: String,
    pub city_code: u64,
    pub districts: String,
    pub districts_code: u64,
    pub isp: String,
    pub net: String,
}

impl RegionalRecord {
    /// A domestic hit needs at least one administrative segment or an ISP.
    /// Sparse default entries carry neither.
    pub fn is_domestic_match(&self) -> bool {
        let has_region = [&self.province, &self.city, &self.districts]
            .iter()
            .any(|segment| !segment.trim().is_empty());
        has_region || !self.isp.trim().is_empty()
    }
}

/// Named entity in a GeoIP2 record (continent, country, subdivision, city).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeoName {
    pub geoname_id: Option<u32>,
    pub code: Option<String>,
    pub iso_code: Option<String>,
    pub names: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeoLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy_radius: Option<u16>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Traits {
    pub is_anycast: bool,
}

/// GeoIP2/GeoLite2-City entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CityRecord {
    pub continent: GeoName,
    pub country: GeoName,
    pub registered_country: GeoName,
    pub subdivisions: Vec<GeoName>,
    pub city: GeoName,
    pub location: GeoLocation,
    pub traits: Traits,
}
