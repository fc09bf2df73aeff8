//! Administrative region normalization.
//!
//! Tiered sources report separate province/city/district strings; those are
//! classified by suffix and completed with their canonical suffix. Localized
//! sources report one name map per level and go through [`localized_name`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::geo::{CityRecord, RegionalRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLevel {
    Province,
    City,
    District,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub level: RegionLevel,
}

/// One raw segment of a tiered source and the slot it was reported in.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub name: &'a str,
    pub code: u64,
    pub slot: RegionLevel,
}

const CITY_SUFFIXES: &[&str] = &["市", "自治州", "地区", "盟"];
const DISTRICT_SUFFIXES: &[&str] = &["区", "县", "旗"];
const CITY_SUFFIX: &str = "市";
const DISTRICT_SUFFIX: &str = "区";

/// Province-level divisions: short name and full administrative name.
const PROVINCES: &[(&str, &str)] = &[
    ("北京", "北京市"),
    ("天津", "天津市"),
    ("上海", "上海市"),
    ("重庆", "重庆市"),
    ("河北", "河北省"),
    ("山西", "山西省"),
    ("辽宁", "辽宁省"),
    ("吉林", "吉林省"),
    ("黑龙江", "黑龙江省"),
    ("江苏", "江苏省"),
    ("浙江", "浙江省"),
    ("安徽", "安徽省"),
    ("福建", "福建省"),
    ("江西", "江西省"),
    ("山东", "山东省"),
    ("河南", "河南省"),
    ("湖北", "湖北省"),
    ("湖南", "湖南省"),
    ("广东", "广东省"),
    ("海南", "海南省"),
    ("四川", "四川省"),
    ("贵州", "贵州省"),
    ("云南", "云南省"),
    ("陕西", "陕西省"),
    ("甘肃", "甘肃省"),
    ("青海", "青海省"),
    ("台湾", "台湾省"),
    ("内蒙古", "内蒙古自治区"),
    ("广西", "广西壮族自治区"),
    ("西藏", "西藏自治区"),
    ("宁夏", "宁夏回族自治区"),
    ("新疆", "新疆维吾尔自治区"),
    ("香港", "香港特别行政区"),
    ("澳门", "澳门特别行政区"),
];

fn canonical_province(name: &str) -> Option<&'static str> {
    PROVINCES
        .iter()
        .find(|(short, full)| name == *short || name == *full)
        .map(|(_, full)| *full)
}

fn ends_with_any(name: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix))
}

fn classify(segment: &Segment<'_>) -> (RegionLevel, String) {
    let name = segment.name.trim();
    if segment.slot == RegionLevel::Province {
        if let Some(full) = canonical_province(name) {
            return (RegionLevel::Province, full.to_string());
        }
    }

    let level = if ends_with_any(name, CITY_SUFFIXES) {
        RegionLevel::City
    } else if ends_with_any(name, DISTRICT_SUFFIXES) {
        RegionLevel::District
    } else {
        segment.slot
    };

    let name = match level {
        RegionLevel::City if !ends_with_any(name, CITY_SUFFIXES) => format!("{name}{CITY_SUFFIX}"),
        RegionLevel::District if !ends_with_any(name, DISTRICT_SUFFIXES) => {
            format!("{name}{DISTRICT_SUFFIX}")
        }
        _ => name.to_string(),
    };
    (level, name)
}

fn code_string(code: u64) -> String {
    if code == 0 {
        String::new()
    } else {
        code.to_string()
    }
}

fn push_distinct(regions: &mut Vec<Region>, region: Region) {
    if regions.last().is_some_and(|last| last.name == region.name) {
        return;
    }
    regions.push(region);
}

/// Normalizes tiered segments, broad to narrow. Empty segments are dropped
/// and adjacent repeats collapse into the broader entry.
pub fn normalize_segments(segments: &[Segment<'_>]) -> Vec<Region> {
    let mut regions = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.name.trim().is_empty() {
            continue;
        }
        let (level, name) = classify(segment);
        push_distinct(
            &mut regions,
            Region {
                code: code_string(segment.code),
                name,
                level,
            },
        );
    }
    regions
}

pub fn from_regional(record: &RegionalRecord) -> Vec<Region> {
    normalize_segments(&[
        Segment {
            name: &record.province,
            code: record.province_code,
            slot: RegionLevel::Province,
        },
        Segment {
            name: &record.city,
            code: record.city_code,
            slot: RegionLevel::City,
        },
        Segment {
            name: &record.districts,
            code: record.districts_code,
            slot: RegionLevel::District,
        },
    ])
}

/// Subdivisions (broad to narrow) followed by the city. Entries without a
/// name in either language are omitted.
pub fn from_city(record: &CityRecord, preferred: &str, fallback: &str) -> Vec<Region> {
    let mut regions = Vec::new();
    for subdivision in &record.subdivisions {
        if let Some(name) = localized_name(&subdivision.names, preferred, fallback) {
            push_distinct(
                &mut regions,
                Region {
                    code: subdivision.iso_code.clone().unwrap_or_default(),
                    name,
                    level: RegionLevel::Province,
                },
            );
        }
    }
    if let Some(name) = localized_name(&record.city.names, preferred, fallback) {
        push_distinct(
            &mut regions,
            Region {
                code: record
                    .city
                    .geoname_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                name,
                level: RegionLevel::City,
            },
        );
    }
    regions
}

/// Name in `preferred`, else in `fallback`. Empty names count as missing.
pub fn localized_name(
    names: &BTreeMap<String, String>,
    preferred: &str,
    fallback: &str,
) -> Option<String> {
    [preferred, fallback]
        .into_iter()
        .filter_map(|lang| names.get(lang))
        .find(|name| !name.trim().is_empty())
        .cloned()
}
