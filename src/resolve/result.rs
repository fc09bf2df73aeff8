use std::net::IpAddr;

use serde::Serialize;

use super::region::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IpVersion {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl From<&IpAddr> for IpVersion {
    fn from(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

/// Merged answer for one address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpInfo {
    pub ip: String,
    pub version: IpVersion,
    pub asn: AsnInfo,
    pub network: NetworkInfo,
    pub location: Location,
    pub isp: IspInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AsnInfo {
    pub number: u32,
    pub name: String,
    /// Carrier label, e.g. 中国电信.
    pub info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    pub cidr: String,
    pub start_ip: String,
    pub end_ip: String,
    pub total_ips: u128,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Code and display name of a continent or country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Area {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_radius: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub continent: Area,
    pub country: Area,
    pub regions: Vec<Region>,
    pub coordinates: Option<Coordinates>,
    pub timezone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IspInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}
