use std::net::IpAddr;

mod network;
pub mod region;
mod result;

pub use network::{Network, NetworkRange};
pub use region::{Region, RegionLevel, localized_name};
pub use result::{
    Area, AsnInfo, Coordinates, IpInfo, IpVersion, IspInfo, Location, NetworkInfo,
};

use crate::{
    Error,
    config::Language,
    geo::{
        AsnRecord, CityRecord, GeoDatabases, GeoLocation, GeoName, GeoSource, Hit,
        RegionalRecord, carrier_label,
    },
};

const DOMESTIC_COUNTRY_CODE: &str = "CN";
const DOMESTIC_COUNTRY_NAME: &str = "中国";
const DOMESTIC_TIMEZONE: &str = "Asia/Shanghai";
const DEFAULT_NETWORK_TYPE: &str = "宽带";

/// How a source's value treats a field that is already filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precedence {
    /// Replaces the current value.
    Authoritative,
    /// Fills the field only when it is still empty.
    Backfill,
}

impl Precedence {
    fn apply<T>(self, slot: &mut Option<T>, value: Option<T>) {
        let Some(value) = value else {
            return;
        };
        if self == Precedence::Authoritative || slot.is_none() {
            *slot = Some(value);
        }
    }
}

/// Location fields contributed by a single source.
#[derive(Debug, Default)]
struct LocationFields {
    continent: Option<Area>,
    country: Option<Area>,
    regions: Vec<Region>,
    coordinates: Option<Coordinates>,
    timezone: Option<String>,
}

#[derive(Debug)]
struct Draft {
    ip: IpAddr,
    asn_number: Option<u32>,
    asn_name: Option<String>,
    asn_info: Option<String>,
    network: Option<Network>,
    network_type: Option<String>,
    isp_name: Option<String>,
    isp_type: Option<String>,
    location: LocationFields,
}

impl Draft {
    fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            asn_number: None,
            asn_name: None,
            asn_info: None,
            network: None,
            network_type: None,
            isp_name: None,
            isp_type: None,
            location: LocationFields::default(),
        }
    }

    fn merge_location(&mut self, incoming: LocationFields, precedence: Precedence) {
        let location = &mut self.location;
        precedence.apply(&mut location.continent, incoming.continent);
        precedence.apply(&mut location.coordinates, incoming.coordinates);
        precedence.apply(&mut location.timezone, incoming.timezone);
        // country and regions never come from a backfilling source
        if precedence == Precedence::Authoritative {
            precedence.apply(&mut location.country, incoming.country);
            if !incoming.regions.is_empty() {
                location.regions = incoming.regions;
            }
        }
    }

    /// The first source to report a network keeps it.
    fn merge_network(&mut self, network: Option<Network>) {
        Precedence::Backfill.apply(&mut self.network, network);
    }

    fn finish(self) -> IpInfo {
        let network = match self.network {
            Some(network) => network,
            None => {
                debug!("no source network for {}, using fallback", self.ip);
                Network::fallback_for(self.ip)
            }
        };
        let range = network.range();
        let location = self.location;

        IpInfo {
            ip: self.ip.to_string(),
            version: IpVersion::from(&self.ip),
            asn: AsnInfo {
                number: self.asn_number.unwrap_or_default(),
                name: self.asn_name.unwrap_or_default(),
                info: self.asn_info.unwrap_or_default(),
            },
            network: NetworkInfo {
                cidr: network.to_string(),
                start_ip: range.start.to_string(),
                end_ip: range.end.to_string(),
                total_ips: range.total,
                kind: self
                    .network_type
                    .unwrap_or_else(|| DEFAULT_NETWORK_TYPE.to_string()),
            },
            location: Location {
                continent: location.continent.unwrap_or_default(),
                country: location.country.unwrap_or_default(),
                regions: location.regions,
                coordinates: location.coordinates,
                timezone: location.timezone.unwrap_or_default(),
            },
            isp: IspInfo {
                name: self.isp_name.unwrap_or_default(),
                kind: self.isp_type.unwrap_or_default(),
            },
        }
    }
}

/// Merges the ASN, domestic and global city sources into one [`IpInfo`].
///
/// The domestic source wins for location when it has a real match; the city
/// source then only fills continent, coordinates and timezone. Without a
/// domestic match the city source supplies the whole location.
pub struct Resolver {
    asn: Box<dyn GeoSource<AsnRecord>>,
    regional: Box<dyn GeoSource<RegionalRecord>>,
    city: Box<dyn GeoSource<CityRecord>>,
    language: Language,
}

impl Resolver {
    pub fn new(databases: GeoDatabases, language: Language) -> Self {
        let GeoDatabases { asn, city, geo_cn } = databases;
        Self::with_sources(Box::new(asn), Box::new(geo_cn), Box::new(city), language)
    }

    pub fn with_sources(
        asn: Box<dyn GeoSource<AsnRecord>>,
        regional: Box<dyn GeoSource<RegionalRecord>>,
        city: Box<dyn GeoSource<CityRecord>>,
        language: Language,
    ) -> Self {
        Self {
            asn,
            regional,
            city,
            language,
        }
    }

    /// Parses `input` and resolves it. An unparsable address is the only
    /// error; source misses and failures yield a sparser record.
    pub fn resolve(&self, input: &str) -> Result<IpInfo, Error> {
        let ip: IpAddr = input.parse().map_err(|_err| {
            warn!("invalid ip address: {}", input);
            Error::invalid_ip(input)
        })?;
        Ok(self.resolve_addr(ip))
    }

    pub fn resolve_addr(&self, ip: IpAddr) -> IpInfo {
        let ip = ip.to_canonical();
        debug!("resolve {}", ip);

        let mut draft = Draft::new(ip);
        self.apply_asn(&mut draft);
        if !self.apply_regional(&mut draft) {
            self.apply_city(&mut draft, Precedence::Authoritative);
        }
        draft.finish()
    }

    fn apply_asn(&self, draft: &mut Draft) {
        let Some(Hit { record, network }) = query(self.asn.as_ref(), draft.ip) else {
            return;
        };
        let organization = record
            .autonomous_system_organization
            .filter(|org| !org.trim().is_empty());

        draft.asn_number = record.autonomous_system_number;
        draft.asn_name = organization.clone();
        draft.isp_name = organization;
        if let Some(label) = record.autonomous_system_number.and_then(carrier_label) {
            draft.asn_info = Some(label.to_string());
            draft.isp_type = Some(label.to_string());
        }
        draft.merge_network(network);
    }

    /// Returns whether the domestic source took over the location.
    fn apply_regional(&self, draft: &mut Draft) -> bool {
        let Some(Hit { record, network }) = query(self.regional.as_ref(), draft.ip) else {
            return false;
        };
        if !record.is_domestic_match() {
            debug!("{} record for {} is empty", self.regional.name(), draft.ip);
            return false;
        }

        let isp = non_empty(&record.isp);
        Precedence::Authoritative.apply(&mut draft.isp_name, isp.clone());
        Precedence::Authoritative.apply(&mut draft.isp_type, isp.clone());
        Precedence::Authoritative.apply(&mut draft.asn_info, isp);
        Precedence::Authoritative.apply(&mut draft.network_type, non_empty(&record.net));
        draft.merge_location(domestic_location(&record), Precedence::Authoritative);
        draft.merge_network(network);

        self.apply_city(draft, Precedence::Backfill);
        true
    }

    fn apply_city(&self, draft: &mut Draft, precedence: Precedence) {
        let Some(Hit { record, network }) = query(self.city.as_ref(), draft.ip) else {
            return;
        };
        draft.merge_location(self.city_location(&record), precedence);
        if precedence == Precedence::Authoritative {
            draft.merge_network(network);
        }
    }

    fn city_location(&self, record: &CityRecord) -> LocationFields {
        let continent = self.area(record.continent.code.as_deref(), &record.continent);

        // Anycast space is announced from many places; only the registration
        // country is meaningful.
        if record.traits.is_anycast {
            debug!("anycast record, using registered country");
            return LocationFields {
                continent,
                country: self.area(
                    record.registered_country.iso_code.as_deref(),
                    &record.registered_country,
                ),
                ..Default::default()
            };
        }

        LocationFields {
            continent,
            country: self.area(record.country.iso_code.as_deref(), &record.country),
            regions: region::from_city(
                record,
                &self.language.preferred,
                &self.language.fallback,
            ),
            coordinates: coordinates(&record.location),
            timezone: record.location.time_zone.as_deref().and_then(non_empty),
        }
    }

    fn area(&self, code: Option<&str>, name: &GeoName) -> Option<Area> {
        let code = code.unwrap_or_default().trim().to_string();
        let name = localized_name(
            &name.names,
            &self.language.preferred,
            &self.language.fallback,
        )
        .unwrap_or_default();
        if code.is_empty() && name.is_empty() {
            None
        } else {
            Some(Area { code, name })
        }
    }
}

fn query<R>(source: &dyn GeoSource<R>, ip: IpAddr) -> Option<Hit<R>> {
    match source.lookup(ip) {
        Ok(Some(hit)) => Some(hit),
        Ok(None) => {
            debug!("{} has no record for {}", source.name(), ip);
            None
        }
        Err(err) => {
            warn!("{} lookup for {} failed: {}", source.name(), ip, err);
            None
        }
    }
}

fn domestic_location(record: &RegionalRecord) -> LocationFields {
    LocationFields {
        country: Some(Area {
            code: DOMESTIC_COUNTRY_CODE.to_string(),
            name: DOMESTIC_COUNTRY_NAME.to_string(),
        }),
        regions: region::from_regional(record),
        timezone: Some(DOMESTIC_TIMEZONE.to_string()),
        ..Default::default()
    }
}

fn coordinates(location: &GeoLocation) -> Option<Coordinates> {
    match (location.latitude, location.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
            accuracy_radius: location.accuracy_radius,
        }),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
