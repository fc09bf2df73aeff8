#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    io,
    net::IpAddr,
};

use ipgeo::{
    Error, Resolver,
    config::Language,
    geo::{AsnRecord, CityRecord, GeoSource, Hit, RegionalRecord},
    resolve::Network,
};

pub struct FakeSource<R> {
    name: &'static str,
    hits: HashMap<IpAddr, Hit<R>>,
}

impl<R> FakeSource<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            hits: HashMap::new(),
        }
    }

    pub fn insert(&mut self, ip: &str, record: R, network: Option<Network>) {
        self.hits
            .insert(ip.parse().unwrap(), Hit::new(record, network));
    }
}

impl<R> GeoSource<R> for FakeSource<R>
where
    R: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn lookup(&self, ip: IpAddr) -> Result<Option<Hit<R>>, Error> {
        Ok(self.hits.get(&ip).cloned())
    }
}

/// Source whose backing store is unreadable.
pub struct BrokenSource;

impl<R> GeoSource<R> for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    fn lookup(&self, _ip: IpAddr) -> Result<Option<Hit<R>>, Error> {
        Err(Error::IOError(io::Error::new(
            io::ErrorKind::InvalidData,
            "corrupt search tree",
        )))
    }
}

pub struct Fixture {
    pub asn: FakeSource<AsnRecord>,
    pub regional: FakeSource<RegionalRecord>,
    pub city: FakeSource<CityRecord>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            asn: FakeSource::new("ASN"),
            regional: FakeSource::new("GeoCN"),
            city: FakeSource::new("City"),
        }
    }

    pub fn build(self) -> Resolver {
        Resolver::with_sources(
            Box::new(self.asn),
            Box::new(self.regional),
            Box::new(self.city),
            Language::default(),
        )
    }
}

pub fn network(addr: &str, prefix: u8) -> Option<Network> {
    Some(Network::new(addr.parse().unwrap(), prefix).unwrap())
}

pub fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(lang, name)| (lang.to_string(), name.to_string()))
        .collect()
}

pub fn asn(number: u32, organization: &str) -> AsnRecord {
    AsnRecord {
        autonomous_system_number: Some(number),
        autonomous_system_organization: Some(organization.to_string()),
    }
}
