use std::{net::IpAddr, path::Path};

use maxminddb::Reader;
use serde::de::DeserializeOwned;

mod carrier;
pub mod provision;
mod record;

pub use carrier::carrier_label;
pub use record::{AsnRecord, CityRecord, GeoLocation, GeoName, RegionalRecord, Traits};

use crate::{Error, config::Databases, resolve::Network};

/// A record found in a source plus the network the database filed it under.
#[derive(Debug, Clone)]
pub struct Hit<R> {
    pub record: R,
    pub network: Option<Network>,
}

impl<R> Hit<R> {
    pub fn new(record: R, network: Option<Network>) -> Self {
        Self { record, network }
    }
}

/// Read-only lookup capability over one geo database.
///
/// `Ok(None)` means the address is not covered; `Err` means the backing
/// store could not be read or decoded.
pub trait GeoSource<R>: Send + Sync {
    fn name(&self) -> &str;

    fn lookup(&self, ip: IpAddr) -> Result<Option<Hit<R>>, Error>;
}

/// A `.mmdb` file loaded into memory.
pub struct MmdbSource {
    name: &'static str,
    reader: Reader<Vec<u8>>,
}

impl MmdbSource {
    pub fn open(name: &'static str, path: &Path) -> Result<Self, Error> {
        debug!("open {} database: {}", name, path.display());
        let reader = Reader::open_readfile(path)?;
        info!(
            "{} database loaded: {} ({} nodes)",
            name,
            reader.metadata.database_type,
            reader.metadata.node_count
        );
        Ok(Self { name, reader })
    }
}

impl<R> GeoSource<R> for MmdbSource
where
    R: DeserializeOwned,
{
    fn name(&self) -> &str {
        self.name
    }

    fn lookup(&self, ip: IpAddr) -> Result<Option<Hit<R>>, Error> {
        let result = self.reader.lookup(ip)?;
        if !result.has_data() {
            return Ok(None);
        }
        let Some(record) = result.decode::<R>()? else {
            return Ok(None);
        };
        let network = match result.network() {
            Ok(net) => Network::new(net.ip(), net.prefix()).ok(),
            Err(err) => {
                debug!("{} network unavailable for {}: {}", self.name, ip, err);
                None
            }
        };
        Ok(Some(Hit::new(record, network)))
    }
}

impl Drop for MmdbSource {
    fn drop(&mut self) {
        info!("close {} database", self.name);
    }
}

/// The three databases the resolver reads, opened together at startup and
/// released when dropped.
pub struct GeoDatabases {
    pub asn: MmdbSource,
    pub city: MmdbSource,
    pub geo_cn: MmdbSource,
}

impl GeoDatabases {
    pub fn open(databases: &Databases) -> Result<Self, Error> {
        info!("open databases");
        let asn = MmdbSource::open("ASN", &databases.asn.path)?;
        let city = MmdbSource::open("City", &databases.city.path)?;
        let geo_cn = MmdbSource::open("GeoCN", &databases.geo_cn.path)?;
        Ok(Self { asn, city, geo_cn })
    }
}
