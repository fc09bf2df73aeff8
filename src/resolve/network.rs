use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

use crate::Error;

const V4_DEFAULT_PREFIX: u8 = 24;
const V6_DEFAULT_PREFIX: u8 = 64;

/// An address plus prefix length. The address is stored masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    addr: IpAddr,
    prefix: u8,
}

/// First and last address of a network and how many addresses it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkRange {
    pub start: IpAddr,
    pub end: IpAddr,
    /// `2^(bits - prefix)`, saturating at `u128::MAX` for `::/0`.
    pub total: u128,
}

impl Network {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, Error> {
        let max = address_bits(&addr);
        if prefix > max {
            return Err(Error::InvalidPrefix { prefix, max });
        }
        Ok(Self::masked(addr, prefix))
    }

    /// /24 or /64 around `ip`, used when no source reports a network.
    pub fn fallback_for(ip: IpAddr) -> Self {
        let prefix = match ip {
            IpAddr::V4(_) => V4_DEFAULT_PREFIX,
            IpAddr::V6(_) => V6_DEFAULT_PREFIX,
        };
        Self::masked(ip, prefix)
    }

    fn masked(addr: IpAddr, prefix: u8) -> Self {
        let addr = match addr {
            IpAddr::V4(v4) => IpAddr::V4(Ipv4Addr::from(u32::from(v4) & v4_mask(prefix))),
            IpAddr::V6(v6) => IpAddr::V6(Ipv6Addr::from(u128::from(v6) & v6_mask(prefix))),
        };
        Self { addr, prefix }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn range(&self) -> NetworkRange {
        let host_bits = u32::from(address_bits(&self.addr) - self.prefix);
        let (start, end) = match self.addr {
            IpAddr::V4(v4) => {
                let mask = v4_mask(self.prefix);
                let start = u32::from(v4) & mask;
                (
                    IpAddr::V4(Ipv4Addr::from(start)),
                    IpAddr::V4(Ipv4Addr::from(start | !mask)),
                )
            }
            IpAddr::V6(v6) => {
                let mask = v6_mask(self.prefix);
                let start = u128::from(v6) & mask;
                (
                    IpAddr::V6(Ipv6Addr::from(start)),
                    IpAddr::V6(Ipv6Addr::from(start | !mask)),
                )
            }
        };
        NetworkRange {
            start,
            end,
            total: 1u128.checked_shl(host_bits).unwrap_or(u128::MAX),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

fn address_bits(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn v4_mask(prefix: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

fn v6_mask(prefix: u8) -> u128 {
    u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0)
}
