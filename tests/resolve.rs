mod common;

use common::{BrokenSource, FakeSource, Fixture, asn, names, network};
use ipgeo::{
    Error, Resolver,
    config::Language,
    geo::{CityRecord, GeoLocation, GeoName, RegionalRecord, Traits},
    resolve::{IpVersion, RegionLevel},
};

fn shenzhen() -> RegionalRecord {
    RegionalRecord {
        province: "广东".into(),
        province_code: 440000,
        city: "深圳".into(),
        city_code: 440300,
        districts: "南山".into(),
        districts_code: 440305,
        isp: "中国电信".into(),
        net: "数据中心".into(),
    }
}

fn mountain_view() -> CityRecord {
    CityRecord {
        continent: GeoName {
            code: Some("NA".into()),
            names: names(&[("en", "North America"), ("zh-CN", "北美洲")]),
            ..Default::default()
        },
        country: GeoName {
            iso_code: Some("US".into()),
            names: names(&[("en", "United States"), ("zh-CN", "美国")]),
            ..Default::default()
        },
        registered_country: GeoName {
            iso_code: Some("US".into()),
            names: names(&[("en", "United States"), ("zh-CN", "美国")]),
            ..Default::default()
        },
        subdivisions: vec![GeoName {
            iso_code: Some("CA".into()),
            names: names(&[("en", "California"), ("zh-CN", "加利福尼亚州")]),
            ..Default::default()
        }],
        city: GeoName {
            geoname_id: Some(5375480),
            names: names(&[("en", "Mountain View")]),
            ..Default::default()
        },
        location: GeoLocation {
            latitude: Some(37.386),
            longitude: Some(-122.0838),
            accuracy_radius: Some(1000),
            time_zone: Some("America/Los_Angeles".into()),
        },
        traits: Traits::default(),
    }
}

fn asia_coordinates() -> CityRecord {
    CityRecord {
        continent: GeoName {
            code: Some("AS".into()),
            names: names(&[("en", "Asia"), ("zh-CN", "亚洲")]),
            ..Default::default()
        },
        country: GeoName {
            iso_code: Some("HK".into()),
            names: names(&[("en", "Hong Kong")]),
            ..Default::default()
        },
        location: GeoLocation {
            latitude: Some(22.5431),
            longitude: Some(114.0579),
            accuracy_radius: Some(50),
            time_zone: Some("Asia/Hong_Kong".into()),
        },
        ..Default::default()
    }
}

#[test]
fn version_follows_address_family() {
    let resolver = Fixture::new().build();
    for ip in ["8.8.8.8", "0.0.0.0", "255.255.255.255", "10.1.2.3"] {
        let info = resolver.resolve(ip).unwrap();
        assert_eq!(info.version, IpVersion::V4, "{ip}");
    }
    for ip in ["::1", "2001:db8::1", "fe80::1", "2400:3200::1"] {
        let info = resolver.resolve(ip).unwrap();
        assert_eq!(info.version, IpVersion::V6, "{ip}");
    }
}

#[test]
fn ipv4_mapped_address_is_reported_as_ipv4() {
    let info = Fixture::new().build().resolve("::ffff:192.0.2.10").unwrap();
    assert_eq!(info.ip, "192.0.2.10");
    assert_eq!(info.version, IpVersion::V4);
    assert_eq!(info.network.cidr, "192.0.2.0/24");
}

#[test]
fn unparsable_input_is_rejected() {
    let resolver = Fixture::new().build();
    for input in ["not-an-ip", "", "1.2.3", "256.1.1.1", " 8.8.8.8", "2001:db8::1::1"] {
        let result = resolver.resolve(input);
        assert!(
            matches!(result, Err(Error::InvalidIp(ref raw)) if raw == input),
            "{input:?}"
        );
    }
}

#[test]
fn domestic_match_wins_and_global_backfills() {
    let mut fixture = Fixture::new();
    fixture.regional.insert("1.2.3.4", shenzhen(), None);
    fixture.city.insert("1.2.3.4", mountain_view(), network("1.2.0.0", 16));
    let info = fixture.build().resolve("1.2.3.4").unwrap();

    assert_eq!(info.location.country.code, "CN");
    assert_eq!(info.location.country.name, "中国");
    let regions: Vec<_> = info
        .location
        .regions
        .iter()
        .map(|r| (r.level, r.name.as_str(), r.code.as_str()))
        .collect();
    assert_eq!(
        regions,
        vec![
            (RegionLevel::Province, "广东省", "440000"),
            (RegionLevel::City, "深圳市", "440300"),
            (RegionLevel::District, "南山区", "440305"),
        ]
    );

    // coordinates and continent come from the global record
    let coordinates = info.location.coordinates.unwrap();
    assert_eq!(coordinates.latitude, 37.386);
    assert_eq!(coordinates.longitude, -122.0838);
    assert_eq!(info.location.continent.code, "NA");
    assert_eq!(info.location.continent.name, "北美洲");
    // timezone was already set by the domestic source
    assert_eq!(info.location.timezone, "Asia/Shanghai");

    assert_eq!(info.isp.name, "中国电信");
    assert_eq!(info.network.kind, "数据中心");
    // backfill never supplies the network
    assert_eq!(info.network.cidr, "1.2.3.0/24");
    assert_eq!(info.network.total_ips, 256);
}

#[test]
fn empty_domestic_record_falls_through_to_global() {
    let mut fixture = Fixture::new();
    fixture.regional.insert(
        "8.8.8.8",
        RegionalRecord {
            net: "宽带".into(),
            ..Default::default()
        },
        network("8.8.8.0", 24),
    );
    fixture.city.insert("8.8.8.8", mountain_view(), network("8.8.0.0", 17));
    let info = fixture.build().resolve("8.8.8.8").unwrap();

    assert_eq!(info.location.country.code, "US");
    assert_eq!(info.location.country.name, "美国");
    assert_eq!(info.location.timezone, "America/Los_Angeles");
    assert_eq!(info.location.regions.len(), 2);
    assert_eq!(info.location.regions[0].name, "加利福尼亚州");
    assert_eq!(info.location.regions[0].code, "CA");
    assert_eq!(info.location.regions[0].level, RegionLevel::Province);
    assert_eq!(info.location.regions[1].name, "Mountain View");
    assert_eq!(info.location.regions[1].level, RegionLevel::City);
    assert_eq!(info.network.cidr, "8.8.0.0/17");
    assert_eq!(info.network.kind, "宽带");
}

#[test]
fn anycast_keeps_only_registered_country() {
    let mut record = mountain_view();
    record.country = GeoName {
        iso_code: Some("AU".into()),
        names: names(&[("en", "Australia")]),
        ..Default::default()
    };
    record.traits.is_anycast = true;

    let mut fixture = Fixture::new();
    fixture.city.insert("1.1.1.1", record, network("1.1.1.0", 24));
    let info = fixture.build().resolve("1.1.1.1").unwrap();

    assert_eq!(info.location.country.code, "US");
    assert_eq!(info.location.country.name, "美国");
    assert!(info.location.regions.is_empty());
    assert!(info.location.coordinates.is_none());
    assert_eq!(info.location.timezone, "");
    assert_eq!(info.location.continent.code, "NA");
    assert_eq!(info.network.cidr, "1.1.1.0/24");
}

#[test]
fn asn_network_is_never_overwritten() {
    let mut fixture = Fixture::new();
    fixture
        .asn
        .insert("8.8.8.8", asn(15169, "GOOGLE"), network("8.8.8.0", 24));
    fixture.city.insert("8.8.8.8", mountain_view(), network("8.0.0.0", 9));
    let info = fixture.build().resolve("8.8.8.8").unwrap();

    assert_eq!(info.network.cidr, "8.8.8.0/24");
    assert_eq!(info.network.start_ip, "8.8.8.0");
    assert_eq!(info.network.end_ip, "8.8.8.255");
    assert_eq!(info.asn.number, 15169);
    assert_eq!(info.asn.name, "GOOGLE");
    assert_eq!(info.asn.info, "Google");
    assert_eq!(info.isp.name, "GOOGLE");
    assert_eq!(info.isp.kind, "Google");
}

#[test]
fn domestic_isp_overrides_asn_organization() {
    let mut fixture = Fixture::new();
    fixture.asn.insert(
        "1.2.3.4",
        asn(4134, "CHINANET-BACKBONE"),
        network("1.2.0.0", 16),
    );
    fixture.regional.insert(
        "1.2.3.4",
        RegionalRecord {
            isp: "中国电信".into(),
            ..Default::default()
        },
        network("1.2.3.0", 24),
    );
    let info = fixture.build().resolve("1.2.3.4").unwrap();

    assert_eq!(info.asn.number, 4134);
    assert_eq!(info.asn.name, "CHINANET-BACKBONE");
    assert_eq!(info.asn.info, "中国电信");
    assert_eq!(info.isp.name, "中国电信");
    assert_eq!(info.isp.kind, "中国电信");
    assert_eq!(info.location.country.code, "CN");
    assert!(info.location.regions.is_empty());
    assert_eq!(info.network.cidr, "1.2.0.0/16");
    assert_eq!(info.network.total_ips, 65536);
}

#[test]
fn domestic_isp_sets_type_for_unlisted_asn() {
    let mut fixture = Fixture::new();
    fixture
        .asn
        .insert("1.2.3.4", asn(64500, "SOME-AS"), network("1.2.0.0", 16));
    fixture.regional.insert(
        "1.2.3.4",
        RegionalRecord {
            province: "广东".into(),
            isp: "中国电信".into(),
            ..Default::default()
        },
        None,
    );
    let info = fixture.build().resolve("1.2.3.4").unwrap();

    assert_eq!(info.asn.name, "SOME-AS");
    assert_eq!(info.asn.info, "中国电信");
    assert_eq!(info.isp.name, "中国电信");
    assert_eq!(info.isp.kind, "中国电信");
}

#[test]
fn domestic_isp_without_asn_hit() {
    let mut fixture = Fixture::new();
    fixture.regional.insert(
        "1.2.3.4",
        RegionalRecord {
            isp: "中国移动".into(),
            ..Default::default()
        },
        None,
    );
    let info = fixture.build().resolve("1.2.3.4").unwrap();

    assert_eq!(info.asn.number, 0);
    assert_eq!(info.asn.info, "中国移动");
    assert_eq!(info.isp.name, "中国移动");
    assert_eq!(info.isp.kind, "中国移动");
}

#[test]
fn backfill_uses_global_timezone_only_when_missing() {
    let mut fixture = Fixture::new();
    fixture.regional.insert("1.2.3.4", shenzhen(), None);
    fixture.city.insert("1.2.3.4", asia_coordinates(), None);
    let info = fixture.build().resolve("1.2.3.4").unwrap();

    assert_eq!(info.location.country.code, "CN");
    assert_eq!(info.location.timezone, "Asia/Shanghai");
    assert_eq!(info.location.continent.name, "亚洲");
    assert_eq!(info.location.coordinates.unwrap().accuracy_radius, Some(50));
}

#[test]
fn missing_network_falls_back_to_default_prefix() {
    let resolver = Fixture::new().build();

    let v4 = resolver.resolve("203.0.113.77").unwrap();
    assert_eq!(v4.network.cidr, "203.0.113.0/24");
    assert_eq!(v4.network.start_ip, "203.0.113.0");
    assert_eq!(v4.network.end_ip, "203.0.113.255");
    assert_eq!(v4.network.total_ips, 1 << (32 - 24));

    let v6 = resolver.resolve("2001:db8:abcd:12:1:2:3:4").unwrap();
    assert_eq!(v6.network.cidr, "2001:db8:abcd:12::/64");
    assert_eq!(v6.network.end_ip, "2001:db8:abcd:12:ffff:ffff:ffff:ffff");
    assert_eq!(v6.network.total_ips, 1u128 << (128 - 64));
}

#[test]
fn empty_sources_still_produce_a_record() {
    let info = Fixture::new().build().resolve("192.0.2.1").unwrap();
    assert_eq!(info.asn.number, 0);
    assert_eq!(info.asn.name, "");
    assert_eq!(info.location.country.code, "");
    assert!(info.location.regions.is_empty());
    assert_eq!(info.network.kind, "宽带");
    assert_eq!(info.isp.name, "");
}

#[test]
fn failing_sources_are_treated_as_misses() {
    let mut city = FakeSource::new("City");
    city.insert("9.9.9.9", mountain_view(), network("9.9.9.0", 24));
    let resolver = Resolver::with_sources(
        Box::new(BrokenSource),
        Box::new(BrokenSource),
        Box::new(city),
        Language::default(),
    );

    let info = resolver.resolve("9.9.9.9").unwrap();
    assert_eq!(info.asn.number, 0);
    assert_eq!(info.location.country.code, "US");
    assert_eq!(info.network.cidr, "9.9.9.0/24");
}

#[test]
fn fallback_language_used_when_preferred_missing() {
    let mut fixture = Fixture::new();
    fixture.city.insert("9.9.9.9", mountain_view(), None);
    let resolver = Resolver::with_sources(
        Box::new(fixture.asn),
        Box::new(fixture.regional),
        Box::new(fixture.city),
        Language {
            preferred: "ja".into(),
            fallback: "en".into(),
        },
    );

    let info = resolver.resolve("9.9.9.9").unwrap();
    assert_eq!(info.location.country.name, "United States");
    assert_eq!(info.location.regions[0].name, "California");
}

#[test]
fn repeated_resolution_is_byte_identical() {
    let mut fixture = Fixture::new();
    fixture
        .asn
        .insert("1.2.3.4", asn(4134, "CHINANET"), network("1.2.0.0", 16));
    fixture.regional.insert("1.2.3.4", shenzhen(), None);
    fixture.city.insert("1.2.3.4", asia_coordinates(), None);
    let resolver = fixture.build();

    let first = serde_json::to_vec(&resolver.resolve("1.2.3.4").unwrap()).unwrap();
    let second = serde_json::to_vec(&resolver.resolve("1.2.3.4").unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn serialized_layout() {
    let mut fixture = Fixture::new();
    fixture
        .asn
        .insert("1.2.3.4", asn(4134, "CHINANET"), network("1.2.0.0", 16));
    fixture.regional.insert("1.2.3.4", shenzhen(), None);
    let info = fixture.build().resolve("1.2.3.4").unwrap();

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["ip"], "1.2.3.4");
    assert_eq!(json["version"], "IPv4");
    assert_eq!(json["asn"]["number"], 4134);
    assert_eq!(json["asn"]["info"], "中国电信");
    assert_eq!(json["network"]["cidr"], "1.2.0.0/16");
    assert_eq!(json["network"]["total_ips"], 65536);
    assert_eq!(json["network"]["type"], "数据中心");
    assert_eq!(json["location"]["country"]["code"], "CN");
    assert_eq!(json["location"]["regions"][2]["type"], "district");
    assert!(json["location"]["coordinates"].is_null());
    assert_eq!(json["isp"]["type"], "中国电信");
}
