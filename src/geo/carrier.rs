use std::collections::HashMap;

use once_cell::sync::Lazy;

static CARRIERS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // China Telecom
        (4134, "中国电信"),
        (4809, "中国电信CN2"),
        (4811, "中国电信"),
        (4812, "中国电信"),
        (4813, "中国电信"),
        (4816, "中国电信"),
        (23724, "中国电信IDC"),
        (134774, "中国电信"),
        (136188, "中国电信"),
        (140292, "中国电信"),
        // China Unicom
        (4808, "中国联通"),
        (4837, "中国联通"),
        (9929, "中国联通"),
        (10099, "中国联通国际"),
        (17621, "中国联通"),
        (17622, "中国联通"),
        (17623, "中国联通"),
        (17816, "中国联通"),
        // China Mobile
        (9808, "中国移动"),
        (24400, "中国移动"),
        (24445, "中国移动"),
        (56040, "中国移动"),
        (56041, "中国移动"),
        (56042, "中国移动"),
        (56044, "中国移动"),
        (56046, "中国移动"),
        (56047, "中国移动"),
        (58453, "中国移动国际"),
        // Broadcast and research networks
        (9394, "中国铁通"),
        (7497, "中国科技网"),
        (4538, "中国教育网"),
        (23910, "中国教育网"),
        (24138, "中国广电"),
        // Domestic cloud
        (37963, "阿里云"),
        (45102, "阿里云"),
        (45090, "腾讯云"),
        (132203, "腾讯云"),
        (55990, "华为云"),
        (136907, "华为云"),
        (38365, "百度云"),
        (55967, "百度云"),
        (137718, "火山引擎"),
        // Global networks
        (13335, "Cloudflare"),
        (15169, "Google"),
        (396982, "Google Cloud"),
        (16509, "Amazon AWS"),
        (14618, "Amazon AWS"),
        (8075, "Microsoft"),
        (32934, "Facebook"),
        (20940, "Akamai"),
        (54113, "Fastly"),
        (14061, "DigitalOcean"),
        (16276, "OVH"),
        (24940, "Hetzner"),
        (63949, "Linode"),
        (20473, "Vultr"),
        (31898, "Oracle Cloud"),
    ])
});

/// Human carrier label for a well-known autonomous system.
pub fn carrier_label(asn: u32) -> Option<&'static str> {
    CARRIERS.get(&asn).copied()
}
