//! MAC OUI (Organizationally Unique Identifier) vendor lookup.
//!
//! Routers rarely report a manufacturer, so records are backfilled
//! from a fixed table of well-known OUI prefixes. The table is a
//! snapshot of common consumer prefixes, not the full IEEE registry;
//! an unknown prefix resolves to nothing, which is not an error.

/// Length of the lookup key: two byte groups plus separators ("XX:XX:XX").
const OUI_PREFIX_LEN: usize = 8;

/// Known OUI prefix -> manufacturer mappings.
const OUI_VENDORS: &[(&str, &str)] = &[
    ("00:50:F2", "Microsoft"),
    ("00:0C:F1", "Intel"),
    ("00:1A:11", "Google"),
    ("F4:F5:D8", "Google"),
    ("B8:27:EB", "Raspberry Pi Foundation"),
    ("DC:A6:32", "Raspberry Pi Foundation"),
    ("E4:5F:01", "Raspberry Pi Foundation"),
    ("00:1B:63", "Apple"),
    ("00:1E:C2", "Apple"),
    ("00:1F:5B", "Apple"),
    ("00:23:12", "Apple"),
    ("00:23:32", "Apple"),
    ("00:23:6C", "Apple"),
    ("00:23:DF", "Apple"),
    ("00:24:36", "Apple"),
    ("00:25:00", "Apple"),
    ("00:25:4B", "Apple"),
    ("00:25:BC", "Apple"),
    ("00:26:08", "Apple"),
    ("00:26:4A", "Apple"),
    ("00:26:BB", "Apple"),
    ("00:3E:E1", "Apple"),
    ("00:50:E4", "Apple"),
    ("28:CF:E9", "Apple"),
    ("3C:15:C2", "Apple"),
    ("54:26:96", "Apple"),
    ("60:33:4B", "Apple"),
    ("60:F8:1D", "Apple"),
    ("64:20:0C", "Apple"),
    ("64:B9:E8", "Apple"),
    ("68:A8:6D", "Apple"),
    ("6C:40:08", "Apple"),
    ("70:11:24", "Apple"),
    ("70:CD:60", "Apple"),
    ("78:31:C1", "Apple"),
    ("78:A3:E4", "Apple"),
    ("7C:11:BE", "Apple"),
    ("7C:6D:62", "Apple"),
    ("80:BE:05", "Apple"),
    ("80:E6:50", "Apple"),
    ("84:38:35", "Apple"),
    ("88:1F:A1", "Apple"),
    ("8C:58:77", "Apple"),
    ("8C:7C:92", "Apple"),
    ("90:27:E4", "Apple"),
    ("90:72:40", "Apple"),
    ("98:FE:94", "Apple"),
    ("9C:20:7B", "Apple"),
    ("A4:5E:60", "Apple"),
    ("A4:D1:8C", "Apple"),
    ("A8:20:66", "Apple"),
    ("A8:66:7F", "Apple"),
    ("A8:88:08", "Apple"),
    ("AC:3C:0B", "Apple"),
    ("AC:87:A3", "Apple"),
    ("AC:DE:48", "Apple"),
    ("B0:34:95", "Apple"),
    ("B4:F0:AB", "Apple"),
    ("B8:09:8A", "Apple"),
    ("B8:C7:5D", "Apple"),
    ("BC:3B:AF", "Apple"),
    ("BC:52:B7", "Apple"),
    ("BC:6C:21", "Apple"),
    ("BC:92:6B", "Apple"),
    ("C0:84:7D", "Apple"),
    ("C4:2C:03", "Apple"),
    ("C8:2A:14", "Apple"),
    ("C8:B5:B7", "Apple"),
    ("CC:25:EF", "Apple"),
    ("CC:29:F5", "Apple"),
    ("D0:25:98", "Apple"),
    ("D0:C5:F3", "Apple"),
    ("D4:9A:20", "Apple"),
    ("D8:30:62", "Apple"),
    ("D8:9E:3F", "Apple"),
    ("D8:A2:5E", "Apple"),
    ("DC:2B:2A", "Apple"),
    ("E0:B9:A5", "Apple"),
    ("E0:F8:47", "Apple"),
    ("E4:25:E7", "Apple"),
    ("E4:9A:79", "Apple"),
    ("E8:04:0B", "Apple"),
    ("E8:80:2E", "Apple"),
    ("EC:85:2F", "Apple"),
    ("F0:DC:E2", "Apple"),
    ("F4:0F:24", "Apple"),
    ("F8:1E:DF", "Apple"),
    ("F8:27:93", "Apple"),
    ("FC:25:3F", "Apple"),
    ("00:15:83", "Sony"),
    ("00:19:C5", "Sony"),
    ("00:1D:BA", "Sony"),
    ("00:24:BE", "Sony"),
    ("00:0D:93", "Samsung"),
    ("00:12:FB", "Samsung"),
    ("00:13:77", "Samsung"),
    ("00:15:B9", "Samsung"),
    ("00:16:32", "Samsung"),
    ("00:16:6B", "Samsung"),
    ("00:16:6C", "Samsung"),
    ("00:17:C9", "Samsung"),
    ("00:17:D5", "Samsung"),
    ("00:18:AF", "Samsung"),
    ("00:1A:8A", "Samsung"),
    ("00:1B:98", "Samsung"),
    ("00:1C:43", "Samsung"),
    ("00:1D:25", "Samsung"),
    ("00:1E:7D", "Samsung"),
    ("00:1F:CC", "Samsung"),
    ("00:21:19", "Samsung"),
    ("00:21:4C", "Samsung"),
    ("00:23:39", "Samsung"),
    ("00:23:D6", "Samsung"),
    ("00:23:D7", "Samsung"),
    ("00:24:54", "Samsung"),
    ("00:24:90", "Samsung"),
    ("00:24:91", "Samsung"),
    ("00:24:E9", "Samsung"),
    ("00:25:38", "Samsung"),
    ("00:26:37", "Samsung"),
    ("00:26:5D", "Samsung"),
    ("00:26:5F", "Samsung"),
    ("00:E0:64", "Samsung"),
];

/// Normalize a MAC address to the canonical form used throughout the
/// crate: trimmed, uppercased, `-` separators replaced with `:`.
pub fn canonical_mac(raw: &str) -> String {
    raw.trim().replace('-', ":").to_ascii_uppercase()
}

/// Look up the manufacturer for a MAC address.
///
/// The key is the 3-byte OUI prefix, i.e. the first 8 characters of
/// the canonical form. Returns `None` when the prefix is not in the
/// table or the address is too short to carry one.
pub fn lookup_vendor(mac: &str) -> Option<&'static str> {
    let prefix = mac.get(..OUI_PREFIX_LEN)?.to_ascii_uppercase();
    let vendor = OUI_VENDORS
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|&(_, vendor)| vendor);
    if vendor.is_none() {
        tracing::debug!("OUI lookup for {mac}: prefix not in table");
    }
    vendor
}
