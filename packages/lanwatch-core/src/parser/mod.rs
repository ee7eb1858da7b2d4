//! Client-list response parsing.
//!
//! Routers report connected clients in wildly different shapes: some
//! expose JSON, most only render a status page with an HTML table,
//! and the field names vary by model and firmware. [`parse`] tries
//! structured decoding first and falls back to table scraping. It
//! never fails; a hopeless body just yields no records.

pub mod oui;
mod tabular;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single connected client, normalized from whatever the router
/// reported.
///
/// `mac` is canonical (uppercase, `:`-separated) and always non-empty;
/// everything else is best-effort and may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub mac: String,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    /// Reported by the router, or inferred from the MAC OUI prefix.
    pub vendor: Option<String>,
    pub device_type: Option<String>,
    pub signal_strength: Option<String>,
    pub connection_speed: Option<String>,
    pub connection_time: Option<String>,
    pub user_agent: Option<String>,
}

/// List-valued keys checked, in priority order, before scanning the
/// top-level fields in document order for the first array.
const CLIENT_LIST_KEYS: &[&str] = &["clients", "devices", "wlan_clients"];

// Ordered alias lists per attribute: the first key present with a
// non-empty value wins.
const MAC_KEYS: &[&str] = &["mac", "macaddr"];
const IP_KEYS: &[&str] = &["ip", "ipaddr"];
const HOSTNAME_KEYS: &[&str] = &["hostname", "name"];
const VENDOR_KEYS: &[&str] = &["vendor"];
const DEVICE_TYPE_KEYS: &[&str] = &["device_type", "type"];
const SIGNAL_KEYS: &[&str] = &["signal_strength", "rssi"];
const SPEED_KEYS: &[&str] = &["connection_speed", "speed"];
const CONNECTED_KEYS: &[&str] = &["connection_time", "connected_time"];
const USER_AGENT_KEYS: &[&str] = &["user_agent", "useragent"];

/// Parse a raw client-list response body into device records.
///
/// Tries JSON first. If decoding fails, or decoding succeeds but no
/// records can be extracted, falls back to scraping HTML tables.
/// Records without a resolvable MAC are discarded. Malformed input of
/// any kind produces an empty list and a log entry, never an error.
pub fn parse(raw_body: &str) -> Vec<DeviceRecord> {
    match serde_json::from_str::<Value>(raw_body) {
        Ok(json) => {
            let devices = extract_from_json(&json);
            if !devices.is_empty() {
                tracing::debug!("parsed {} devices from JSON", devices.len());
                return devices;
            }
            tracing::debug!("JSON response held no client list, trying table scrape");
        }
        Err(_) => {
            tracing::debug!("response is not JSON, falling back to table scrape");
        }
    }

    let devices = tabular::scrape_tables(raw_body);
    if !devices.is_empty() {
        tracing::debug!("parsed {} devices from HTML", devices.len());
    }
    devices
}

fn extract_from_json(json: &Value) -> Vec<DeviceRecord> {
    let Some(map) = json.as_object() else {
        return Vec::new();
    };

    // The fallback takes the first array in document order; serde_json's
    // preserve_order feature keeps the map from re-sorting fields.
    let list = CLIENT_LIST_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
        .or_else(|| map.values().find_map(Value::as_array));
    let Some(list) = list else {
        return Vec::new();
    };

    let mut devices = Vec::new();
    for client in list {
        let Some(fields) = client.as_object() else {
            continue;
        };

        let Some(mac) = first_value(fields, MAC_KEYS) else {
            continue;
        };
        let mac = oui::canonical_mac(&mac);
        if mac.is_empty() {
            continue;
        }

        let vendor = first_value(fields, VENDOR_KEYS)
            .or_else(|| oui::lookup_vendor(&mac).map(str::to_string));

        devices.push(DeviceRecord {
            ip: first_value(fields, IP_KEYS),
            hostname: first_value(fields, HOSTNAME_KEYS),
            vendor,
            device_type: first_value(fields, DEVICE_TYPE_KEYS),
            signal_strength: first_value(fields, SIGNAL_KEYS),
            connection_speed: first_value(fields, SPEED_KEYS),
            connection_time: first_value(fields, CONNECTED_KEYS),
            user_agent: first_value(fields, USER_AGENT_KEYS),
            mac,
        });
    }
    devices
}

/// Resolve an attribute through its ordered alias list: the first key
/// present with a non-empty scalar wins. Numbers are stringified so a
/// numeric `rssi` or `speed` survives instead of aborting extraction.
fn first_value(fields: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_extraction_with_aliases() {
        let body = r#"{
            "clients": [
                {
                    "macaddr": "ac:de:48:00:00:01",
                    "ipaddr": "192.168.1.23",
                    "name": "living-room-tv",
                    "rssi": -61,
                    "speed": "866Mbps",
                    "connected_time": "02:13:44",
                    "useragent": "SmartTV/1.0"
                }
            ]
        }"#;

        let devices = parse(body);
        assert_eq!(devices.len(), 1);
        let d = &devices[0];
        assert_eq!(d.mac, "AC:DE:48:00:00:01");
        assert_eq!(d.ip.as_deref(), Some("192.168.1.23"));
        assert_eq!(d.hostname.as_deref(), Some("living-room-tv"));
        assert_eq!(d.signal_strength.as_deref(), Some("-61"));
        assert_eq!(d.connection_speed.as_deref(), Some("866Mbps"));
        assert_eq!(d.connection_time.as_deref(), Some("02:13:44"));
        assert_eq!(d.user_agent.as_deref(), Some("SmartTV/1.0"));
        // Vendor backfilled from the OUI table.
        assert_eq!(d.vendor.as_deref(), Some("Apple"));
    }

    #[test]
    fn test_reported_vendor_is_kept() {
        let body = r#"{"clients": [{"mac": "AC:DE:48:00:00:01", "vendor": "Acme"}]}"#;
        let devices = parse(body);
        assert_eq!(devices[0].vendor.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_list_key_priority() {
        let body = r#"{
            "devices": [{"mac": "11:22:33:44:55:66"}],
            "clients": [{"mac": "AA:BB:CC:DD:EE:FF"}]
        }"#;
        let devices = parse(body);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].mac, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_first_list_valued_field_fallback() {
        let body = r#"{
            "status": "ok",
            "stations": [{"mac": "AA:BB:CC:DD:EE:FF", "ip": "10.0.0.9"}]
        }"#;
        let devices = parse(body);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].ip.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_fallback_takes_first_list_in_document_order() {
        // "alerts" sorts before "stations" but appears later in the
        // document; the device list must still win.
        let body = r#"{
            "stations": [{"mac": "AA:BB:CC:DD:EE:FF", "ip": "10.0.0.9"}],
            "alerts": ["low-signal"]
        }"#;
        let devices = parse(body);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].mac, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_records_without_mac_are_discarded() {
        let body = r#"{
            "clients": [
                {"mac": "", "ip": "10.0.0.1"},
                {"ip": "10.0.0.2"},
                "not-a-mapping",
                {"mac": "AA:BB:CC:DD:EE:FF"}
            ]
        }"#;
        let devices = parse(body);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].mac, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_structured_success_skips_tabular_path() {
        // The embedded HTML names a different MAC; it must not appear.
        let body = r#"{
            "clients": [{"mac": "AA:BB:CC:DD:EE:FF"}],
            "page": "<table><tr><td>x</td><td>11:22:33:44:55:66</td></tr></table>"
        }"#;
        let devices = parse(body);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].mac, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_empty_json_falls_back_to_tabular() {
        // Valid JSON without a usable list still reaches the scraper
        // (which finds nothing here).
        assert!(parse(r#"{"status": "ok"}"#).is_empty());
        assert!(parse("[1, 2, 3]").is_empty());
    }

    #[test]
    fn test_garbage_yields_empty_list() {
        assert!(parse("").is_empty());
        assert!(parse("no clients here").is_empty());
        assert!(parse("{\"truncated\": ").is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let body = r#"{"clients": [{"mac": "aa:bb:cc:dd:ee:ff", "ip": "10.0.0.3"}]}"#;
        assert_eq!(parse(body), parse(body));
    }

    #[test]
    fn test_every_record_has_nonempty_mac() {
        let bodies = [
            r#"{"clients": [{"mac": ""}, {"mac": "aa:bb:cc:dd:ee:ff"}]}"#,
            "<table><tr><td>host</td><td>AA:BB:CC:DD:EE:FF</td></tr></table>",
            "garbage",
        ];
        for body in bodies {
            for device in parse(body) {
                assert!(!device.mac.is_empty());
            }
        }
    }
}
