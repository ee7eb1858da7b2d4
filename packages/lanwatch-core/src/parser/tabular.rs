//! HTML-table fallback for routers that only render a status page.
//!
//! The layout heuristics are deliberately literal: one device per row
//! (cell scanning stops at the first MAC match), the cell to the right
//! may carry the IP, the cell to the left may carry the hostname, and
//! auxiliary attributes are recognized by substring only. Rows listing
//! several devices and device-type labels outside the fixed vocabulary
//! are unsupported by design, not omissions.

use scraper::{Html, Selector};

use super::{DeviceRecord, oui};

/// Device-type labels recognized in table cells. Compared against the
/// lowercased cell text; includes the Japanese terms common on
/// consumer router status pages.
const DEVICE_TYPE_KEYWORDS: &[&str] = &[
    "phone",
    "smartphone",
    "tablet",
    "pc",
    "laptop",
    "desktop",
    "mobile",
    "スマートフォン",
    "タブレット",
    "パソコン",
    "ノートpc",
];

/// Scrape device records out of every table in `raw_body`. Tolerates
/// arbitrary markup; anything unrecognizable contributes no records.
pub(super) fn scrape_tables(raw_body: &str) -> Vec<DeviceRecord> {
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(raw_body);
    let mut devices = Vec::new();

    for table in document.select(&table_sel) {
        for row in table.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() < 2 {
                continue;
            }
            if let Some(device) = scan_row(&cells) {
                devices.push(device);
            }
        }
    }

    devices
}

/// Build a record from the first MAC-bearing cell of a row, if any.
fn scan_row(cells: &[String]) -> Option<DeviceRecord> {
    let (index, mac) = cells
        .iter()
        .enumerate()
        .find_map(|(i, text)| find_mac(text).map(|mac| (i, mac)))?;

    let mut device = DeviceRecord {
        mac: oui::canonical_mac(&mac),
        ..DeviceRecord::default()
    };

    // Neighbor cells: IP to the right, hostname to the left.
    if let Some(next) = cells.get(index + 1) {
        device.ip = find_ipv4(next);
    }
    if index > 0 {
        let prev = &cells[index - 1];
        if !prev.is_empty() && find_mac(prev).is_none() {
            device.hostname = Some(prev.clone());
        }
    }

    // Attribute sniffing over the whole row; the last matching cell
    // wins for each attribute.
    for text in cells {
        let lowered = text.to_lowercase();
        if text.contains('%') || lowered.contains("dbm") {
            device.signal_strength = Some(text.clone());
        }
        if lowered.contains("mbps") || lowered.contains("gbps") {
            device.connection_speed = Some(text.clone());
        }
        if DEVICE_TYPE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            device.device_type = Some(text.clone());
        }
    }

    if device.vendor.is_none() {
        device.vendor = oui::lookup_vendor(&device.mac).map(str::to_string);
    }

    Some(device)
}

/// Find the leftmost six-group hex-pair address in `text`. Groups are
/// separated by `:` or `-`, mixed separators allowed.
fn find_mac(text: &str) -> Option<String> {
    const MAC_LEN: usize = 17;
    let bytes = text.as_bytes();
    if bytes.len() < MAC_LEN {
        return None;
    }
    for start in 0..=bytes.len() - MAC_LEN {
        let window = &bytes[start..start + MAC_LEN];
        if is_mac_window(window) {
            return Some(text[start..start + MAC_LEN].to_string());
        }
    }
    None
}

fn is_mac_window(window: &[u8]) -> bool {
    window.iter().enumerate().all(|(i, &byte)| {
        if i % 3 == 2 {
            byte == b':' || byte == b'-'
        } else {
            byte.is_ascii_hexdigit()
        }
    })
}

/// Find the leftmost dotted-quad in `text`. Purely syntactic: four
/// groups of 1-3 digits, no range validation.
fn find_ipv4(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if !bytes[start].is_ascii_digit() {
            continue;
        }
        if let Some(end) = match_ipv4_at(bytes, start) {
            return Some(text[start..end].to_string());
        }
    }
    None
}

fn match_ipv4_at(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    for group in 0..4 {
        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() && pos - digits_start < 3 {
            pos += 1;
        }
        if pos == digits_start {
            return None;
        }
        if group < 3 {
            if pos >= bytes.len() || bytes[pos] != b'.' {
                return None;
            }
            pos += 1;
        }
    }
    Some(pos)
}
