use qrnote_core::codec::ScanResult;

use crate::commands::common::format_scan;

pub fn run_decode(raw: &str, html: bool) {
    let scan = ScanResult::from_raw(raw);
    println!("{}", format_scan(&scan, html));
}
