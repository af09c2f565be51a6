#![no_main]

use benchsift::{reconstruct, LeadingIntId, Schema, Table};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Reconstruction is total: any text yields either no table (empty
    // header) or rows that all match the header width.
    if let Some(raw) = reconstruct(&text, &LeadingIntId) {
        let width = raw.header.len();
        assert!(width > 0, "empty header must yield None");
        for row in &raw.rows {
            assert_eq!(row.len(), width, "row width mismatch");
        }

        // Decoding the reconstructed table never panics either.
        let table = Table::parse(&text).expect("parse must agree with reconstruct");
        let schema = match raw.header.first() {
            Some(first) => Schema::new().scalar(first).per_core("p99_Latency"),
            None => Schema::new(),
        };
        let records = table.records(&schema);
        assert_eq!(records.len(), raw.rows.len());
    }
});
