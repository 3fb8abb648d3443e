//! Content hashes used for exact-duplicate row detection.
//!
//! Every field is framed (presence tag, then length or fixed width) so
//! that adjacent fields cannot run into each other.

use outage_domain::domain::{OutageEvent, RawOutageRecord};
use time::OffsetDateTime;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

#[derive(Default)]
struct RowDigest(blake3::Hasher);

impl RowDigest {
    fn text(&mut self, s: &str) -> &mut Self {
        self.0.update(&(s.len() as u64).to_le_bytes()).update(s.as_bytes());
        self
    }

    fn opt_text(&mut self, s: Option<&str>) -> &mut Self {
        match s {
            Some(s) => {
                self.0.update(&[PRESENT]);
                self.text(s)
            }
            None => {
                self.0.update(&[ABSENT]);
                self
            }
        }
    }

    /// Signed zeros compare equal, so they digest equal.
    fn number(&mut self, v: f64) -> &mut Self {
        let bits = if v == 0.0 { 0u64 } else { v.to_bits() };
        self.0.update(&bits.to_le_bytes());
        self
    }

    fn opt_number(&mut self, v: Option<f64>) -> &mut Self {
        match v {
            Some(v) => {
                self.0.update(&[PRESENT]);
                self.number(v)
            }
            None => {
                self.0.update(&[ABSENT]);
                self
            }
        }
    }

    /// The instant only; the offset it was written in is irrelevant.
    fn instant(&mut self, ts: OffsetDateTime) -> &mut Self {
        self.0.update(&ts.unix_timestamp_nanos().to_le_bytes());
        self
    }

    fn finish(&self) -> blake3::Hash {
        self.0.finalize()
    }
}

/// Hash of every field except `resolution`.
///
/// Exports repeat the same announcement once per time resolution; those
/// copies must collapse to one row.
pub fn raw_record_fingerprint(r: &RawOutageRecord) -> blake3::Hash {
    let mut d = RowDigest::default();
    d.instant(r.start)
        .instant(r.end)
        .opt_text(r.plant_type.as_deref())
        .opt_text(r.docstatus.as_deref())
        .opt_number(r.nominal_power)
        .opt_text(r.available_quantity.as_deref())
        .opt_text(r.business_type.as_deref())
        .opt_text(r.production_unit_name.as_deref())
        .opt_text(r.resource_id.as_deref());
    d.0.update(&(r.extra.len() as u64).to_le_bytes());
    for value in &r.extra {
        d.opt_text(value.as_deref());
    }
    d.finish()
}

/// Hash of every output field except `unique_id`.
pub fn event_fingerprint(e: &OutageEvent) -> blake3::Hash {
    RowDigest::default()
        .instant(e.start)
        .instant(e.end)
        .number(e.nominal_power)
        .number(e.available_quantity)
        .number(e.delta)
        .text(&e.business_type)
        .text(&e.production_unit_name)
        .opt_text(e.resource_id.as_deref())
        .finish()
}
