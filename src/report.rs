use std::fmt::{self, Write};

use clap::ValueEnum;

use crate::aggregate::Snapshot;
use crate::decimal::Tenths;
use crate::stat::StatRecord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportStyle {
    /// `key=min/mean/max`, one key per line.
    #[default]
    Lines,
    /// `{a=min/mean/max, b=min/mean/max}` on a single line.
    Braces,
}

/// `min/mean/max` of one record, each with one fractional digit.
pub struct Summary<'a>(pub &'a StatRecord);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        write!(
            f,
            "{}/{}/{}",
            Tenths(r.min.round_tenths()),
            Tenths(r.mean_tenths()),
            Tenths(r.max.round_tenths())
        )
    }
}

pub fn render(snapshot: &Snapshot, style: ReportStyle) -> String {
    let mut out = String::with_capacity(snapshot.len().saturating_mul(32) + 3);
    // Writing into a String cannot fail
    let _ = write_report(&mut out, snapshot, style);
    out
}

pub fn write_report<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    style: ReportStyle,
) -> fmt::Result {
    match style {
        ReportStyle::Lines => {
            for (key, record) in snapshot.iter() {
                writeln!(out, "{key}={}", Summary(record))?;
            }
        }
        ReportStyle::Braces => {
            out.write_char('{')?;
            for (i, (key, record)) in snapshot.iter().enumerate() {
                if i != 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{key}={}", Summary(record))?;
            }
            out.write_str("}\n")?;
        }
    }
    Ok(())
}
