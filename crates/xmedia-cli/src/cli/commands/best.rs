//! `xmedia best`: resolve one id in a payload to its best-quality URL.

use anyhow::Result;

use xmedia_core::scanner;

use super::load_payload;

pub fn run_best(path: &str, id: &str, max_depth: usize) -> Result<()> {
    let payload = load_payload(path)?;
    let records = scanner::scan(&payload, max_depth);
    let Some(record) = records.iter().find(|r| r.id == id) else {
        anyhow::bail!("no media record for id {} in {}", id, path);
    };
    let Some(best) = record.best_variant() else {
        anyhow::bail!("record {} has no variants", id);
    };
    println!("{}", best.url);
    println!(
        "{} ({}), suggested name: {}",
        record.quality_label(),
        format_bitrate(best.bitrate),
        record.suggested_filename()
    );
    Ok(())
}

fn format_bitrate(bitrate: u64) -> String {
    if bitrate == 0 {
        "unknown bitrate".to_string()
    } else {
        format!("{} kbit/s", bitrate / 1000)
    }
}
