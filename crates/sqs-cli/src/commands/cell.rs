use crate::cli::CellArgs;
use crate::error::Result;
use serde::Serialize;
use sqspost::{core::analysis::cell::CellMetrics, workflows};
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct CellRow {
    file: String,
    volume: f64,
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
}

impl CellRow {
    fn new(path: &Path, m: &CellMetrics) -> Self {
        Self {
            file: path.display().to_string(),
            volume: m.volume,
            a: m.a,
            b: m.b,
            c: m.c,
            alpha: m.alpha,
            beta: m.beta,
            gamma: m.gamma,
        }
    }
}

pub fn run(args: CellArgs) -> Result<()> {
    let mut rows = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let metrics = workflows::cells::inspect_poscar(path)?;
        println!("{}", format_metrics(path, &metrics));
        rows.push(CellRow::new(path, &metrics));
    }

    if let Some(csv_path) = &args.csv {
        write_csv(csv_path, &rows)?;
        info!("Cell report written to {:?}", csv_path);
        println!("✓ Report written to: {}", csv_path.display());
    }
    Ok(())
}

fn format_metrics(path: &Path, m: &CellMetrics) -> String {
    let mut text = format!("{}\n  Volume: {:.6}\n", path.display(), m.volume);
    text.push_str(&format!(
        "  Lattice constants: a = {:.6}  b = {:.6}  c = {:.6}\n",
        m.a, m.b, m.c
    ));
    text.push_str(&format!(
        "  Angles: alpha = {:.4}  beta = {:.4}  gamma = {:.4}",
        m.alpha, m.beta, m.gamma
    ));
    text
}

fn write_csv(path: &Path, rows: &[CellRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
