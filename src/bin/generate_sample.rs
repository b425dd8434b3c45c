//! Writes a synthetic hourly air-quality dataset for the Beijing stations.
//!
//! Usage: `generate_sample [OUTPUT] [DAYS]` (defaults: `main_data.csv`, 365).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

const STATIONS: [&str; 12] = [
    "Aotizhongxin",
    "Changping",
    "Dingling",
    "Dongsi",
    "Guanyuan",
    "Gucheng",
    "Huairou",
    "Nongzhanguan",
    "Shunyi",
    "Tiantan",
    "Wanliu",
    "Wanshouxigong",
];

/// Chance that any single pollutant cell is left empty.
const MISSING_RATE: f64 = 0.02;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Empty cell with probability `MISSING_RATE`, else the value to 1 decimal.
    fn cell(&mut self, value: f64) -> String {
        if self.next_f64() < MISSING_RATE {
            String::new()
        } else {
            format!("{:.1}", value.max(1.0))
        }
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "main_data.csv".to_string()));
    let days: i64 = match args.next() {
        Some(d) => d.parse().with_context(|| format!("invalid day count '{d}'"))?,
        None => 365,
    };

    let start = NaiveDate::from_ymd_opt(2013, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("building start date")?;

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    writer.write_record(["date", "station", "PM2.5", "PM10", "SO2", "NO2"])?;

    let mut rows = 0usize;
    for hour in 0..days * 24 {
        let date = start + Duration::hours(hour);
        let day_of_year = (hour / 24) as f64;
        // Winter heating season peaks around day 300 after March 1st.
        let season = 1.0 + 0.6 * (2.0 * std::f64::consts::PI * (day_of_year - 300.0) / 365.0).cos();
        let stamp = date.format("%Y-%m-%d %H:%M:%S").to_string();

        for (i, station) in STATIONS.iter().enumerate() {
            let base = 60.0 + 4.0 * i as f64;
            let pm25 = (base * season * rng.gauss(0.0, 0.6).exp().min(6.0)).max(2.0);
            let pm10 = pm25 * rng.gauss(1.35, 0.15);
            let so2 = 15.0 * season * rng.gauss(1.0, 0.3);
            let no2 = 45.0 + rng.gauss(0.0, 15.0);

            writer.write_record([
                stamp.clone(),
                station.to_string(),
                rng.cell(pm25),
                rng.cell(pm10),
                rng.cell(so2),
                rng.cell(no2),
            ])?;
            rows += 1;
        }
    }
    writer.flush().context("flushing CSV")?;

    println!(
        "Wrote {rows} readings for {} stations to {}",
        STATIONS.len(),
        output.display()
    );
    Ok(())
}
