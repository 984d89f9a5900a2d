//! Formatting helpers shared across front ends.

use chrono::{DateTime, Utc};

use crate::analytics::Clock;

/// Format a signed CO2e quantity (e.g., "12.3 kg", "-10.0 kg").
pub fn format_kg(kg: f64) -> String {
    if kg.abs() >= 1000.0 {
        format!("{:.2} t", kg / 1000.0)
    } else {
        format!("{:.1} kg", kg)
    }
}

/// Format a usage quantity with its unit (e.g., "4.2 kWh").
pub fn format_quantity(quantity: f64, unit: &str) -> String {
    format!("{:.1} {}", quantity, unit)
}

/// Format a money amount with two decimals.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Format a timestamp relative to the clock's day ("today", "3d ago").
pub fn format_relative_day(ts: Option<DateTime<Utc>>, clock: &Clock) -> String {
    let days = (clock.today() - clock.local_day(ts)).num_days();
    match days {
        d if d < 0 => "upcoming".to_string(),
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        d if d < 7 => format!("{}d ago", d),
        _ => clock.local_day(ts).format("%b %d").to_string(),
    }
}

/// A fixed-width text progress bar, e.g. `[#####-----]`.
pub fn progress_bar(progress: u32, target: u32, width: usize) -> String {
    let filled = if target == 0 {
        width
    } else {
        let ratio = f64::from(progress.min(target)) / f64::from(target);
        (ratio * width as f64).round() as usize
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
