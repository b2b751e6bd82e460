//! Rounding and display formatting
//!
//! Calculations always run on unrounded values; these helpers are for output.

use super::profile::{Channel, NutrientProfile, TargetProfile};

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Decimal places shown for a channel
pub fn display_places(channel: Channel) -> u32 {
    match channel {
        Channel::Energy | Channel::Sodium => 0,
        _ => 1,
    }
}

/// Round a value the way the channel is displayed
pub fn round_for_display(channel: Channel, value: f64) -> f64 {
    round_to(value, display_places(channel))
}

/// Insert thousands separators into the integer part of a formatted number
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}{}", sign, grouped, frac_part)
}

/// Format a channel value with its unit, e.g. `"1,234 kcal"`; absent is `"-"`
pub fn format_value(channel: Channel, value: Option<f64>) -> String {
    match value {
        Some(v) => {
            let places = display_places(channel) as usize;
            let rounded = round_for_display(channel, v);
            // Avoid printing "-0"
            let rounded = if rounded == 0.0 { 0.0 } else { rounded };
            format!("{} {}", group_thousands(&format!("{:.*}", places, rounded)), channel.unit())
        }
        None => "-".to_string(),
    }
}

/// Format a consumed/target ratio as a whole percentage; undetermined is `"-"`
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{}%", group_thousands(&format!("{:.0}", round_to(r * 100.0, 0)))),
        None => "-".to_string(),
    }
}

impl NutrientProfile {
    /// Copy rounded for display; absent channels stay absent
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        for channel in Channel::ALL {
            out.set(channel, self.get(channel).map(|v| round_for_display(channel, v)));
        }
        out
    }
}

impl TargetProfile {
    /// Copy rounded for display
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        for channel in Channel::ALL {
            out.set(channel, round_for_display(channel, self.get(channel)));
        }
        out
    }
}
