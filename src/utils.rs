use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_NAME: &str = "hifz";

/// `<config dir>/hifz`, home of `config.toml` and `db.json`
pub fn app_config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Could not find config directory")?;
    path.push(APP_NAME);
    Ok(path)
}

/// `<data dir>/hifz`, home of the log file
pub fn app_data_dir() -> Result<PathBuf> {
    let mut path = dirs::data_dir().context("Could not find data directory")?;
    path.push(APP_NAME);
    Ok(path)
}

/// Convert user volume percentage (0-100) to amplitude multiplier using perceptual scaling
///
/// Human hearing is logarithmic, so we use x^4 to approximate an exponential curve.
/// The difference between 1-2% will feel the same as the difference between 99-100%.
pub fn volume_percent_to_amplitude(percent: u8) -> f32 {
    let x = (percent.min(100) as f32) / 100.0;
    x.powi(4)
}

/// Convert amplitude multiplier (0.0-1.0) back to user volume percentage (0-100)
///
/// Inverse of [`volume_percent_to_amplitude`], used for display.
pub fn amplitude_to_volume(amplitude: f32) -> u8 {
    let x = amplitude.clamp(0.0, 1.0).powf(0.25); // 4th root
    (x * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_conversion_is_invertible_at_whole_percents() {
        for percent in [0u8, 1, 25, 50, 73, 100] {
            assert_eq!(amplitude_to_volume(volume_percent_to_amplitude(percent)), percent);
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(volume_percent_to_amplitude(250), 1.0);
        assert_eq!(amplitude_to_volume(4.0), 100);
        assert_eq!(amplitude_to_volume(-1.0), 0);
    }
}
