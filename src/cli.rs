use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::APP_NAME;

#[derive(Parser)]
#[command(name = APP_NAME, version)]
#[command(about = "Terminal Quran memorization aid: listen seven times, then recite", long_about = None)]
pub struct Cli {
    /// Read settings from this config.toml instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive reader (default)
    Browse,

    /// List surahs, optionally filtered by a fuzzy query
    Surahs {
        /// Name, transliteration or number to look for
        query: Option<String>,
    },

    /// Print a surah with its translation
    Read {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=114))]
        surah: u32,

        /// First ayah to print
        #[arg(long, default_value_t = 1)]
        from: u32,
    },

    /// Play one ayah once
    Play {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=114))]
        surah: u32,
        ayah: u32,
    },

    /// Open the reader on a surah with the memorization card ready
    Memorize {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=114))]
        surah: u32,

        /// Ayah to focus (number within the surah)
        #[arg(long)]
        ayah: Option<u32>,
    },

    /// Show the tafsir of an ayah
    Tafsir {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=114))]
        surah: u32,
        ayah: u32,
    },

    /// Show today's prayer times
    Prayer {
        /// Defaults to the saved location
        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        country: Option<String>,
    },

    /// Listen to the live Quran radio
    Radio,

    /// Show or set the reciter
    Reciter {
        /// Edition identifier, e.g. ar.alafasy
        id: Option<String>,
    },

    /// Show or set the translation
    Translation {
        /// Edition identifier, e.g. en.sahih
        id: Option<String>,
    },

    /// Set the prayer-times location
    Location { city: String, country: String },

    /// Show or set the volume (0-100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },

    /// Show or set the verse playback rate
    Rate { rate: Option<f32> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from([APP_NAME]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn memorize_takes_optional_ayah() {
        let cli = Cli::try_parse_from([APP_NAME, "memorize", "36", "--ayah", "12"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Memorize { surah: 36, ayah: Some(12) })
        ));
    }

    #[test]
    fn surah_number_is_range_checked() {
        assert!(Cli::try_parse_from([APP_NAME, "read", "115"]).is_err());
        assert!(Cli::try_parse_from([APP_NAME, "read", "0"]).is_err());
    }

    #[test]
    fn volume_is_range_checked() {
        assert!(Cli::try_parse_from([APP_NAME, "volume", "101"]).is_err());
        assert!(Cli::try_parse_from([APP_NAME, "volume", "40"]).is_ok());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([APP_NAME, "radio", "--config", "/tmp/hifz.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/hifz.toml")));
    }
}
