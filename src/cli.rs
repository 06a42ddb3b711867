use clap::{Parser, ValueEnum};

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc / q          : Quit
  Left             : Previous image
  Right            : Next image
  Home / End       : First / last image
  Ctrl + Wheel     : Zoom at pointer (see --zoom-modifier)
  Wheel            : Scroll
  Drag (left btn)  : Pan
  + / -            : Zoom in / out at window centre
  0                : Fit to window
  i                : Toggle info overlay
  ?                : Toggle help overlay
";

/// Key that turns mouse-wheel motion into zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ZoomModifier {
    Ctrl,
    Shift,
    Alt,
    Super,
}

#[derive(Parser, Debug)]
#[command(name = "glance", about = "Browse the images of a folder", after_help = HELP_KEYS)]
pub struct Cli {
    /// Folder to browse (searched recursively)
    pub folder: std::path::PathBuf,

    /// Memory budget for the decode cache (e.g. 512MB, 2GB). Default: 10% of RAM.
    #[arg(short, long)]
    pub memory: Option<String>,

    /// Follow symbolic links while scanning (default: false)
    #[arg(long)]
    pub follow_links: bool,

    /// Modifier key that makes the wheel zoom instead of scroll
    #[arg(long, value_enum, default_value = "ctrl")]
    pub zoom_modifier: ZoomModifier,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "720")]
    pub height: u32,
}

pub fn parse_memory_budget(s: &str) -> u64 {
    let s = s.trim().to_uppercase();
    let (num, unit) = if let Some(num) = s.strip_suffix("GB") {
        (num.trim().parse::<f64>().unwrap_or(1.0), 1024.0 * 1024.0 * 1024.0)
    } else if let Some(num) = s.strip_suffix("MB") {
        (num.trim().parse::<f64>().unwrap_or(512.0), 1024.0 * 1024.0)
    } else {
        (s.parse::<f64>().unwrap_or(512.0), 1024.0 * 1024.0)
    };
    (num * unit) as u64
}

pub fn default_memory_budget() -> u64 {
    let mut sys = sysinfo::System::new();
    sys.refresh_memory();
    sys.total_memory() / 10
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn memory_budget_units() {
        assert_eq!(parse_memory_budget("512MB"), 512 * MB);
        assert_eq!(parse_memory_budget(" 2gb "), 2048 * MB);
        assert_eq!(parse_memory_budget("1.5GB"), 1536 * MB);
        assert_eq!(parse_memory_budget("64"), 64 * MB);
        assert_eq!(parse_memory_budget("lots"), 512 * MB);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["glance", "/tmp/pics"]).unwrap();
        assert_eq!(cli.zoom_modifier, ZoomModifier::Ctrl);
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert!(!cli.follow_links);
        assert!(cli.memory.is_none());
    }

    #[test]
    fn cli_zoom_modifier_choice() {
        let cli = Cli::try_parse_from(["glance", "--zoom-modifier", "alt", "-m", "1GB", "pics"]).unwrap();
        assert_eq!(cli.zoom_modifier, ZoomModifier::Alt);
        assert_eq!(cli.memory.as_deref(), Some("1GB"));
    }

    #[test]
    fn cli_requires_folder() {
        assert!(Cli::try_parse_from(["glance"]).is_err());
    }
}
