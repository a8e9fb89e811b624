//! Output formats the external formatter can produce.

use itertools::Itertools;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid output format '{0}' (expected one of: {list})", list = OutputFormat::ALL.iter().join(", "))]
pub struct InvalidOutputFormat(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Pdf,
    Rtf,
    Tiff,
    Png,
    Pcl,
    Ps,
    Txt,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Pdf,
        OutputFormat::Rtf,
        OutputFormat::Tiff,
        OutputFormat::Png,
        OutputFormat::Pcl,
        OutputFormat::Ps,
        OutputFormat::Txt,
    ];

    /// The formatter's switch name, which doubles as the file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Png => "png",
            OutputFormat::Pcl => "pcl",
            OutputFormat::Ps => "ps",
            OutputFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = InvalidOutputFormat;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == lower)
            .ok_or_else(|| InvalidOutputFormat(s.to_string()))
    }
}
