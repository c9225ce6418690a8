use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Decentralized storage networks the uploader can talk to.
///
/// Defined in core because configuration selects networks by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Bundlr,
    Irys,
}

impl FromStr for NetworkKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bundlr" => Ok(NetworkKind::Bundlr),
            "irys" => Ok(NetworkKind::Irys),
            _ => Err(anyhow::anyhow!("Invalid storage network: {}", s)),
        }
    }
}

impl Display for NetworkKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NetworkKind::Bundlr => write!(f, "bundlr"),
            NetworkKind::Irys => write!(f, "irys"),
        }
    }
}
