use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Upload methods for the primary artifact
///
/// This enum selects which storage backend a request goes through. It is
/// defined in core because it travels from the request, through the
/// coordinator, into the persisted record (the record's last-used method
/// decides which backend its storage key lives in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "upload_method", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    Local,
    Remote,
}

impl FromStr for UploadMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(UploadMethod::Local),
            "remote" => Ok(UploadMethod::Remote),
            _ => Err(anyhow::anyhow!("Invalid upload method: {}", s)),
        }
    }
}

impl Display for UploadMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadMethod::Local => write!(f, "local"),
            UploadMethod::Remote => write!(f, "remote"),
        }
    }
}
