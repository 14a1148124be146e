//! Link opener for terminal sessions.

use async_trait::async_trait;
use tracker_core::{LinkError, LinkOpener};

/// Prints links for the user to follow instead of launching a browser.
pub struct TerminalLinkOpener;

#[async_trait]
impl LinkOpener for TerminalLinkOpener {
	async fn open(&self, url: &str) -> Result<(), LinkError> {
		if url.trim().is_empty() {
			return Err(LinkError::Open("empty link".into()));
		}
		tracing::info!(url = %url, "Opening chat link");
		println!("{}", url);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_rejects_blank_link() {
		assert!(TerminalLinkOpener.open(" ").await.is_err());
		assert!(TerminalLinkOpener.open("https://open.kakao.com/o/abc").await.is_ok());
	}
}
