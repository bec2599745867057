//! Share link construction.
//!
//! A share hands out a URL pointing back at the hosting service with the
//! session and an optional caption encoded as query parameters. The
//! image itself travels through the upload path, not the link.

use crate::error::ExportResult;
use url::Url;

/// Builder for a share link.
#[derive(Debug, Clone)]
pub struct ShareLink {
    base: Url,
    session: Option<String>,
    caption: Option<String>,
}

impl ShareLink {
    /// Start a link from the service base URL.
    pub fn new(base: &str) -> ExportResult<Self> {
        Ok(Self {
            base: Url::parse(base)?,
            session: None,
            caption: None,
        })
    }

    /// Attach the editing session id.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Attach a caption shown alongside the shared image.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Build the final URL.
    pub fn build(&self) -> Url {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(session) = &self.session {
                query.append_pair("session", session);
            }
            if let Some(caption) = &self.caption {
                query.append_pair("caption", caption);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_link() {
        let link = ShareLink::new("https://plakat.example/share").unwrap();
        assert_eq!(link.build().as_str(), "https://plakat.example/share");
    }

    #[test]
    fn test_query_parameters() {
        let url = ShareLink::new("https://plakat.example/share")
            .unwrap()
            .with_session("item-42")
            .with_caption("Friday gig")
            .build();
        assert_eq!(
            url.as_str(),
            "https://plakat.example/share?session=item-42&caption=Friday+gig"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(ShareLink::new("not a url").is_err());
    }
}
