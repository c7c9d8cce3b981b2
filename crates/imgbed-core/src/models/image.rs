use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-confirmed descriptor of a stored image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: u64,
    pub uuid: String,
    pub original_name: String,
    #[serde(rename = "file_size")]
    pub byte_size: u64,
    pub mime_type: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub public_url: String,
    pub created_at: DateTime<Utc>,
}

/// One page of the remote image listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagedImages {
    #[serde(default)]
    pub items: Vec<ImageRecord>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl PagedImages {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages()
    }
}

/// Snippet style used when sharing an image link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    #[default]
    Direct,
    Markdown,
    Html,
    BbCode,
}

impl LinkFormat {
    pub fn render(self, record: &ImageRecord) -> String {
        let url = &record.public_url;
        let alt = &record.original_name;
        match self {
            LinkFormat::Direct => url.clone(),
            LinkFormat::Markdown => format!("![{}]({})", alt, url),
            LinkFormat::Html => format!("<img src=\"{}\" alt=\"{}\" />", url, alt),
            LinkFormat::BbCode => format!("[img]{}[/img]", url),
        }
    }
}

impl FromStr for LinkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" | "url" => Ok(LinkFormat::Direct),
            "markdown" | "md" => Ok(LinkFormat::Markdown),
            "html" => Ok(LinkFormat::Html),
            "bbcode" => Ok(LinkFormat::BbCode),
            _ => Err(format!(
                "Invalid link format: {} (expected direct, markdown, html or bbcode)",
                s
            )),
        }
    }
}

impl fmt::Display for LinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkFormat::Direct => "direct",
            LinkFormat::Markdown => "markdown",
            LinkFormat::Html => "html",
            LinkFormat::BbCode => "bbcode",
        };
        f.write_str(name)
    }
}
