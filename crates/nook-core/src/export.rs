//! Single-note export renderings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::time::CivilTime;

pub const EXPORT_SOURCE: &str = "nook";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Text,
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!(
                "unknown export format '{other}' (expected markdown, text, json or csv)"
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Render one note. `exported_at` is Unix seconds, stamped into the output.
pub fn render_export(
    title: &str,
    content: &str,
    format: ExportFormat,
    exported_at: u64,
) -> Result<String, serde_json::Error> {
    let when = CivilTime::from_unix_secs(exported_at);
    let rendered = match format {
        ExportFormat::Markdown => format!(
            "# {title}\n\n**Date:** {}\n\n---\n\n{content}\n\n---\n*Exported from {EXPORT_SOURCE}*\n",
            when.short_datetime()
        ),
        ExportFormat::Text => format!(
            "{}\nDate: {}\n\n{content}\n\n--\nExported from {EXPORT_SOURCE}\n",
            title.to_uppercase(),
            when.short_datetime()
        ),
        ExportFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "title": title,
            "content": content,
            "date": when.iso8601(),
            "source": EXPORT_SOURCE,
        }))?,
        ExportFormat::Csv => {
            let mut out = String::from("Line Number,Content\n");
            for (i, line) in content.lines().enumerate() {
                out.push_str(&format!("{},\"{}\"\n", i + 1, line.replace('"', "\"\"")));
            }
            out
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-02-21T13:05:00Z
    const WHEN: u64 = 1771632000 + 13 * 3600 + 5 * 60;

    #[test]
    fn test_parse_formats() {
        assert_eq!("md".parse::<ExportFormat>(), Ok(ExportFormat::Markdown));
        assert_eq!("TXT".parse::<ExportFormat>(), Ok(ExportFormat::Text));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_markdown() {
        let out = render_export("Standup", "All green.", ExportFormat::Markdown, WHEN).unwrap();
        assert!(out.starts_with("# Standup\n"));
        assert!(out.contains("**Date:** 2026-02-21 13:05"));
        assert!(out.contains("\nAll green.\n"));
    }

    #[test]
    fn test_text() {
        let out = render_export("Standup", "All green.", ExportFormat::Text, WHEN).unwrap();
        assert!(out.starts_with("STANDUP\nDate: 2026-02-21 13:05\n"));
    }

    #[test]
    fn test_json() {
        let out = render_export("Standup", "All green.", ExportFormat::Json, WHEN).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["title"], "Standup");
        assert_eq!(value["content"], "All green.");
        assert_eq!(value["date"], "2026-02-21T13:05:00Z");
        assert_eq!(value["source"], EXPORT_SOURCE);
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let out =
            render_export("t", "first line\nsay \"hi\"", ExportFormat::Csv, WHEN).unwrap();
        assert_eq!(out, "Line Number,Content\n1,\"first line\"\n2,\"say \"\"hi\"\"\"\n");
    }
}
